pub mod messages;
pub mod rest;
pub mod ws;

pub const DEFAULT_PRODUCT: &str = "BTC-USD";
