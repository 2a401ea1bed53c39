//! Shared market state: the latest trade price with its rolling history and
//! the top of the order book. Each store has its own lock so price updates
//! and book replacements never wait on each other.

pub mod fallback;
pub mod orderbook;
pub mod price;

pub use orderbook::OrderBookStore;
pub use price::{PriceSnapshot, PriceStore, HISTORY_CAPACITY};

/// Process-scoped state handed to every component as `Arc<MarketState>`.
#[derive(Debug, Default)]
pub struct MarketState {
    pub prices: PriceStore,
    pub book: OrderBookStore,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }
}
