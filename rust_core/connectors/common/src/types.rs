use serde::{Deserialize, Serialize};

/// One price level. Both fields stay in the exchange's decimal notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: String,
    pub size: String,
}

impl OrderBookLevel {
    pub fn new(price: impl Into<String>, size: impl Into<String>) -> Self {
        OrderBookLevel { price: price.into(), size: size.into() }
    }
}

/// Top of book, bids best-to-worst then asks best-to-worst.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
}
