use std::sync::{PoisonError, RwLock};

use connectors_common::types::{OrderBookLevel, OrderBookSnapshot};
use connectors_common::BOOK_DEPTH;

/// Top-of-book holder. Replacement is wholesale; a reader sees either the old
/// or the new book, never a mix.
#[derive(Debug, Default)]
pub struct OrderBookStore {
    inner: RwLock<OrderBookSnapshot>,
}

impl OrderBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, mut bids: Vec<OrderBookLevel>, mut asks: Vec<OrderBookLevel>) {
        bids.truncate(BOOK_DEPTH);
        asks.truncate(BOOK_DEPTH);
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *inner = OrderBookSnapshot { bids, asks };
    }

    /// Replaces only the sides that are present, both under one write lock.
    pub fn replace_sides(&self, bids: Option<Vec<OrderBookLevel>>, asks: Option<Vec<OrderBookLevel>>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut bids) = bids {
            bids.truncate(BOOK_DEPTH);
            inner.bids = bids;
        }
        if let Some(mut asks) = asks {
            asks.truncate(BOOK_DEPTH);
            inner.asks = asks;
        }
    }

    pub fn replace_snapshot(&self, snapshot: OrderBookSnapshot) {
        self.replace(snapshot.bids, snapshot.asks);
    }

    pub fn read(&self) -> OrderBookSnapshot {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
