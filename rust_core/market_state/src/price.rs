use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Maximum number of samples kept; the oldest is evicted first.
pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Default)]
struct PriceInner {
    latest: f64,
    history: VecDeque<f64>,
    last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct PriceStore {
    inner: RwLock<PriceInner>,
}

/// Consistent view of the store: `tail` is always the last
/// `min(n, history_len)` samples of the same history `history_len` counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub latest_price: f64,
    pub history_len: usize,
    pub tail: Vec<f64>,
    pub last_update: Option<DateTime<Utc>>,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `price`, evicts beyond capacity and sets it as latest, all in
    /// one critical section.
    pub fn record(&self, price: f64) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.history.push_back(price);
        while inner.history.len() > HISTORY_CAPACITY {
            inner.history.pop_front();
        }
        inner.latest = price;
        inner.last_update = Some(Utc::now());
    }

    pub fn snapshot(&self, tail: usize) -> PriceSnapshot {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let len = inner.history.len();
        let skip = len.saturating_sub(tail);
        PriceSnapshot {
            latest_price: inner.latest,
            history_len: len,
            tail: inner.history.iter().skip(skip).copied().collect(),
            last_update: inner.last_update,
        }
    }

    pub fn latest(&self) -> f64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).latest
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
