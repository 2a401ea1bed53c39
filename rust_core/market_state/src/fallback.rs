//! Synthetic price source used when the live feed cannot be reached.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use log::{debug, info};
use tokio::time::{interval, MissedTickBehavior};

use crate::MarketState;

#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub base_price: f64,
    pub interval: Duration,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig {
            base_price: 95_000.0,
            interval: Duration::from_secs(2),
        }
    }
}

/// Baseline plus a slow sine over epoch seconds plus a ramp over the
/// second-of-minute.
pub fn synthetic_price(base_price: f64, now: DateTime<Utc>) -> f64 {
    let wave = (now.timestamp() as f64 / 100.0).sin() * 500.0;
    let ramp = (now.second() as f64 - 30.0) * 10.0;
    base_price + wave + ramp
}

/// Records one synthetic sample per tick, forever. The first sample is
/// written immediately.
pub async fn run_fallback(state: Arc<MarketState>, config: FallbackConfig) {
    info!(
        "using fallback price generation (base {:.2}, every {:?})",
        config.base_price, config.interval
    );
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let price = synthetic_price(config.base_price, Utc::now());
        state.prices.record(price);
        debug!("fallback price {:.2}", price);
    }
}
