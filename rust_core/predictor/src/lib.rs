//! Short-horizon linear trend projection over the streamed price history.
//!
//! The "current" price prefers the REST order-book mid, then the streamed
//! trade price, then a fixed baseline for a cold start. The projection takes
//! the slope across the last `TREND_WINDOW` samples and extends it by
//! `HORIZON_STEPS`; the horizon is a label, not derived from sample times.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use connector_coinbase::rest::RestClient;
use connectors_common::errors::ConnectorError;
use connectors_common::numeric::round_cents;
use log::debug;
use market_state::{MarketState, PriceSnapshot};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASELINE: f64 = 95_000.0;
pub const TREND_WINDOW: usize = 10;
pub const HORIZON_STEPS: f64 = 5.0;
pub const HORIZON_LABEL: &str = "5 minutes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub timestamp: String,
    pub predicted_price: f64,
    pub current_price: f64,
    pub prediction_horizon: String,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub price: f64,
    pub websocket_price: f64,
    pub orderbook_price: f64,
    pub timestamp: String,
    pub source: &'static str,
}

/// Mid when positive, else the streamed price, else the baseline.
pub fn choose_current(orderbook_mid: f64, streamed: f64) -> f64 {
    if orderbook_mid > 0.0 {
        orderbook_mid
    } else if streamed != 0.0 {
        streamed
    } else {
        DEFAULT_BASELINE
    }
}

/// Extends the slope of `recent` from `current`. With fewer than
/// `TREND_WINDOW` samples the prediction is flat.
pub fn project(current: f64, recent: &[f64]) -> f64 {
    if recent.len() < TREND_WINDOW {
        return current;
    }
    let window = &recent[recent.len() - TREND_WINDOW..];
    let trend = (window[TREND_WINDOW - 1] - window[0]) / TREND_WINDOW as f64;
    current + trend * HORIZON_STEPS
}

pub fn prediction_from(current: f64, prices: &PriceSnapshot) -> Prediction {
    let predicted = project(current, &prices.tail);
    Prediction {
        timestamp: now_rfc3339(),
        predicted_price: round_cents(predicted),
        current_price: round_cents(current),
        prediction_horizon: HORIZON_LABEL.to_string(),
        data_points: prices.history_len,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone)]
pub struct Predictor {
    state: Arc<MarketState>,
    rest: RestClient,
}

impl Predictor {
    pub fn new(state: Arc<MarketState>, rest: RestClient) -> Self {
        Predictor { state, rest }
    }

    /// Always produces a value; missing sources degrade to the baseline.
    pub async fn predict(&self) -> Prediction {
        let prices = self.state.prices.snapshot(TREND_WINDOW);
        let mid = self.rest.mid_price().await;
        let current = choose_current(mid, prices.latest_price);
        debug!(
            "predicting from current {:.2} (mid {:.2}, streamed {:.2}, {} samples)",
            current, mid, prices.latest_price, prices.history_len
        );
        prediction_from(current, &prices)
    }

    /// Same projection anchored on the REST ticker price. Fails instead of
    /// falling back when the ticker is unavailable.
    pub async fn predict_from_ticker(&self) -> Result<Prediction, ConnectorError> {
        let current = self.rest.fetch_ticker_price().await?;
        let prices = self.state.prices.snapshot(TREND_WINDOW);
        Ok(prediction_from(current, &prices))
    }

    pub async fn quote(&self) -> PriceQuote {
        let websocket_price = self.state.prices.latest();
        let orderbook_price = self.rest.mid_price().await;
        let (price, source) = if orderbook_price > 0.0 {
            (orderbook_price, "Coinbase Exchange Order Book (Mid Price)")
        } else {
            (websocket_price, "Coinbase Exchange WebSocket")
        };
        PriceQuote {
            price,
            websocket_price,
            orderbook_price,
            timestamp: now_rfc3339(),
            source,
        }
    }
}
