use std::time::Duration;

use connectors_common::errors::ConnectorError;
use connectors_common::numeric::{levels_from_wire, parse_decimal};
use connectors_common::types::OrderBookSnapshot;
use connectors_common::BOOK_DEPTH;
use log::{info, warn};
use market_state::OrderBookStore;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::DEFAULT_PRODUCT;

pub const DEFAULT_REST_URL: &str = "https://api.exchange.coinbase.com";

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub product_id: String,
    pub timeout: Duration,
}

impl Default for RestConfig {
    fn default() -> Self {
        RestConfig {
            base_url: DEFAULT_REST_URL.to_string(),
            product_id: DEFAULT_PRODUCT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookResponse {
    #[serde(default)]
    bids: Vec<Value>,
    #[serde(default)]
    asks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: String,
}

/// Stateless snapshot fetcher. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    config: RestConfig,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self, ConnectorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("connector_coinbase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConnectorError::Network(e.to_string()))?;
        Ok(RestClient { client, config })
    }

    async fn get_text(&self, url: &str) -> Result<String, ConnectorError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConnectorError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            warn!("coinbase api returned status {} for {}", status, url);
            return Err(ConnectorError::UnexpectedStatus { status: status.as_u16() });
        }
        resp.text()
            .await
            .map_err(|e| ConnectorError::Network(e.to_string()))
    }

    /// Full-depth book trimmed to the top levels. Does not touch any store.
    pub async fn fetch_orderbook(&self) -> Result<OrderBookSnapshot, ConnectorError> {
        let url = format!(
            "{}/products/{}/book?level=2",
            self.config.base_url.trim_end_matches('/'),
            self.config.product_id
        );
        info!("Fetching order book from {}", url);
        let text = self.get_text(&url).await?;
        let resp: BookResponse =
            serde_json::from_str(&text).map_err(|e| ConnectorError::Decode(e.to_string()))?;
        let snapshot = OrderBookSnapshot {
            bids: levels_from_wire(&resp.bids, BOOK_DEPTH),
            asks: levels_from_wire(&resp.asks, BOOK_DEPTH),
        };
        info!(
            "received order book with {} bids and {} asks, kept {}/{}",
            resp.bids.len(),
            resp.asks.len(),
            snapshot.bids.len(),
            snapshot.asks.len()
        );
        Ok(snapshot)
    }

    /// Fetches the book and stores it, for callers that persist REST snapshots.
    pub async fn refresh_book(&self, store: &OrderBookStore) -> Result<OrderBookSnapshot, ConnectorError> {
        let snapshot = self.fetch_orderbook().await?;
        store.replace_snapshot(snapshot.clone());
        Ok(snapshot)
    }

    /// Last trade price. Never returns zero on failure.
    pub async fn fetch_ticker_price(&self) -> Result<f64, ConnectorError> {
        let url = format!(
            "{}/products/{}/ticker",
            self.config.base_url.trim_end_matches('/'),
            self.config.product_id
        );
        let text = self.get_text(&url).await?;
        let ticker: TickerResponse =
            serde_json::from_str(&text).map_err(|e| ConnectorError::Decode(e.to_string()))?;
        let price = parse_decimal(&ticker.price)?;
        if price <= 0.0 {
            return Err(ConnectorError::Parse(format!("non-positive price {}", ticker.price)));
        }
        Ok(price)
    }

    /// Mid of the freshly fetched book, or `0.0` when no mid is available.
    pub async fn mid_price(&self) -> f64 {
        match self.fetch_orderbook().await {
            Ok(book) => mid_of(&book).unwrap_or(0.0),
            Err(e) => {
                warn!("order book mid unavailable: {}", e);
                0.0
            }
        }
    }
}

pub fn mid_of(book: &OrderBookSnapshot) -> Option<f64> {
    let bid = parse_decimal(&book.bids.first()?.price).ok()?;
    let ask = parse_decimal(&book.asks.first()?.price).ok()?;
    Some((bid + ask) / 2.0)
}
