use std::path::PathBuf;
use std::time::Duration;

use connector_coinbase::rest::{RestConfig, DEFAULT_REST_URL};
use connector_coinbase::ws::{FeedConfig, ReconnectPolicy, DEFAULT_WS_URL};
use connector_coinbase::DEFAULT_PRODUCT;
use market_state::fallback::FallbackConfig;
use serde::Deserialize;

/// Read from `PRICE_*` environment variables, e.g. `PRICE_PRODUCT_ID`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_product_id")]
    pub product_id: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_rest_timeout_secs")]
    pub rest_timeout_secs: u64,
    #[serde(default = "default_prediction_file")]
    pub prediction_file: PathBuf,
    #[serde(default = "default_prediction_interval_secs")]
    pub prediction_interval_secs: u64,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
    #[serde(default = "default_fallback_interval_ms")]
    pub fallback_interval_ms: u64,
    #[serde(default = "default_fallback_base_price")]
    pub fallback_base_price: f64,
}

fn default_product_id() -> String {
    DEFAULT_PRODUCT.into()
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.into()
}

fn default_rest_url() -> String {
    DEFAULT_REST_URL.into()
}

fn default_rest_timeout_secs() -> u64 {
    10
}

fn default_prediction_file() -> PathBuf {
    "/shared/prediction.json".into()
}

fn default_prediction_interval_secs() -> u64 {
    30
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_reconnect_max_delay_secs() -> u64 {
    60
}

fn default_fallback_interval_ms() -> u64 {
    2_000
}

fn default_fallback_base_price() -> f64 {
    95_000.0
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("PRICE_").from_env::<Config>()
    }

    pub fn feed(&self) -> FeedConfig {
        FeedConfig {
            ws_url: self.ws_url.clone(),
            product_id: self.product_id.clone(),
            reconnect: ReconnectPolicy {
                base_delay: Duration::from_secs(self.reconnect_delay_secs.max(1)),
                max_delay: Duration::from_secs(
                    self.reconnect_max_delay_secs.max(self.reconnect_delay_secs).max(1),
                ),
            },
            fallback: FallbackConfig {
                base_price: self.fallback_base_price,
                interval: Duration::from_millis(self.fallback_interval_ms.max(1)),
            },
        }
    }

    pub fn rest(&self) -> RestConfig {
        RestConfig {
            base_url: self.rest_url.clone(),
            product_id: self.product_id.clone(),
            timeout: Duration::from_secs(self.rest_timeout_secs),
        }
    }

    pub fn prediction_interval(&self) -> Duration {
        Duration::from_secs(self.prediction_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()));
        envy::prefixed("PRICE_").from_iter(vars).unwrap()
    }

    #[test]
    fn defaults_match_exchange_constants() {
        let c = from_pairs(&[]);
        assert_eq!(c.product_id, "BTC-USD");
        assert_eq!(c.ws_url, "wss://ws-feed.exchange.coinbase.com");
        assert_eq!(c.rest_url, "https://api.exchange.coinbase.com");
        assert_eq!(c.prediction_file, PathBuf::from("/shared/prediction.json"));
        let feed = c.feed();
        assert_eq!(feed.reconnect.base_delay, Duration::from_secs(5));
        assert_eq!(feed.fallback.interval, Duration::from_secs(2));
        assert_eq!(c.rest().timeout, Duration::from_secs(10));
        assert_eq!(c.prediction_interval(), Duration::from_secs(30));
    }

    #[test]
    fn overrides_from_prefixed_vars() {
        let c = from_pairs(&[
            ("PRICE_PRODUCT_ID", "ETH-USD"),
            ("PRICE_RECONNECT_DELAY_SECS", "90"),
            ("PRICE_FALLBACK_BASE_PRICE", "3000.5"),
            ("UNRELATED", "x"),
        ]);
        assert_eq!(c.product_id, "ETH-USD");
        assert_eq!(c.rest().product_id, "ETH-USD");
        let feed = c.feed();
        assert_eq!(feed.product_id, "ETH-USD");
        // max delay never undercuts the base delay
        assert_eq!(feed.reconnect.max_delay, Duration::from_secs(90));
        assert_eq!(feed.fallback.base_price, 3000.5);
    }

    #[test]
    fn zero_delays_are_clamped() {
        let c = from_pairs(&[
            ("PRICE_RECONNECT_DELAY_SECS", "0"),
            ("PRICE_RECONNECT_MAX_DELAY_SECS", "0"),
            ("PRICE_FALLBACK_INTERVAL_MS", "0"),
        ]);
        let feed = c.feed();
        assert_eq!(feed.reconnect.base_delay, Duration::from_secs(1));
        assert_eq!(feed.reconnect.max_delay, Duration::from_secs(1));
        assert!(feed.reconnect.delay(3) > Duration::ZERO);
        assert_eq!(feed.fallback.interval, Duration::from_millis(1));
    }
}
