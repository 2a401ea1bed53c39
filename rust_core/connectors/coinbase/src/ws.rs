use std::sync::Arc;
use std::time::Duration;

use connectors_common::errors::ConnectorError;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use market_state::fallback::{run_fallback, FallbackConfig};
use market_state::MarketState;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tungstenite::Message;

use crate::messages::{apply, FeedMessage, Subscribe};
use crate::DEFAULT_PRODUCT;

pub const DEFAULT_WS_URL: &str = "wss://ws-feed.exchange.coinbase.com";

/// Delay before reconnecting after a dropped session. Consecutive sessions
/// that die before delivering anything double the delay up to `max_delay`.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl ReconnectPolicy {
    /// `attempt` counts from 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1).min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub ws_url: String,
    pub product_id: String,
    pub reconnect: ReconnectPolicy,
    pub fallback: FallbackConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            ws_url: DEFAULT_WS_URL.to_string(),
            product_id: DEFAULT_PRODUCT.to_string(),
            reconnect: ReconnectPolicy::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

enum SessionEnd {
    /// Could not connect or subscribe; the feed hands off to the fallback.
    Unavailable(ConnectorError),
    /// Connected, then the stream failed or closed.
    Dropped { received: u64, reason: String },
}

/// Runs the feed until the exchange cannot be reached, then spawns the
/// fallback generator and returns its handle. Read failures reconnect in
/// place, so at most one session task exists at any time.
pub async fn run_coinbase_feed(state: Arc<MarketState>, config: FeedConfig) -> JoinHandle<()> {
    let mut attempt: u32 = 0;
    loop {
        match run_session(&state, &config).await {
            SessionEnd::Unavailable(e) => {
                warn!("coinbase feed unavailable: {}", e);
                return tokio::spawn(run_fallback(state, config.fallback.clone()));
            }
            SessionEnd::Dropped { received, reason } => {
                attempt = if received > 0 { 1 } else { attempt.saturating_add(1) };
                let wait = config.reconnect.delay(attempt);
                warn!(
                    "coinbase feed dropped after {} messages ({}), reconnecting in {:?}",
                    received, reason, wait
                );
                sleep(wait).await;
            }
        }
    }
}

async fn run_session(state: &MarketState, config: &FeedConfig) -> SessionEnd {
    info!("Connecting to {}", config.ws_url);
    let ws_stream = match connect_async(config.ws_url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(e) => return SessionEnd::Unavailable(ConnectorError::Network(e.to_string())),
    };
    let (mut write, mut read) = ws_stream.split();

    let subscribe = Subscribe::ticker_and_level2(&config.product_id);
    let payload = match serde_json::to_string(&subscribe) {
        Ok(p) => p,
        Err(e) => return SessionEnd::Unavailable(ConnectorError::Protocol(e.to_string())),
    };
    if let Err(e) = write.send(Message::Text(payload)).await {
        return SessionEnd::Unavailable(ConnectorError::Network(e.to_string()));
    }
    info!("subscribed to {} ticker and level2", config.product_id);

    let mut received = 0u64;
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(txt)) => {
                received += 1;
                match serde_json::from_str::<FeedMessage>(&txt) {
                    Ok(m) => {
                        apply(state, &config.product_id, m);
                    }
                    Err(e) => debug!("dropping malformed coinbase frame: {}", e),
                }
            }
            Ok(Message::Close(frame)) => {
                return SessionEnd::Dropped {
                    received,
                    reason: format!("closed by peer: {:?}", frame),
                };
            }
            Ok(_) => {}
            Err(e) => {
                return SessionEnd::Dropped { received, reason: e.to_string() };
            }
        }
    }
    SessionEnd::Dropped { received, reason: "stream ended".to_string() }
}
