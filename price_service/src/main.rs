mod config;
mod jobs;

use std::sync::Arc;

use anyhow::Context;
use connector_coinbase::rest::RestClient;
use connector_coinbase::ws::run_coinbase_feed;
use log::{error, info};
use market_state::MarketState;
use predictor::Predictor;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid PRICE_* configuration")?;
    info!("starting price service for {}", config.product_id);

    jobs::ensure_parent_dir(&config.prediction_file).await;

    let state = Arc::new(MarketState::new());
    let rest = RestClient::new(config.rest()).context("building REST client")?;
    let predictor = Predictor::new(state.clone(), rest);

    let feed_state = state.clone();
    let feed_config = config.feed();
    let feed = tokio::spawn(async move {
        // the feed returns once it has handed off to the fallback generator
        let fallback = run_coinbase_feed(feed_state, feed_config).await;
        if let Err(e) = fallback.await {
            error!("fallback generator stopped: {}", e);
        }
    });

    let job = tokio::spawn(jobs::run_prediction_file_job(
        predictor,
        config.prediction_file.clone(),
        config.prediction_interval(),
    ));

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutting down");
    feed.abort();
    job.abort();
    Ok(())
}
