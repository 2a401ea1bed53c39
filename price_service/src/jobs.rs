use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use predictor::{Prediction, Predictor};
use tokio::time::{interval, MissedTickBehavior};

/// Creates the directory holding the prediction file. A failure is logged;
/// the writer simply keeps failing until the directory appears.
pub async fn ensure_parent_dir(path: &Path) {
    if let Some(dir) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("could not create {}: {}", dir.display(), e);
        }
    }
}

pub async fn write_prediction(path: &Path, prediction: &Prediction) -> anyhow::Result<()> {
    let data = serde_json::to_vec(prediction)?;
    tokio::fs::write(path, data).await?;
    Ok(())
}

/// Writes a ticker-anchored prediction every `every`. A cycle without a
/// ticker price is skipped so the file's age reflects real data.
pub async fn run_prediction_file_job(predictor: Predictor, path: PathBuf, every: Duration) {
    info!("writing predictions to {} every {:?}", path.display(), every);
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let prediction = match predictor.predict_from_ticker().await {
            Ok(p) => p,
            Err(e) => {
                warn!("skipping prediction file update: {}", e);
                continue;
            }
        };
        if let Err(e) = write_prediction(&path, &prediction).await {
            warn!("error writing prediction file: {}", e);
        }
    }
}
