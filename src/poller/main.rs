use anyhow::Context;
use railtrack::bootstrap;
use railtrack::gateway::DigitrafficClient;
use railtrack::persistence;
use railtrack::reconcile::Reconciler;
use railtrack::reporting::TracingReporter;
use railtrack::store::TrainDataStore;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const DEFAULT_DATA_DIR: &str = "data/railtrack";
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let data_dir = PathBuf::from(
        std::env::var("RAILTRACK_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
    );
    let poll_interval_seconds = std::env::var("RAILTRACK_POLL_INTERVAL_SECONDS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS);

    let mut store = match persistence::load_store(&data_dir) {
        Ok(Some(store)) => {
            tracing::info!(
                trains = store.train_count(),
                stations = store.stations().count(),
                "restored persisted store"
            );
            store
        }
        Ok(None) => TrainDataStore::new(),
        Err(error) => {
            tracing::warn!(%error, "could not restore persisted store, starting empty");
            TrainDataStore::new()
        }
    };

    let gateway = DigitrafficClient::new().context("building http client")?;
    let reporter = TracingReporter;

    bootstrap::bootstrap_metadata(&gateway, &mut store, &reporter).await;
    bootstrap::refresh_restrictions(&gateway, &mut store, &reporter).await;
    if let Err(error) = persistence::save_store(&data_dir, &store) {
        tracing::warn!(%error, "failed to persist store after bootstrap");
    }

    let mut reconciler = Reconciler::new(gateway, reporter);

    // Sequential awaits in this single task are the single-flight guard: a
    // new cycle cannot start while the previous one is still running.
    let mut interval = tokio::time::interval(Duration::from_secs(poll_interval_seconds));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match reconciler.run_cycle(&mut store).await {
            Ok(trains) => {
                tracing::info!(trains = trains.len(), "reconciliation cycle complete");
                if let Err(error) = persistence::save_store(&data_dir, &store) {
                    tracing::warn!(%error, "failed to persist store");
                }
            }
            Err(error) => {
                // Already reported through the failure reporter; prior state
                // stays in place until the next cycle.
                tracing::warn!(%error, "reconciliation cycle aborted");
            }
        }
    }
}
