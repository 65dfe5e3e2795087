//! Incremental reconciliation of live position snapshots against the store.
//!
//! Update-before-add: a train already in the store only gets its position
//! and speed refreshed, so the expensive schedule and composition fetches
//! are paid once per train and amortized over its dwell time in the
//! snapshot. Trains that fall out of the snapshot are evicted at the end of
//! the cycle.

use crate::enrichment::enrich_train;
use crate::gateway::{FetchError, RailApiGateway};
use crate::models::Train;
use crate::reporting::{FailureKind, FailureReporter};
use crate::store::TrainDataStore;
use ahash::AHashSet;
use chrono::Utc;
use futures::StreamExt;

/// Enrichment fetches for distinct new trains are independent, run a few of
/// them in flight at once.
const ENRICHMENT_CONCURRENCY: usize = 8;

pub struct Reconciler<G, R> {
    gateway: G,
    reporter: R,
    /// Train numbers explicitly removed this session. Consulted while a
    /// cycle processes the snapshot so a late-arriving snapshot cannot
    /// immediately re-add a removed train, then cleared once the cycle
    /// completes.
    recently_removed: AHashSet<u32>,
}

impl<G, R> Reconciler<G, R>
where
    G: RailApiGateway,
    R: FailureReporter,
{
    pub fn new(gateway: G, reporter: R) -> Reconciler<G, R> {
        Reconciler {
            gateway,
            reporter,
            recently_removed: AHashSet::new(),
        }
    }

    /// Remove a train on request and suppress it for the next cycle.
    pub fn remove_train(&mut self, store: &mut TrainDataStore, train_number: u32) {
        store.remove_train(train_number);
        self.recently_removed.insert(train_number);
    }

    /// Run one reconciliation cycle. On a snapshot fetch failure the store
    /// is left untouched (apart from the sync timestamp) and the error is
    /// both reported and returned; callers must not run cycles concurrently.
    pub async fn run_cycle(
        &mut self,
        store: &mut TrainDataStore,
    ) -> Result<Vec<Train>, FetchError> {
        // Best effort: the refresh attempt itself is recorded even when the
        // snapshot fetch fails afterwards.
        store.set_last_updated_trains(Utc::now());

        let snapshot = match self.gateway.fetch_train_positions().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.reporter
                    .on_failure(FailureKind::from(&error), "live train position snapshot");
                return Err(error);
            }
        };

        tracing::debug!(entries = snapshot.len(), "fetched position snapshot");

        let mut pending_add = Vec::new();
        for entry in &snapshot {
            if self.recently_removed.contains(&entry.train_number) {
                continue;
            }
            if !store.update_train(entry.train_number, entry.lat_lon(), entry.speed) {
                pending_add.push(entry);
            }
        }

        // Enrichment only reads the store (name resolution), so the fetches
        // for distinct trains can overlap.
        let store_view: &TrainDataStore = store;
        let gateway = &self.gateway;
        let enriched: Vec<(u32, Result<Train, FetchError>)> =
            futures::stream::iter(pending_add.into_iter().map(|entry| async move {
                (
                    entry.train_number,
                    enrich_train(gateway, store_view, entry).await,
                )
            }))
            .buffer_unordered(ENRICHMENT_CONCURRENCY)
            .collect()
            .await;

        for (train_number, result) in enriched {
            match result {
                Ok(train) => store.add_train(train),
                // Skipped this cycle; the next snapshot retries implicitly.
                Err(error) => self.reporter.on_failure(
                    FailureKind::from(&error),
                    &format!("enrichment for train {}", train_number),
                ),
            }
        }

        let seen: AHashSet<u32> = snapshot.iter().map(|entry| entry.train_number).collect();
        let stale: Vec<u32> = store
            .trains()
            .map(|train| train.train_number)
            .filter(|train_number| !seen.contains(train_number))
            .collect();
        for train_number in stale {
            store.remove_train(train_number);
        }

        // Suppression is cycle-bounded; removals only shield against the
        // snapshot in flight when the removal happened.
        self.recently_removed.clear();

        Ok(store.trains().cloned().collect())
    }
}
