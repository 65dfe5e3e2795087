//! One-time population of the station and operator reference tables, plus
//! the wholesale refresh of active track work restrictions.
//!
//! Bootstrap failures are reported and not retried here; a later invocation
//! self-heals as long as the collection is still empty, and reconciliation
//! keeps resolving names to raw codes in the meantime.

use crate::gateway::RailApiGateway;
use crate::reporting::{FailureKind, FailureReporter};
use crate::store::TrainDataStore;

pub async fn bootstrap_metadata<G, R>(gateway: &G, store: &mut TrainDataStore, reporter: &R)
where
    G: RailApiGateway,
    R: FailureReporter,
{
    if store.stations_is_empty() {
        match gateway.fetch_stations().await {
            Ok(stations) => {
                tracing::info!(count = stations.len(), "loaded station metadata");
                for station in stations {
                    store.add_station(station.into());
                }
            }
            Err(error) => {
                reporter.on_failure(FailureKind::from(&error), "station metadata bootstrap");
            }
        }
    }

    if store.operators_is_empty() {
        match gateway.fetch_operators().await {
            Ok(operators) => {
                tracing::info!(count = operators.len(), "loaded operator metadata");
                for operator in operators {
                    store.add_operator(operator.into());
                }
            }
            Err(error) => {
                reporter.on_failure(FailureKind::from(&error), "operator metadata bootstrap");
            }
        }
    }
}

/// Replace the restriction collection with the current active set. On fetch
/// failure the previous set is kept.
pub async fn refresh_restrictions<G, R>(gateway: &G, store: &mut TrainDataStore, reporter: &R)
where
    G: RailApiGateway,
    R: FailureReporter,
{
    match gateway.fetch_restrictions().await {
        Ok(restrictions) => {
            store.replace_restrictions(restrictions.into_iter().map(Into::into).collect());
        }
        Err(error) => {
            reporter.on_failure(FailureKind::from(&error), "traffic restriction refresh");
        }
    }
}
