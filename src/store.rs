//! The entity store owning every tracked collection.
//!
//! All mutation goes through this interface; the reconciliation engine and
//! the enrichment resolver hold no copies of their own. Collections are keyed
//! maps, so the uniqueness invariants of the data model hold by construction.

use crate::models::{Operator, Station, Train, TrafficRestriction};
use ahash::AHashMap;
use chrono::DateTime;
use chrono::Utc;
use compact_str::CompactString;

#[derive(Clone, Debug, Default)]
pub struct TrainDataStore {
    trains: AHashMap<u32, Train>,
    stations: AHashMap<CompactString, Station>,
    operators: AHashMap<CompactString, Operator>,
    restrictions: AHashMap<String, TrafficRestriction>,
    last_updated_trains: Option<DateTime<Utc>>,
}

impl TrainDataStore {
    pub fn new() -> TrainDataStore {
        TrainDataStore::default()
    }

    pub fn add_train(&mut self, train: Train) {
        self.trains.insert(train.train_number, train);
    }

    /// Refresh position and speed of an already tracked train. Returns false
    /// when the train is unknown, which tells the caller to enrich and add it
    /// instead. Fields are only written when the value actually changed.
    pub fn update_train(&mut self, train_number: u32, location: [f64; 2], speed: f64) -> bool {
        match self.trains.get_mut(&train_number) {
            Some(train) => {
                if train.location != location {
                    train.location = location;
                }
                if train.speed != speed {
                    train.speed = speed;
                }
                true
            }
            None => false,
        }
    }

    pub fn remove_train(&mut self, train_number: u32) {
        self.trains.remove(&train_number);
    }

    pub fn clear_trains(&mut self) {
        self.trains.clear();
    }

    pub fn train_by_number(&self, train_number: u32) -> Option<&Train> {
        self.trains.get(&train_number)
    }

    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values()
    }

    pub fn train_count(&self) -> usize {
        self.trains.len()
    }

    pub fn add_station(&mut self, station: Station) {
        self.stations.insert(station.station_code.clone(), station);
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn stations_is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn add_operator(&mut self, operator: Operator) {
        self.operators
            .insert(operator.operator_short_code.clone(), operator);
    }

    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    pub fn operators_is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn upsert_restriction(&mut self, restriction: TrafficRestriction) {
        self.restrictions
            .insert(restriction.id.clone(), restriction);
    }

    /// Wholesale refresh: the previous restriction set is dropped so entries
    /// cannot accumulate across polls.
    pub fn replace_restrictions(&mut self, restrictions: Vec<TrafficRestriction>) {
        self.restrictions.clear();
        for restriction in restrictions {
            self.upsert_restriction(restriction);
        }
    }

    pub fn restrictions(&self) -> impl Iterator<Item = &TrafficRestriction> {
        self.restrictions.values()
    }

    /// Display name for a station code, falling back to the raw code when the
    /// reference table has no entry. Never empty, never panics.
    pub fn station_name(&self, station_code: &str) -> String {
        match self.stations.get(station_code) {
            Some(station) => station.station_name.clone(),
            None => station_code.to_string(),
        }
    }

    /// Same fallback policy as [`TrainDataStore::station_name`].
    pub fn operator_name(&self, operator_code: &str) -> String {
        match self.operators.get(operator_code) {
            Some(operator) => operator.operator_name.clone(),
            None => operator_code.to_string(),
        }
    }

    pub fn set_last_updated_trains(&mut self, timestamp: DateTime<Utc>) {
        self.last_updated_trains = Some(timestamp);
    }

    pub fn last_updated_trains(&self) -> Option<DateTime<Utc>> {
        self.last_updated_trains
    }
}
