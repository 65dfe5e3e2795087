//! Durable snapshot of the entity store: one JSON file per collection plus
//! the sync timestamp, written atomically (temp file, then rename) so a
//! crash mid-write never leaves a torn collection behind.

use crate::models::{Operator, Station, Train, TrafficRestriction};
use crate::store::TrainDataStore;
use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const TRAINS_FILE: &str = "trains.json";
const STATIONS_FILE: &str = "stations.json";
const OPERATORS_FILE: &str = "operators.json";
const RESTRICTIONS_FILE: &str = "restrictions.json";
const LAST_UPDATED_FILE: &str = "last_updated_trains.json";

pub fn save_store(
    dir: &Path,
    store: &TrainDataStore,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(dir)?;

    write_json(dir, TRAINS_FILE, &store.trains().collect::<Vec<_>>())?;
    write_json(dir, STATIONS_FILE, &store.stations().collect::<Vec<_>>())?;
    write_json(dir, OPERATORS_FILE, &store.operators().collect::<Vec<_>>())?;
    write_json(
        dir,
        RESTRICTIONS_FILE,
        &store.restrictions().collect::<Vec<_>>(),
    )?;
    write_json(dir, LAST_UPDATED_FILE, &store.last_updated_trains())?;

    Ok(())
}

/// Rebuild a store from a snapshot directory. `Ok(None)` when the directory
/// does not exist yet; a missing individual file just leaves that collection
/// empty.
pub fn load_store(
    dir: &Path,
) -> Result<Option<TrainDataStore>, Box<dyn std::error::Error + Send + Sync>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut store = TrainDataStore::new();

    if let Some(trains) = read_json::<Vec<Train>>(dir, TRAINS_FILE)? {
        for train in trains {
            store.add_train(train);
        }
    }
    if let Some(stations) = read_json::<Vec<Station>>(dir, STATIONS_FILE)? {
        for station in stations {
            store.add_station(station);
        }
    }
    if let Some(operators) = read_json::<Vec<Operator>>(dir, OPERATORS_FILE)? {
        for operator in operators {
            store.add_operator(operator);
        }
    }
    if let Some(restrictions) = read_json::<Vec<TrafficRestriction>>(dir, RESTRICTIONS_FILE)? {
        store.replace_restrictions(restrictions);
    }
    if let Some(Some(timestamp)) = read_json::<Option<DateTime<Utc>>>(dir, LAST_UPDATED_FILE)? {
        store.set_last_updated_trains(timestamp);
    }

    Ok(Some(store))
}

fn write_json<T: Serialize>(
    dir: &Path,
    name: &str,
    value: &T,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file_path = dir.join(name);
    let temp_file_path = dir.join(format!("{}.tmp", name));

    let file = File::create(&temp_file_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, value)?;

    std::fs::rename(temp_file_path, file_path)?;

    Ok(())
}

fn read_json<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
) -> Result<Option<T>, Box<dyn std::error::Error + Send + Sync>> {
    let file_path = dir.join(name);
    if !file_path.exists() {
        return Ok(None);
    }

    let file = File::open(file_path)?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)?;

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StopKind, TrainStop, VehicleEntry};
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("railtrack-persistence-{}-{}", tag, std::process::id()))
    }

    fn sample_store() -> TrainDataStore {
        let mut store = TrainDataStore::new();
        store.add_train(Train {
            train_number: 27,
            train_type: "IC".to_string(),
            train_category: "Long-distance".to_string(),
            commuter_line: String::new(),
            operator_code: "vr".into(),
            operator_name: "VR-Yhtymä Oyj".to_string(),
            speed: 140.0,
            location: [61.5, 23.8],
            max_speed: "200".to_string(),
            total_length: "225".to_string(),
            stops: vec![TrainStop {
                kind: StopKind::Start,
                station_name: "Helsinki asema".to_string(),
                arrival: None,
                departure: Some(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()),
            }],
            composition: vec![VehicleEntry {
                vehicle_number: 1,
                vehicle_name: "Sr2".to_string(),
            }],
            arrival_time_end: Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()),
            journey_time: "02:00".to_string(),
            end_stop: "Tampere asema".to_string(),
        });
        store.add_station(Station {
            station_code: "HKI".into(),
            station_name: "Helsinki asema".to_string(),
            location: [60.17, 24.94],
        });
        store.add_operator(Operator {
            id: 1,
            operator_short_code: "vr".into(),
            operator_uic_code: 10,
            operator_name: "VR-Yhtymä Oyj".to_string(),
        });
        store.upsert_restriction(TrafficRestriction {
            id: "twr-1".to_string(),
            state: "ACTIVE".to_string(),
            organization: "FTIA".to_string(),
            location: [61.0, 25.0],
            parts: vec![],
        });
        store.set_last_updated_trains(Utc.with_ymd_and_hms(2024, 5, 1, 6, 5, 0).unwrap());
        store
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = temp_dir("round-trip");
        let store = sample_store();

        save_store(&dir, &store).unwrap();
        let loaded = load_store(&dir).unwrap().unwrap();

        assert_eq!(
            store.train_by_number(27).unwrap(),
            loaded.train_by_number(27).unwrap()
        );
        assert_eq!(loaded.station_name("HKI"), "Helsinki asema");
        assert_eq!(loaded.operator_name("vr"), "VR-Yhtymä Oyj");
        assert_eq!(loaded.restrictions().count(), 1);
        assert_eq!(loaded.last_updated_trains(), store.last_updated_trains());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_loads_as_none() {
        let dir = temp_dir("missing").join("nope");
        assert!(load_store(&dir).unwrap().is_none());
    }
}
