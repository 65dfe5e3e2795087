//! Wire structs for the Digitraffic payloads this crate consumes, one per
//! endpoint, decoded strictly so a malformed record surfaces as an empty
//! result instead of propagating untyped JSON into the model.
//!
//! Upstream coordinates arrive GeoJSON style as `[longitude, latitude]`;
//! every conversion into the domain model swaps the pair.

use crate::models::{Operator, RestrictionPart, Station, TrafficRestriction};
use chrono::DateTime;
use chrono::Utc;
use compact_str::CompactString;
use serde::Deserialize;

/// One entry of the live position snapshot.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainLocationEntry {
    pub train_number: u32,
    pub speed: f64,
    pub location: GeoJsonPoint,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GeoJsonPoint {
    /// Upstream order: [longitude, latitude].
    pub coordinates: [f64; 2],
}

impl TrainLocationEntry {
    /// Position in internal [latitude, longitude] order.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.location.coordinates[1], self.location.coordinates[0]]
    }
}

/// Per-train schedule detail, `/trains/latest/{trainNumber}` (index 0 of the
/// returned array).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainDetail {
    pub train_number: u32,
    #[serde(rename = "commuterLineID", default)]
    pub commuter_line_id: String,
    pub operator_short_code: CompactString,
    pub train_category: String,
    pub train_type: String,
    #[serde(default)]
    pub time_table_rows: Vec<TimeTableRow>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTableRow {
    pub station_short_code: CompactString,
    pub scheduled_time: DateTime<Utc>,
}

/// Rolling stock composition, `/compositions/{date}/{trainNumber}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainComposition {
    pub train_number: u32,
    #[serde(default)]
    pub journey_sections: Vec<JourneySection>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneySection {
    pub maximum_speed: Option<u32>,
    pub total_length: Option<u32>,
    #[serde(default)]
    pub locomotives: Vec<LocomotiveEntry>,
    #[serde(default)]
    pub wagons: Vec<WagonEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocomotiveEntry {
    pub location: u32,
    pub locomotive_type: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagonEntry {
    pub location: u32,
    #[serde(default)]
    pub wagon_type: Option<String>,
}

/// Station metadata, `/metadata/stations`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationEntry {
    pub station_short_code: CompactString,
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<StationEntry> for Station {
    fn from(entry: StationEntry) -> Station {
        Station {
            station_code: entry.station_short_code,
            station_name: entry.station_name,
            location: [entry.latitude, entry.longitude],
        }
    }
}

/// Operator metadata, `/metadata/operators`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorEntry {
    pub id: u32,
    pub operator_short_code: CompactString,
    #[serde(rename = "operatorUICCode")]
    pub operator_uic_code: u32,
    pub operator_name: String,
}

impl From<OperatorEntry> for Operator {
    fn from(entry: OperatorEntry) -> Operator {
        Operator {
            id: entry.id,
            operator_short_code: entry.operator_short_code,
            operator_uic_code: entry.operator_uic_code,
            operator_name: entry.operator_name,
        }
    }
}

/// Track work restriction, filtered upstream to the active state.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionEntry {
    pub id: String,
    pub state: String,
    pub organization: String,
    /// Upstream order: [longitude, latitude].
    pub location: [f64; 2],
    #[serde(default)]
    pub parts: Vec<RestrictionPartEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionPartEntry {
    pub index: u32,
    pub start_date: String,
    pub locations: RestrictionLocationEntry,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RestrictionLocationEntry {
    #[serde(rename = "type")]
    pub kind: String,
    /// Upstream order: [longitude, latitude].
    pub location: [f64; 2],
}

impl From<RestrictionEntry> for TrafficRestriction {
    fn from(entry: RestrictionEntry) -> TrafficRestriction {
        TrafficRestriction {
            id: entry.id,
            state: entry.state,
            organization: entry.organization,
            location: [entry.location[1], entry.location[0]],
            parts: entry
                .parts
                .into_iter()
                .map(|part| RestrictionPart {
                    index: part.index,
                    start_date: part.start_date,
                    kind: part.locations.kind,
                    location: [part.locations.location[1], part.locations.location[0]],
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_entry_swaps_coordinates() {
        let raw = r#"{"trainNumber":1,"speed":80,"location":{"type":"Point","coordinates":[24.9,60.2]}}"#;
        let entry: TrainLocationEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.lat_lon(), [60.2, 24.9]);
        assert_eq!(entry.train_number, 1);
        assert_eq!(entry.speed, 80.0);
    }

    #[test]
    fn detail_decodes_commuter_line_id() {
        let raw = r#"[{
            "trainNumber": 8932,
            "commuterLineID": "U",
            "operatorShortCode": "vr",
            "trainCategory": "Commuter",
            "trainType": "HL",
            "timeTableRows": [
                {"stationShortCode": "HKI", "scheduledTime": "2024-05-01T06:00:00.000Z"},
                {"stationShortCode": "KKN", "scheduledTime": "2024-05-01T06:42:00.000Z"}
            ]
        }]"#;
        let details: Vec<TrainDetail> = serde_json::from_str(raw).unwrap();
        let detail = &details[0];
        assert_eq!(detail.commuter_line_id, "U");
        assert_eq!(detail.operator_short_code, "vr");
        assert_eq!(detail.time_table_rows.len(), 2);
        assert_eq!(detail.time_table_rows[0].station_short_code, "HKI");
    }

    #[test]
    fn detail_with_missing_required_field_is_an_error() {
        // operatorShortCode absent, strict decode must fail rather than
        // defaulting the field.
        let raw = r#"[{"trainNumber": 1, "trainCategory": "Commuter", "trainType": "HL"}]"#;
        assert!(serde_json::from_str::<Vec<TrainDetail>>(raw).is_err());
    }

    #[test]
    fn restriction_swaps_both_coordinate_pairs() {
        let raw = r#"[{
            "id": "twr-1",
            "state": "ACTIVE",
            "organization": "FTIA",
            "location": [25.1, 61.3],
            "parts": [
                {"index": 0, "startDate": "2024-04-01", "locations": {"type": "SPEED_RESTRICTION", "location": [25.2, 61.4]}}
            ]
        }]"#;
        let entries: Vec<RestrictionEntry> = serde_json::from_str(raw).unwrap();
        let restriction: TrafficRestriction = entries.into_iter().next().unwrap().into();
        assert_eq!(restriction.location, [61.3, 25.1]);
        assert_eq!(restriction.parts[0].location, [61.4, 25.2]);
        assert_eq!(restriction.parts[0].kind, "SPEED_RESTRICTION");
    }

    #[test]
    fn station_entry_maps_into_reference_table_row() {
        let raw = r#"{"stationShortCode":"HKI","stationName":"Helsinki asema","latitude":60.17,"longitude":24.94}"#;
        let entry: StationEntry = serde_json::from_str(raw).unwrap();
        let station: Station = entry.into();
        assert_eq!(station.station_code, "HKI");
        assert_eq!(station.location, [60.17, 24.94]);
    }
}
