use chrono::DateTime;
use chrono::Utc;
use compact_str::CompactString;
use serde::Deserialize;
use serde::Serialize;

/// Sentinel used when the composition lookup cannot supply a value.
pub const NOT_AVAILABLE: &str = "n/a";

/// A live train as tracked between position snapshots.
///
/// Created from one position entry plus the schedule detail and composition
/// fetched on first sighting. Subsequent snapshots only touch `location` and
/// `speed`; everything else is enrichment data that survives for as long as
/// the train stays in the upstream snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub train_number: u32,
    pub train_type: String,
    pub train_category: String,
    pub commuter_line: String,
    pub operator_code: CompactString,
    pub operator_name: String,
    pub speed: f64,
    /// Stored as [latitude, longitude]. Upstream delivers the pair the other
    /// way around, the swap happens at wire decode time.
    pub location: [f64; 2],
    /// Rendered km/h figure, or `NOT_AVAILABLE` when composition data was
    /// missing for this train.
    pub max_speed: String,
    /// Rendered metres figure, or `NOT_AVAILABLE`.
    pub total_length: String,
    pub stops: Vec<TrainStop>,
    pub composition: Vec<VehicleEntry>,
    pub arrival_time_end: Option<DateTime<Utc>>,
    /// Zero padded `HH:MM` between the first and last scheduled timestamps.
    pub journey_time: String,
    pub end_stop: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    Start,
    Stop,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainStop {
    pub kind: StopKind,
    pub station_name: String,
    pub arrival: Option<DateTime<Utc>>,
    pub departure: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleEntry {
    pub vehicle_number: u32,
    pub vehicle_name: String,
}

impl VehicleEntry {
    /// Placeholder entry stored when no composition could be fetched.
    pub fn placeholder() -> VehicleEntry {
        VehicleEntry {
            vehicle_number: 0,
            vehicle_name: "Unknown".to_string(),
        }
    }
}

/// Reference table entry, immutable after bootstrap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_code: CompactString,
    pub station_name: String,
    pub location: [f64; 2],
}

/// Reference table entry, immutable after bootstrap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub id: u32,
    pub operator_short_code: CompactString,
    pub operator_uic_code: u32,
    pub operator_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficRestriction {
    pub id: String,
    pub state: String,
    pub organization: String,
    pub location: [f64; 2],
    pub parts: Vec<RestrictionPart>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestrictionPart {
    pub index: u32,
    pub start_date: String,
    pub kind: String,
    pub location: [f64; 2],
}
