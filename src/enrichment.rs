//! Enrichment of a bare position entry into a fully populated train record.
//!
//! The schedule detail fetch is the one hard requirement: without it the
//! train is skipped for the cycle. The composition fetch is best effort and
//! degrades to sentinel values, since a missing consist should not keep a
//! moving train off the map.

use crate::gateway::{FetchError, RailApiGateway};
use crate::models::{StopKind, Train, TrainStop, VehicleEntry, NOT_AVAILABLE};
use crate::store::TrainDataStore;
use crate::wire_formats::{TimeTableRow, TrainComposition, TrainLocationEntry};
use itertools::Itertools;

/// Build a full train record for a train seen for the first time.
pub async fn enrich_train<G: RailApiGateway>(
    gateway: &G,
    store: &TrainDataStore,
    entry: &TrainLocationEntry,
) -> Result<Train, FetchError> {
    let detail = gateway.fetch_train_detail(entry.train_number).await?;

    let stops = build_itinerary(store, &detail.time_table_rows)?;

    // build_itinerary guarantees at least two rows.
    let first_row = &detail.time_table_rows[0];
    let last_row = &detail.time_table_rows[detail.time_table_rows.len() - 1];

    let summary = match gateway.fetch_composition(entry.train_number).await {
        Ok(composition) if composition.train_number == entry.train_number => {
            summarize_composition(composition)
        }
        // Lookup miss or transport failure, keep the train anyway.
        Ok(_) | Err(_) => CompositionSummary::not_available(),
    };

    Ok(Train {
        train_number: entry.train_number,
        train_type: detail.train_type,
        train_category: detail.train_category,
        commuter_line: detail.commuter_line_id,
        operator_name: store.operator_name(&detail.operator_short_code),
        operator_code: detail.operator_short_code,
        speed: entry.speed,
        location: entry.lat_lon(),
        max_speed: summary.max_speed,
        total_length: summary.total_length,
        stops,
        composition: summary.vehicles,
        arrival_time_end: Some(last_row.scheduled_time),
        journey_time: format_journey_time(first_row, last_row),
        end_stop: store.station_name(&last_row.station_short_code),
    })
}

/// Walk the timetable rows into an ordered itinerary.
///
/// The first row is the departure from the start station and the last row the
/// arrival at the end station. Interior rows come in arrival/departure pairs,
/// one pair per intermediate stop; a trailing unpaired row is dropped.
pub fn build_itinerary(
    store: &TrainDataStore,
    rows: &[TimeTableRow],
) -> Result<Vec<TrainStop>, FetchError> {
    if rows.len() < 2 {
        return Err(FetchError::Empty);
    }

    let first = &rows[0];
    let last = &rows[rows.len() - 1];

    let mut stops = Vec::with_capacity(rows.len() / 2 + 1);
    stops.push(TrainStop {
        kind: StopKind::Start,
        station_name: store.station_name(&first.station_short_code),
        arrival: None,
        departure: Some(first.scheduled_time),
    });

    for (arrival_row, departure_row) in rows[1..rows.len() - 1].iter().tuples() {
        stops.push(TrainStop {
            kind: StopKind::Stop,
            station_name: store.station_name(&arrival_row.station_short_code),
            arrival: Some(arrival_row.scheduled_time),
            departure: Some(departure_row.scheduled_time),
        });
    }

    stops.push(TrainStop {
        kind: StopKind::End,
        station_name: store.station_name(&last.station_short_code),
        arrival: Some(last.scheduled_time),
        departure: None,
    });

    Ok(stops)
}

/// Wall clock difference between the first and last scheduled timestamps,
/// zero padded `HH:MM`.
pub fn format_journey_time(first: &TimeTableRow, last: &TimeTableRow) -> String {
    let minutes = (last.scheduled_time - first.scheduled_time)
        .num_minutes()
        .max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

struct CompositionSummary {
    max_speed: String,
    total_length: String,
    vehicles: Vec<VehicleEntry>,
}

impl CompositionSummary {
    fn not_available() -> CompositionSummary {
        CompositionSummary {
            max_speed: NOT_AVAILABLE.to_string(),
            total_length: NOT_AVAILABLE.to_string(),
            vehicles: vec![VehicleEntry::placeholder()],
        }
    }
}

fn summarize_composition(composition: TrainComposition) -> CompositionSummary {
    let Some(section) = composition.journey_sections.into_iter().next() else {
        return CompositionSummary::not_available();
    };

    let max_speed = match section.maximum_speed {
        Some(speed) => speed.to_string(),
        None => NOT_AVAILABLE.to_string(),
    };
    let total_length = match section.total_length {
        Some(length) => length.to_string(),
        None => NOT_AVAILABLE.to_string(),
    };

    let mut vehicles: Vec<(u32, String)> = section
        .locomotives
        .into_iter()
        .map(|locomotive| (locomotive.location, locomotive.locomotive_type))
        .chain(section.wagons.into_iter().map(|wagon| {
            (
                wagon.location,
                wagon.wagon_type.unwrap_or_else(|| "Wagon".to_string()),
            )
        }))
        .collect();
    vehicles.sort_by_key(|(location, _)| *location);

    let vehicles = vehicles
        .into_iter()
        .map(|(location, name)| VehicleEntry {
            vehicle_number: location,
            vehicle_name: name,
        })
        .collect::<Vec<_>>();

    if vehicles.is_empty() {
        return CompositionSummary {
            max_speed,
            total_length,
            vehicles: vec![VehicleEntry::placeholder()],
        };
    }

    CompositionSummary {
        max_speed,
        total_length,
        vehicles,
    }
}
