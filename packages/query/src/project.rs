//! Field projection.
//!
//! Without a field list every event passes through whole. With one, each
//! requested name is resolved through [`Field`] and checked against the
//! intent's whitelist; names that fail either step are dropped.

use std::str::FromStr as _;

use quakewatch_event_models::SeismicEvent;
use serde::Serialize;
use serde_json::{Map, Value};
use strum_macros::EnumString;

/// A projected output field.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum Field {
    /// Origin time.
    #[strum(serialize = "time")]
    Time,
    /// Magnitude (`mag` is accepted as an alias).
    #[strum(serialize = "magnitude", serialize = "mag")]
    Magnitude,
    /// Third coordinate.
    #[strum(serialize = "depth")]
    Depth,
    /// Place description.
    #[strum(serialize = "place")]
    Place,
    /// `[longitude, latitude, depth]`.
    #[strum(serialize = "coordinates")]
    Coordinates,
    /// Upstream event id.
    #[strum(serialize = "eventId")]
    EventId,
    /// Upstream origin id.
    #[strum(serialize = "originId")]
    OriginId,
    /// Solution author.
    #[strum(serialize = "author")]
    Author,
    /// Magnitude scale.
    #[strum(serialize = "magnitudeType")]
    MagnitudeType,
    /// Any other upstream property, read by name.
    #[strum(default)]
    Property(String),
}

impl Field {
    /// Output key, also the name whitelists are written in.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Time => "time",
            Self::Magnitude => "magnitude",
            Self::Depth => "depth",
            Self::Place => "place",
            Self::Coordinates => "coordinates",
            Self::EventId => "eventId",
            Self::OriginId => "originId",
            Self::Author => "author",
            Self::MagnitudeType => "magnitudeType",
            Self::Property(name) => name,
        }
    }

    /// Reads this field off an event. `None` means "omit the key".
    ///
    /// Mapped fields always produce a value (`null` when unset) so a
    /// projected record agrees with the full record it came from.
    fn read(&self, event: &SeismicEvent) -> Option<Value> {
        match self {
            Self::Time => Some(to_value(event.time)),
            Self::Magnitude => Some(to_value(event.magnitude)),
            Self::Depth => Some(to_value(event.depth())),
            Self::Place => Some(to_value(&event.place)),
            Self::Coordinates => Some(to_value(event.coordinates)),
            Self::EventId => Some(Value::from(event.event_id)),
            Self::OriginId => Some(to_value(event.origin_id)),
            Self::Author => Some(to_value(&event.author)),
            Self::MagnitudeType => Some(to_value(&event.magnitude_type)),
            Self::Property(name) => event.properties.get(name).cloned(),
        }
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// A processed event: either the whole record or a projection of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventRecord {
    /// No projection requested.
    Full(SeismicEvent),
    /// Only the requested, whitelisted fields.
    Projected(Map<String, Value>),
}

/// Resolves a comma-separated field list against `whitelist`.
///
/// Duplicates collapse to their first occurrence.
#[must_use]
pub fn parse_fields(fields: &str, whitelist: &[&str]) -> Vec<Field> {
    let mut resolved: Vec<Field> = Vec::new();
    for name in fields.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let field = Field::from_str(name).unwrap_or_else(|_| Field::Property(name.to_string()));
        if !whitelist.iter().any(|allowed| *allowed == field.name()) {
            log::debug!("Ignoring projection field '{name}'");
            continue;
        }
        if !resolved.contains(&field) {
            resolved.push(field);
        }
    }
    resolved
}

/// Projects events onto the requested fields.
///
/// If `fields` is `None`, or no requested field survives the whitelist,
/// every event passes through whole.
#[must_use]
pub fn project_events(
    events: Vec<SeismicEvent>,
    fields: Option<&str>,
    whitelist: &[&str],
) -> Vec<EventRecord> {
    let resolved = fields.map(|f| parse_fields(f, whitelist)).unwrap_or_default();
    if resolved.is_empty() {
        return events.into_iter().map(EventRecord::Full).collect();
    }

    events
        .iter()
        .map(|event| {
            let record = resolved
                .iter()
                .filter_map(|field| field.read(event).map(|v| (field.name().to_string(), v)))
                .collect();
            EventRecord::Projected(record)
        })
        .collect()
}
