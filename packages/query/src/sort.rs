//! Deterministic multi-key sort.
//!
//! Sort keys map onto event fields through [`SortKey`], an explicit tagged
//! mapping: a key that does not parse, or is not in the intent's
//! whitelist, is dropped from the sort string instead of failing the
//! request. Missing values always sort last, whatever the direction.

use std::cmp::Ordering;
use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use quakewatch_event_models::SeismicEvent;
use strum_macros::{Display, EnumString};

/// A sortable event attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum SortKey {
    /// Origin time.
    #[strum(serialize = "time")]
    Time,
    /// Magnitude (`mag` is accepted as an alias).
    #[strum(to_string = "magnitude", serialize = "mag")]
    Magnitude,
    /// Third coordinate.
    #[strum(serialize = "depth")]
    Depth,
    /// Upstream event id.
    #[strum(serialize = "eventId")]
    EventId,
    /// Upstream origin id.
    #[strum(serialize = "originId")]
    OriginId,
    /// Place description.
    #[strum(serialize = "place")]
    Place,
    /// Solution author.
    #[strum(serialize = "author")]
    Author,
    /// Magnitude scale.
    #[strum(serialize = "magnitudeType")]
    MagnitudeType,
}

/// A comparable value read off an event for one [`SortKey`].
#[derive(Debug, Clone, Copy, PartialEq)]
enum SortValue<'a> {
    Int(i64),
    Number(f64),
    Time(DateTime<Utc>),
    Text(&'a str),
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            // One key always yields one variant.
            _ => Ordering::Equal,
        }
    }
}

impl SortKey {
    fn value(self, event: &SeismicEvent) -> Option<SortValue<'_>> {
        match self {
            Self::Time => event.time.map(SortValue::Time),
            Self::Magnitude => event.magnitude.map(SortValue::Number),
            Self::Depth => event.depth().map(SortValue::Number),
            Self::EventId => Some(SortValue::Int(event.event_id)),
            Self::OriginId => event.origin_id.map(SortValue::Int),
            Self::Place => event.place.as_deref().map(SortValue::Text),
            Self::Author => event.author.as_deref().map(SortValue::Text),
            Self::MagnitudeType => event.magnitude_type.as_deref().map(SortValue::Text),
        }
    }
}

/// One key of a sort specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortTerm {
    /// Attribute to compare.
    pub key: SortKey,
    /// `true` for descending order.
    pub descending: bool,
}

impl SortTerm {
    /// Ascending term.
    #[must_use]
    pub const fn asc(key: SortKey) -> Self {
        Self {
            key,
            descending: false,
        }
    }

    /// Descending term.
    #[must_use]
    pub const fn desc(key: SortKey) -> Self {
        Self {
            key,
            descending: true,
        }
    }

    fn compare(&self, a: &SeismicEvent, b: &SeismicEvent) -> Ordering {
        match (self.key.value(a), self.key.value(b)) {
            (Some(x), Some(y)) => {
                let ord = x.compare(&y);
                if self.descending { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Parses a comma-separated sort specification.
///
/// Each key may carry a leading `-` (descending) or `+` (ascending). Keys
/// that do not parse or are not in `whitelist` are dropped. If nothing
/// survives, `default` is returned.
#[must_use]
pub fn parse_sort(
    spec: Option<&str>,
    whitelist: &[SortKey],
    default: &[SortTerm],
) -> Vec<SortTerm> {
    let terms: Vec<SortTerm> = spec
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let (descending, name) = match token.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, token.strip_prefix('+').unwrap_or(token)),
            };
            match SortKey::from_str(name.trim()) {
                Ok(key) if whitelist.contains(&key) => Some(SortTerm { key, descending }),
                _ => {
                    log::debug!("Ignoring sort key '{token}'");
                    None
                }
            }
        })
        .collect();

    if terms.is_empty() {
        default.to_vec()
    } else {
        terms
    }
}

/// Sorts events lexicographically over `terms`. The sort is stable.
pub fn sort_events(events: &mut [SeismicEvent], terms: &[SortTerm]) {
    events.sort_by(|a, b| {
        terms
            .iter()
            .map(|term| term.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
