//! Query intents and their per-endpoint sort/projection whitelists.

use strum_macros::{AsRefStr, Display, EnumString};

use crate::sort::{SortKey, SortTerm};

/// A query intent. One per REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    /// Year to date.
    Recent,
    /// Today, UTC.
    Today,
    /// The last seven days.
    LastWeek,
    /// One calendar month.
    Month,
    /// Explicit date range with optional magnitude/depth bounds.
    DateRange,
    /// Year to date inside a named region.
    Region,
    /// Year to date at or below a depth.
    Depth,
    /// Year to date above a magnitude.
    Magnitude,
    /// Year to date within a radius of a point.
    Location,
    /// A single event by id.
    EventId,
}

/// Sort and projection rules for one intent.
#[derive(Debug, Clone, Copy)]
pub struct EndpointProfile {
    /// Keys the caller may sort by.
    pub sort_keys: &'static [SortKey],
    /// Sort used when the caller sends no usable sort key.
    pub default_sort: &'static [SortTerm],
    /// Fields the caller may project onto.
    pub fields: &'static [&'static str],
}

const STANDARD_SORT_KEYS: &[SortKey] = &[
    SortKey::Time,
    SortKey::Magnitude,
    SortKey::Depth,
    SortKey::EventId,
    SortKey::Place,
];

const EXTENDED_SORT_KEYS: &[SortKey] = &[
    SortKey::Time,
    SortKey::Magnitude,
    SortKey::Depth,
    SortKey::EventId,
    SortKey::OriginId,
    SortKey::Place,
    SortKey::Author,
    SortKey::MagnitudeType,
];

const STANDARD_FIELDS: &[&str] = &[
    "eventId",
    "time",
    "magnitude",
    "magnitudeType",
    "depth",
    "place",
    "coordinates",
];

const EXTENDED_FIELDS: &[&str] = &[
    "eventId",
    "originId",
    "time",
    "author",
    "magnitude",
    "magnitudeType",
    "magAuthor",
    "depth",
    "place",
    "coordinates",
    "type",
];

const NEWEST_FIRST: &[SortTerm] = &[SortTerm::desc(SortKey::Time)];

const STANDARD: EndpointProfile = EndpointProfile {
    sort_keys: STANDARD_SORT_KEYS,
    default_sort: NEWEST_FIRST,
    fields: STANDARD_FIELDS,
};

const RECENT: EndpointProfile = EndpointProfile {
    sort_keys: EXTENDED_SORT_KEYS,
    default_sort: NEWEST_FIRST,
    fields: EXTENDED_FIELDS,
};

const DEPTH: EndpointProfile = EndpointProfile {
    sort_keys: STANDARD_SORT_KEYS,
    default_sort: &[SortTerm::desc(SortKey::Depth), SortTerm::desc(SortKey::Time)],
    fields: STANDARD_FIELDS,
};

const MAGNITUDE: EndpointProfile = EndpointProfile {
    sort_keys: STANDARD_SORT_KEYS,
    default_sort: &[
        SortTerm::desc(SortKey::Magnitude),
        SortTerm::desc(SortKey::Time),
    ],
    fields: STANDARD_FIELDS,
};

impl Intent {
    /// Sort and projection rules for this intent.
    #[must_use]
    pub const fn profile(self) -> &'static EndpointProfile {
        match self {
            Self::Recent | Self::EventId => &RECENT,
            Self::Depth => &DEPTH,
            Self::Magnitude => &MAGNITUDE,
            Self::Today
            | Self::LastWeek
            | Self::Month
            | Self::DateRange
            | Self::Region
            | Self::Location => &STANDARD,
        }
    }
}
