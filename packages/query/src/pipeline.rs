//! Sort → project → paginate, applied identically to every intent.

use quakewatch_event_models::SeismicEvent;

use crate::EventPage;
use crate::paginate::paginate;
use crate::params::ListOptions;
use crate::profile::EndpointProfile;
use crate::project::project_events;
use crate::sort::{parse_sort, sort_events};

/// Runs the full result pipeline over a filtered candidate set.
#[must_use]
pub fn process(
    mut events: Vec<SeismicEvent>,
    profile: &EndpointProfile,
    options: &ListOptions,
) -> EventPage {
    let terms = parse_sort(
        options.sort.as_deref(),
        profile.sort_keys,
        profile.default_sort,
    );
    sort_events(&mut events, &terms);

    let records = project_events(events, options.fields.as_deref(), profile.fields);
    paginate(records, options.page, options.limit)
}
