//! Filtered and ordered subsets of enriched events for each screen.
//!
//! Selectors borrow their input and never modify it. For a fixed input and a
//! fixed `now` they always return the same thing.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

use crate::aggregate::EnrichedEvent;
use crate::community::CommunityId;
use crate::event::Modality;

/// Toggle on the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpcomingFilter {
    #[default]
    All,
    /// Online or hybrid
    Online,
}

/// Modality selector on a community page or the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalityFilter {
    #[default]
    All,
    Online,
    Presential,
    Hybrid,
}

impl ModalityFilter {
    pub fn matches(&self, event: &EnrichedEvent) -> bool {
        match self {
            ModalityFilter::All => true,
            ModalityFilter::Online => event.modality_key == "online",
            ModalityFilter::Presential => event.modality_key == "presential",
            ModalityFilter::Hybrid => event.modality_key == "hybrid",
        }
    }
}

impl FromStr for ModalityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "todos" | "eventos" => Ok(ModalityFilter::All),
            "online" => Ok(ModalityFilter::Online),
            "presential" | "presencial" => Ok(ModalityFilter::Presential),
            "hybrid" | "híbrido" | "hibrido" => Ok(ModalityFilter::Hybrid),
            other => Err(format!(
                "Unknown modality '{}'. Expected all, online, presential or hybrid",
                other
            )),
        }
    }
}

impl fmt::Display for ModalityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModalityFilter::All => "all",
            ModalityFilter::Online => "online",
            ModalityFilter::Presential => "presential",
            ModalityFilter::Hybrid => "hybrid",
        };
        write!(f, "{}", label)
    }
}

/// Events that have not started yet, soonest first.
///
/// Unparsable starts and starts strictly before `now` are dropped. Ties keep
/// input order.
pub fn upcoming<'a>(
    events: &'a [EnrichedEvent],
    now: DateTime<Utc>,
    filter: UpcomingFilter,
) -> Vec<&'a EnrichedEvent> {
    let mut selected: Vec<(DateTime<Utc>, &EnrichedEvent)> = events
        .iter()
        .filter_map(|e| e.event.start().map(|start| (start, e)))
        .filter(|(start, _)| *start >= now)
        .filter(|(_, e)| match filter {
            UpcomingFilter::All => true,
            UpcomingFilter::Online => e.event.modality.as_ref().is_some_and(Modality::is_remote),
        })
        .collect();

    // sort_by_key is stable
    selected.sort_by_key(|(start, _)| *start);
    selected.into_iter().map(|(_, e)| e).collect()
}

/// Events owned by one community, narrowed by modality.
pub fn community_events(
    events: &[EnrichedEvent],
    community_id: CommunityId,
    filter: ModalityFilter,
) -> Vec<&EnrichedEvent> {
    events
        .iter()
        .filter(|e| e.community_id() == Some(community_id))
        .filter(|e| filter.matches(e))
        .collect()
}

fn local_date(event: &EnrichedEvent) -> Option<NaiveDate> {
    event
        .event
        .start()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Distinct days of a month that have at least one matching event, ascending.
pub fn days_with_events(
    events: &[EnrichedEvent],
    year: i32,
    month: u32,
    filter: ModalityFilter,
) -> Vec<u32> {
    events
        .iter()
        .filter(|e| filter.matches(e))
        .filter_map(local_date)
        .filter(|d| d.year() == year && d.month() == month)
        .map(|d| d.day())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Matching events that start on `date` (local time), in input order.
pub fn events_on(
    events: &[EnrichedEvent],
    date: NaiveDate,
    filter: ModalityFilter,
) -> Vec<&EnrichedEvent> {
    events
        .iter()
        .filter(|e| filter.matches(e))
        .filter(|e| local_date(e) == Some(date))
        .collect()
}
