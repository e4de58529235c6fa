//! Keeps a screen's enriched events consistent with writes it just made,
//! without fetching all three resources again.

use crate::address::Address;
use crate::aggregate::{EnrichedEvent, EventIndex, aggregate};
use crate::community::{Community, CommunityId};
use crate::event::{Event, EventId};

/// Enriched events plus the maps they were joined against.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: Vec<EnrichedEvent>,
    index: EventIndex,
}

impl EventCollection {
    pub fn new(events: Vec<Event>, communities: Vec<Community>, addresses: Vec<Address>) -> Self {
        let (events, index) = aggregate(events, communities, addresses);
        EventCollection { events, index }
    }

    pub fn events(&self) -> &[EnrichedEvent] {
        &self.events
    }

    pub fn index(&self) -> &EventIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&EnrichedEvent> {
        self.events.iter().find(|e| e.id() == id)
    }

    /// Drop the event with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id() != id);
        self.events.len() != before
    }

    /// Replace the event with the same id in place, re-joined against the
    /// cached maps. Appends if the id is not present.
    pub fn replace(&mut self, event: Event) {
        let enriched = self.index.enrich(event);
        match self.events.iter_mut().find(|e| e.id() == enriched.id()) {
            Some(slot) => *slot = enriched,
            None => self.events.push(enriched),
        }
    }

    /// Append a newly created event.
    pub fn insert(&mut self, event: Event) {
        let enriched = self.index.enrich(event);
        self.events.push(enriched);
    }

    /// Record a venue the server returned alongside a write.
    pub fn upsert_address(&mut self, address: Address) {
        let id = address.id;
        self.index.upsert_address(address.clone());
        for event in self
            .events
            .iter_mut()
            .filter(|e| e.event.id_address == Some(id))
        {
            event.address = Some(address.clone());
        }
    }

    /// Propagate an updated community to the map and every event it owns.
    pub fn upsert_community(&mut self, community: Community) {
        for event in self
            .events
            .iter_mut()
            .filter(|e| e.community_id() == Some(community.id))
        {
            event.community = Some(community.clone());
        }
        self.index.upsert_community(community);
    }

    /// Forget a deleted community; its events stay but resolve to no owner.
    pub fn remove_community(&mut self, id: CommunityId) {
        self.index.remove_community(id);
        for event in self
            .events
            .iter_mut()
            .filter(|e| e.community_id() == Some(id))
        {
            event.community = None;
        }
    }
}
