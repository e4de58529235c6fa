//! Joins events with their community and venue.

use std::collections::HashMap;

use serde::Serialize;

use crate::address::{Address, AddressId};
use crate::community::{Community, CommunityId};
use crate::event::{Event, EventId};

/// An event with its foreign keys resolved, ready for display.
///
/// Never persisted. A key that points nowhere resolves to `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub community: Option<Community>,
    pub address: Option<Address>,
    /// Lowercase modality, empty when the event has none.
    pub modality_key: String,
}

impl EnrichedEvent {
    pub fn id(&self) -> EventId {
        self.event.id
    }

    pub fn community_id(&self) -> Option<CommunityId> {
        self.event.id_community
    }

    /// Human-readable venue line.
    pub fn venue(&self) -> String {
        if self.modality_key == "online" {
            return "Online event".to_string();
        }
        match &self.address {
            Some(address) => address.one_line(),
            None => "Address not provided".to_string(),
        }
    }
}

/// Lookup maps for the join, built once per fetch and reused for single-record
/// re-joins after a write.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    communities: HashMap<CommunityId, Community>,
    addresses: HashMap<AddressId, Address>,
}

impl EventIndex {
    pub fn new(communities: Vec<Community>, addresses: Vec<Address>) -> Self {
        EventIndex {
            communities: communities.into_iter().map(|c| (c.id, c)).collect(),
            addresses: addresses.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    pub fn community(&self, id: CommunityId) -> Option<&Community> {
        self.communities.get(&id)
    }

    pub fn address(&self, id: AddressId) -> Option<&Address> {
        self.addresses.get(&id)
    }

    pub fn communities(&self) -> impl Iterator<Item = &Community> {
        self.communities.values()
    }

    pub fn upsert_community(&mut self, community: Community) {
        self.communities.insert(community.id, community);
    }

    pub fn remove_community(&mut self, id: CommunityId) -> Option<Community> {
        self.communities.remove(&id)
    }

    pub fn upsert_address(&mut self, address: Address) {
        self.addresses.insert(address.id, address);
    }

    /// Resolve one event against the maps.
    pub fn enrich(&self, event: Event) -> EnrichedEvent {
        let community = event
            .id_community
            .and_then(|id| self.community(id))
            .cloned();
        let address = event.id_address.and_then(|id| self.address(id)).cloned();
        let modality_key = event
            .modality
            .as_ref()
            .map(|m| m.key().to_string())
            .unwrap_or_default();

        EnrichedEvent {
            event,
            community,
            address,
            modality_key,
        }
    }
}

/// Join three independently fetched collections. Output keeps input order and
/// length.
pub fn aggregate(
    events: Vec<Event>,
    communities: Vec<Community>,
    addresses: Vec<Address>,
) -> (Vec<EnrichedEvent>, EventIndex) {
    let index = EventIndex::new(communities, addresses);
    let enriched = events.into_iter().map(|e| index.enrich(e)).collect();
    (enriched, index)
}
