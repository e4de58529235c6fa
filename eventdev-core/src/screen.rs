//! Per-screen state owners.
//!
//! Each screen owns its own [`EventCollection`]; nothing is shared between
//! screens. Loads are stamped with a generation [`Ticket`] and applied only if
//! still current. Writes go to the backend first and touch local state only
//! after it succeeds.

use chrono::{DateTime, Utc};

use crate::aggregate::EnrichedEvent;
use crate::api::ApiClient;
use crate::community::{Community, CommunityForm};
use crate::error::{EventDevError, EventDevResult};
use crate::event::{EventForm, EventId};
use crate::generation::{Generations, Ticket};
use crate::reconcile::EventCollection;
use crate::view::{ModalityFilter, UpcomingFilter, community_events, upcoming};

/// Apply `result` only if `ticket` is still the newest one.
///
/// A stale result is dropped, errors included; `Ok(false)` tells the caller
/// nothing changed.
fn settle<T>(
    generations: &Generations,
    ticket: Ticket,
    result: EventDevResult<T>,
    apply: impl FnOnce(T),
) -> EventDevResult<bool> {
    if !generations.is_current(&ticket) {
        tracing::debug!(?ticket, ok = result.is_ok(), "Discarding stale load");
        return Ok(false);
    }
    apply(result?);
    Ok(true)
}

/// Landing screen: the next few events and the community list.
pub struct HomeScreen {
    api: ApiClient,
    generations: Generations,
    events: EventCollection,
}

impl HomeScreen {
    pub fn new(api: ApiClient) -> Self {
        HomeScreen {
            api,
            generations: Generations::new(),
            events: EventCollection::default(),
        }
    }

    /// Handle for closing the screen from elsewhere.
    pub fn generations(&self) -> Generations {
        self.generations.clone()
    }

    /// Fetch everything and replace local state. `Ok(false)` if a newer load
    /// or a close overtook this one.
    pub async fn load(&mut self) -> EventDevResult<bool> {
        let ticket = self.generations.begin();
        let result = self.api.event_collection().await;
        self.apply(ticket, result)
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: EventDevResult<EventCollection>,
    ) -> EventDevResult<bool> {
        settle(&self.generations, ticket, result, |events| self.events = events)
    }

    pub fn events(&self) -> &EventCollection {
        &self.events
    }

    /// First `limit` upcoming events.
    pub fn upcoming(
        &self,
        now: DateTime<Utc>,
        filter: UpcomingFilter,
        limit: usize,
    ) -> Vec<&EnrichedEvent> {
        let mut selected = upcoming(self.events.events(), now, filter);
        selected.truncate(limit);
        selected
    }

    /// Active communities, alphabetically.
    pub fn communities(&self) -> Vec<&Community> {
        let mut communities: Vec<_> = self
            .events
            .index()
            .communities()
            .filter(|c| c.is_active)
            .collect();
        communities.sort_by_key(|c| c.name.to_lowercase());
        communities
    }

    pub fn close(&self) {
        self.generations.close();
    }
}

/// One community's page: profile plus its events, with owner actions.
pub struct CommunityScreen {
    api: ApiClient,
    generations: Generations,
    key: String,
    community: Option<Community>,
    events: EventCollection,
}

impl CommunityScreen {
    /// `key` is whatever appeared in the URL: slug, derived slug, id or a
    /// fragment of the name.
    pub fn new(api: ApiClient, key: impl Into<String>) -> Self {
        CommunityScreen {
            api,
            generations: Generations::new(),
            key: key.into(),
            community: None,
            events: EventCollection::default(),
        }
    }

    /// A screen over a community and collection the caller already fetched.
    pub fn from_loaded(api: ApiClient, community: Community, events: EventCollection) -> Self {
        CommunityScreen {
            api,
            generations: Generations::new(),
            key: community.effective_slug(),
            community: Some(community),
            events,
        }
    }

    pub fn generations(&self) -> Generations {
        self.generations.clone()
    }

    pub async fn load(&mut self) -> EventDevResult<bool> {
        let ticket = self.generations.begin();
        let result = tokio::try_join!(
            self.api.community_by_slug(&self.key),
            self.api.event_collection()
        );
        self.apply(ticket, result)
    }

    pub fn apply(
        &mut self,
        ticket: Ticket,
        result: EventDevResult<(Community, EventCollection)>,
    ) -> EventDevResult<bool> {
        settle(&self.generations, ticket, result, |(community, events)| {
            self.community = Some(community);
            self.events = events;
        })
    }

    pub fn community(&self) -> Option<&Community> {
        self.community.as_ref()
    }

    fn loaded(&self) -> EventDevResult<&Community> {
        self.community
            .as_ref()
            .ok_or_else(|| EventDevError::NotFound(format!("Community '{}'", self.key)))
    }

    /// This community's events, narrowed by modality.
    pub fn events(&self, filter: ModalityFilter) -> Vec<&EnrichedEvent> {
        match &self.community {
            Some(community) => community_events(self.events.events(), community.id, filter),
            None => Vec::new(),
        }
    }

    pub fn event(&self, id: EventId) -> Option<&EnrichedEvent> {
        self.events
            .get(id)
            .filter(|e| e.community_id() == self.community.as_ref().map(|c| c.id))
    }

    /// DELETE the event, then drop it locally.
    pub async fn delete_event(&mut self, id: EventId) -> EventDevResult<()> {
        self.api.delete_event(id).await?;
        self.events.remove(id);
        Ok(())
    }

    /// Validate, PUT, then swap the returned record in place.
    pub async fn update_event(
        &mut self,
        id: EventId,
        form: &EventForm,
        today: chrono::NaiveDate,
    ) -> EventDevResult<&EnrichedEvent> {
        form.validate(today)?;
        let mut updated = self.api.update_event(id, &form.update_payload()).await?;
        let updated_id = updated.id;
        if let Some(address) = updated.address.take() {
            self.events.upsert_address(address);
        }
        self.events.replace(updated);
        self.events
            .get(updated_id)
            .ok_or_else(|| EventDevError::NotFound(format!("Event {updated_id}")))
    }

    /// Validate, POST under this community, then append the created record.
    pub async fn create_event(
        &mut self,
        form: &EventForm,
        today: chrono::NaiveDate,
    ) -> EventDevResult<&EnrichedEvent> {
        form.validate(today)?;
        let community_id = self.loaded()?.id;
        let mut created = self
            .api
            .create_event(community_id, &form.create_payload())
            .await?;
        let created_id = created.id;
        if let Some(address) = created.address.take() {
            self.events.upsert_address(address);
        }
        self.events.insert(created);
        self.events
            .get(created_id)
            .ok_or_else(|| EventDevError::NotFound(format!("Event {created_id}")))
    }

    /// Validate, PUT the profile, then propagate it to every event it owns.
    pub async fn update_community(&mut self, form: &CommunityForm) -> EventDevResult<&Community> {
        form.validate()?;
        let id = self.loaded()?.id;
        let updated = self.api.update_community(id, &form.update_payload()).await?;
        self.events.upsert_community(updated.clone());
        Ok(self.community.insert(updated))
    }

    /// DELETE the community. Local state forgets it only on success.
    pub async fn delete_community(&mut self) -> EventDevResult<()> {
        let id = self.loaded()?.id;
        self.api.delete_community(id).await?;
        self.events.remove_community(id);
        self.community = None;
        Ok(())
    }

    pub fn close(&self) {
        self.generations.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{make_community, make_event};

    fn api() -> ApiClient {
        ApiClient::new("http://localhost:5122/api/v1").unwrap()
    }

    fn collection() -> EventCollection {
        EventCollection::new(
            vec![
                make_event(1, 10, "2030-01-01T10:00:00Z"),
                make_event(2, 20, "2030-01-02T10:00:00Z"),
            ],
            vec![make_community(10, "Rust BR"), make_community(20, "Go SP")],
            vec![],
        )
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut home = HomeScreen::new(api());
        let old = home.generations().begin();
        let new = home.generations().begin();

        assert!(!home.apply(old, Ok(collection())).unwrap());
        assert!(home.events().is_empty());

        assert!(home.apply(new, Ok(collection())).unwrap());
        assert_eq!(home.events().len(), 2);
    }

    #[test]
    fn test_stale_error_is_discarded_current_error_returned() {
        let mut home = HomeScreen::new(api());
        let old = home.generations().begin();
        let current = home.generations().begin();

        assert!(!home.apply(old, Err(EventDevError::Unauthorized)).unwrap());
        assert!(home.apply(current, Err(EventDevError::Unauthorized)).is_err());
    }

    #[test]
    fn test_closed_screen_ignores_results() {
        let mut home = HomeScreen::new(api());
        let ticket = home.generations().begin();
        home.close();
        assert!(!home.apply(ticket, Ok(collection())).unwrap());
        assert!(home.events().is_empty());
    }

    #[test]
    fn test_home_limit_and_communities() {
        let mut home = HomeScreen::new(api());
        let ticket = home.generations().begin();
        home.apply(ticket, Ok(collection())).unwrap();

        let now = "2029-12-31T00:00:00Z".parse().unwrap();
        assert_eq!(home.upcoming(now, UpcomingFilter::All, 1).len(), 1);
        let names: Vec<_> = home.communities().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Go SP", "Rust BR"]);
    }

    #[test]
    fn test_community_screen_events_scoped_to_community() {
        let mut screen = CommunityScreen::new(api(), "rust-br");
        let ticket = screen.generations().begin();
        screen
            .apply(ticket, Ok((make_community(10, "Rust BR"), collection())))
            .unwrap();

        let ids: Vec<_> = screen.events(ModalityFilter::All).iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1]);
        assert!(screen.event(2).is_none());
        assert!(screen.event(1).is_some());
    }

    #[test]
    fn test_from_loaded_keeps_fetched_state() {
        let screen = CommunityScreen::from_loaded(api(), make_community(20, "Go SP"), collection());

        assert_eq!(screen.community().unwrap().id, 20);
        let ids: Vec<_> = screen.events(ModalityFilter::All).iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(screen.loaded().unwrap().name, "Go SP");
    }

    #[test]
    fn test_unloaded_community_screen_is_empty() {
        let screen = CommunityScreen::new(api(), "rust-br");
        assert!(screen.community().is_none());
        assert!(screen.events(ModalityFilter::All).is_empty());
    }
}
