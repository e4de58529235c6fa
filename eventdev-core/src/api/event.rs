use reqwest::Method;

use super::ApiClient;
use crate::address::Address;
use crate::aggregate::{EnrichedEvent, EventIndex, aggregate};
use crate::community::{Community, CommunityId};
use crate::error::{EventDevError, EventDevResult};
use crate::event::{Event, EventId, EventPayload};
use crate::reconcile::EventCollection;

impl ApiClient {
    /// GET /event
    pub async fn events(&self) -> EventDevResult<Vec<Event>> {
        self.get_json("/event", "Failed to load events").await
    }

    /// POST /event/{communityId}
    pub async fn create_event(
        &self,
        community_id: CommunityId,
        payload: &EventPayload,
    ) -> EventDevResult<Event> {
        self.send_json(
            Method::POST,
            &format!("/event/{community_id}"),
            payload,
            "Failed to create event",
        )
        .await
    }

    /// PUT /event/{id}
    pub async fn update_event(&self, id: EventId, payload: &EventPayload) -> EventDevResult<Event> {
        self.send_json(
            Method::PUT,
            &format!("/event/{id}"),
            payload,
            "Failed to update event",
        )
        .await
    }

    /// DELETE /event/{id}
    pub async fn delete_event(&self, id: EventId) -> EventDevResult<()> {
        self.delete(&format!("/event/{id}"), "Failed to delete event")
            .await
    }

    /// The three sources fetched concurrently. Fails as a whole if any fails.
    async fn event_sources(&self) -> EventDevResult<(Vec<Event>, Vec<Community>, Vec<Address>)> {
        let (events, communities, addresses) = tokio::try_join!(
            async { self.events().await.map_err(|e| name_source(e, "events")) },
            async { self.communities().await.map_err(|e| name_source(e, "communities")) },
            async { self.addresses().await.map_err(|e| name_source(e, "addresses")) },
        )?;

        tracing::debug!(
            events = events.len(),
            communities = communities.len(),
            addresses = addresses.len(),
            "Fetched event sources"
        );
        Ok((events, communities, addresses))
    }

    /// Events, communities and addresses fetched concurrently and joined.
    ///
    /// Nothing is joined unless all three succeed; the first failure is
    /// returned on its own.
    pub async fn enriched_events(&self) -> EventDevResult<(Vec<EnrichedEvent>, EventIndex)> {
        let (events, communities, addresses) = self.event_sources().await?;
        Ok(aggregate(events, communities, addresses))
    }

    /// Same fetch as [`ApiClient::enriched_events`], kept as a collection
    /// that later writes can reconcile against.
    pub async fn event_collection(&self) -> EventDevResult<EventCollection> {
        let (events, communities, addresses) = self.event_sources().await?;
        Ok(EventCollection::new(events, communities, addresses))
    }
}

/// Prefix a source failure with the resource it came from, so a message
/// taken from the server body still says which of the three requests failed.
fn name_source(err: EventDevError, resource: &str) -> EventDevError {
    let prefix = format!("Failed to load {resource}");
    match err {
        EventDevError::Http { status, message } if !message.starts_with(&prefix) => {
            EventDevError::Http {
                status,
                message: format!("{prefix}: {message}"),
            }
        }
        EventDevError::Connection(detail) => EventDevError::Connection(format!("{prefix}: {detail}")),
        EventDevError::Serialization(detail) => {
            EventDevError::Serialization(format!("{prefix}: {detail}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_source_prefixes_server_message() {
        let err = name_source(
            EventDevError::Http {
                status: 500,
                message: "Internal server error".into(),
            },
            "communities",
        );
        assert_eq!(
            err.to_string(),
            "Failed to load communities: Internal server error (HTTP 500)"
        );
    }

    #[test]
    fn test_name_source_keeps_fallback_as_is() {
        let err = name_source(
            EventDevError::Http {
                status: 404,
                message: "Failed to load addresses".into(),
            },
            "addresses",
        );
        assert_eq!(err.to_string(), "Failed to load addresses (HTTP 404)");
    }

    #[test]
    fn test_name_source_prefixes_connection_error() {
        let err = name_source(EventDevError::Connection("refused".into()), "events");
        assert!(err.is_connection());
        assert_eq!(
            err.to_string(),
            "Connection error: Failed to load events: refused"
        );
    }
}
