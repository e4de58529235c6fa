use reqwest::Method;
use serde_json::Value;

use super::ApiClient;
use crate::community::{Community, CommunityId, CommunityPayload, generate_slug};
use crate::error::{EventDevError, EventDevResult};

impl ApiClient {
    /// GET /community
    pub async fn communities(&self) -> EventDevResult<Vec<Community>> {
        self.get_json("/community", "Failed to load communities")
            .await
    }

    /// GET /community/{id}
    pub async fn community(&self, id: CommunityId) -> EventDevResult<Community> {
        self.get_json(&format!("/community/{id}"), "Failed to load community")
            .await
    }

    /// GET /community/my-community
    ///
    /// The community owned by the signed-in user. Any non-success answer or
    /// an empty body means "none".
    pub async fn my_community(&self) -> EventDevResult<Option<Community>> {
        let response = self
            .request(Method::GET, "/community/my-community")
            .send()
            .await
            .map_err(|e| EventDevError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = response.status().as_u16(), "No community for user");
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| EventDevError::Connection(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| EventDevError::Serialization(e.to_string())),
            Err(e) => Err(EventDevError::Serialization(e.to_string())),
        }
    }

    /// Find a community by the key used in its public URL.
    ///
    /// Fetches the full list and applies [`resolve_slug`]; `NotFound` when
    /// nothing matches.
    pub async fn community_by_slug(&self, key: &str) -> EventDevResult<Community> {
        let communities = self.communities().await?;
        resolve_slug(&communities, key)
            .cloned()
            .ok_or_else(|| EventDevError::NotFound(format!("Community '{key}'")))
    }

    /// POST /community
    pub async fn create_community(&self, payload: &CommunityPayload) -> EventDevResult<Community> {
        let body = payload.to_body()?;
        self.send_json(Method::POST, "/community", &body, "Failed to create community")
            .await
    }

    /// PUT /community/{id}
    pub async fn update_community(
        &self,
        id: CommunityId,
        payload: &CommunityPayload,
    ) -> EventDevResult<Community> {
        let body = payload.to_body()?;
        self.send_json(
            Method::PUT,
            &format!("/community/{id}"),
            &body,
            "Failed to update community",
        )
        .await
    }

    /// DELETE /community/{id}
    pub async fn delete_community(&self, id: CommunityId) -> EventDevResult<()> {
        self.delete(&format!("/community/{id}"), "Failed to delete community")
            .await
    }
}

/// Match a URL key against the community list.
///
/// Rules, first hit wins:
/// 1. stored slug equals the key
/// 2. slug derived from the name equals the key
/// 3. the key is an integer equal to the id
/// 4. the lowercased name contains the key with hyphens read as spaces
pub fn resolve_slug<'a>(communities: &'a [Community], key: &str) -> Option<&'a Community> {
    if let Some(c) = communities.iter().find(|c| c.slug.as_deref() == Some(key)) {
        return Some(c);
    }

    if let Some(c) = communities.iter().find(|c| generate_slug(&c.name) == key) {
        return Some(c);
    }

    if let Ok(id) = key.trim().parse::<CommunityId>() {
        if let Some(c) = communities.iter().find(|c| c.id == id) {
            return Some(c);
        }
    }

    // Loose: "rust" also matches "Rustaceans BR".
    let needle = key.replace('-', " ").to_lowercase();
    communities
        .iter()
        .find(|c| !c.name.is_empty() && c.name.to_lowercase().contains(&needle))
}
