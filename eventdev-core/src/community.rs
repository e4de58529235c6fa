//! Communities: the records the backend returns, the registration/edit form,
//! and the payload that goes out on create and update.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;

use crate::error::{EventDevError, EventDevResult};
use crate::validation::{ValidationErrors, check_link, check_required};

pub type CommunityId = i64;

/// Keys the backend rejects when missing; kept even if empty.
pub const REQUIRED_COMMUNITY_FIELDS: &[&str] = &["name"];

fn default_true() -> bool {
    true
}

/// A community as returned by `GET /community`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,

    // Contact and social links. Older records use the `*_url` names.
    #[serde(default, alias = "website_url")]
    pub link_website: Option<String>,
    #[serde(default, alias = "instagram_url")]
    pub link_instagram: Option<String>,
    #[serde(default, alias = "linkedin_url")]
    pub link_linkedin: Option<String>,
    #[serde(default, alias = "github_url")]
    pub link_github: Option<String>,
    #[serde(default, alias = "phone")]
    pub phone_number: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Community {
    /// Stored slug, or the one derived from the name for records that predate slugs.
    pub fn effective_slug(&self) -> String {
        match self.slug.as_deref().filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => generate_slug(&self.name),
        }
    }

    /// Non-empty social/contact links as (label, value) pairs.
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("website", &self.link_website),
            ("instagram", &self.link_instagram),
            ("linkedin", &self.link_linkedin),
            ("github", &self.link_github),
            ("phone", &self.phone_number),
        ]
        .into_iter()
        .filter_map(|(label, v)| {
            v.as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

/// Combining diacritical marks left behind by NFD.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Derive a URL-safe slug from a display name.
///
/// Lowercase, strip accents, keep only `[a-z0-9]`, whitespace and hyphens,
/// then turn each whitespace run into a single hyphen. Existing hyphens are
/// kept as they are, so "GDG - Recife" becomes "gdg---recife".
pub fn generate_slug(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Logo as the form hands it over: either nothing or a candidate URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Logo {
    #[default]
    Absent,
    Url(String),
}

impl Logo {
    /// Normalize whatever the upload widget produced: a bare string, an object
    /// with a `url` field, or nothing.
    pub fn from_value(value: &Value) -> Self {
        let url = match value {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("url").and_then(Value::as_str),
            _ => None,
        };
        Self::from_input(url)
    }

    pub fn from_input(url: Option<&str>) -> Self {
        match url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Logo::Url(s.to_string()),
            None => Logo::Absent,
        }
    }

    /// The URL, only if it is usable as an http(s) link.
    pub fn accepted_url(&self) -> Option<&str> {
        match self {
            Logo::Url(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Some(url.as_str())
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Logo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Logo::from_value(&value))
    }
}

/// Registration / edit form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub logo: Logo,
}

impl CommunityForm {
    /// Prefill an edit form from the stored record.
    pub fn from_community(community: &Community) -> Self {
        CommunityForm {
            name: community.name.clone(),
            description: community.description.clone(),
            phone: community.phone_number.clone(),
            website: community.link_website.clone(),
            instagram: community.link_instagram.clone(),
            linkedin: community.link_linkedin.clone(),
            github: community.link_github.clone(),
            logo: Logo::from_input(community.logo_url.as_deref()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_required(
            &mut errors,
            "name",
            Some(self.name.as_str()),
            "Community name is required",
        );
        check_link(&mut errors, "website", self.website.as_deref());
        check_link(&mut errors, "instagram", self.instagram.as_deref());
        check_link(&mut errors, "linkedin", self.linkedin.as_deref());
        check_link(&mut errors, "github", self.github.as_deref());
        errors.into_result()
    }

    fn base_payload(&self) -> CommunityPayload {
        let logo_url = self.logo.accepted_url().map(str::to_string);
        if logo_url.is_none() && self.logo != Logo::Absent {
            tracing::warn!(logo = ?self.logo, "Dropping logo that is not an http(s) URL");
        }

        CommunityPayload {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            phone_number: self.phone.clone(),
            link_website: self.website.clone(),
            link_instagram: self.instagram.clone(),
            link_linkedin: self.linkedin.clone(),
            link_github: self.github.clone(),
            logo_url,
            slug: None,
            is_active: None,
            updated_at: None,
        }
    }

    /// Payload for `POST /community`.
    pub fn create_payload(&self) -> CommunityPayload {
        CommunityPayload {
            is_active: Some(true),
            ..self.base_payload()
        }
    }

    /// Payload for `PUT /community/{id}`. Replaces the whole record.
    pub fn update_payload(&self) -> CommunityPayload {
        CommunityPayload {
            slug: Some(generate_slug(&self.name)),
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..self.base_payload()
        }
    }
}

/// Outgoing community body, before sanitization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityPayload {
    pub name: String,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub link_website: Option<String>,
    pub link_instagram: Option<String>,
    pub link_linkedin: Option<String>,
    pub link_github: Option<String>,
    pub logo_url: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<String>,
}

impl CommunityPayload {
    /// Serialized and sanitized JSON object, ready to send.
    pub fn to_body(&self) -> EventDevResult<Map<String, Value>> {
        let value =
            serde_json::to_value(self).map_err(|e| EventDevError::Serialization(e.to_string()))?;
        Ok(sanitize_payload(value, REQUIRED_COMMUNITY_FIELDS))
    }
}

/// Drop keys whose value is null or an empty string, except `required` ones.
/// Non-object values yield an empty map.
pub fn sanitize_payload(value: Value, required: &[&str]) -> Map<String, Value> {
    let Value::Object(map) = value else {
        return Map::new();
    };

    map.into_iter()
        .filter(|(key, v)| {
            required.contains(&key.as_str())
                || match v {
                    Value::Null => false,
                    Value::String(s) => !s.is_empty(),
                    _ => true,
                }
        })
        .collect()
}
