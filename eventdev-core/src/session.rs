//! Who is signed in.
//!
//! A [`Session`] is an explicit object handed to whatever needs identity;
//! there is no global. Credentials are cookies in the [`ApiClient`] jar, so
//! the session and the fetchers must share one client.

use std::path::{Path, PathBuf};

use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::api::{ApiClient, NewUser, parse_json};
use crate::community::CommunityId;
use crate::constants::{ADMIN_EMAIL, ROLE_ADMIN};
use crate::error::{EventDevError, EventDevResult};
use crate::validation::ValidationErrors;

/// Signed-in account as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, alias = "comunidade_id")]
    pub community_id: Option<CommunityId>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// The seeded admin account counts even without the role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN) || self.email.eq_ignore_ascii_case(ADMIN_EMAIL)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[derive(Deserialize)]
struct MeResponse {
    user: Option<User>,
}

#[derive(Deserialize)]
struct SignInResponse {
    status: String,
    #[serde(default, rename = "formFields")]
    form_fields: Vec<SignInFieldError>,
}

#[derive(Deserialize)]
struct SignInFieldError {
    id: String,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Not checked yet.
    #[default]
    Unknown,
    Anonymous,
    Authenticated(User),
}

pub struct Session {
    api: ApiClient,
    state: SessionState,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Session {
            api,
            state: SessionState::Unknown,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// GET /auth/me
    ///
    /// 401/403 or a body without a user means anonymous. Any other failure is
    /// returned and the state is left as it was.
    pub async fn check(&mut self) -> EventDevResult<&SessionState> {
        let result: EventDevResult<MeResponse> =
            self.api.get_json("/auth/me", "Failed to load session").await;

        self.state = match result {
            Ok(MeResponse { user: Some(user) }) => SessionState::Authenticated(user),
            Ok(MeResponse { user: None }) => SessionState::Anonymous,
            Err(EventDevError::Http {
                status: 401 | 403, ..
            }) => SessionState::Anonymous,
            Err(e) => return Err(e),
        };

        tracing::debug!(authenticated = self.is_authenticated(), "Session checked");
        Ok(&self.state)
    }

    /// POST /auth/signin, then [`Session::check`].
    pub async fn sign_in(&mut self, email: &str, password: &str) -> EventDevResult<&User> {
        let body = json!({
            "formFields": [
                { "id": "email", "value": email.trim() },
                { "id": "password", "value": password },
            ]
        });

        let response = self
            .api
            .send(
                self.api
                    .request(Method::POST, "/auth/signin")
                    .header("rid", "emailpassword")
                    .json(&body),
                "Sign-in failed",
            )
            .await?;
        let status = response.status().as_u16();
        let outcome: SignInResponse = parse_json(response).await?;

        match outcome.status.as_str() {
            "OK" => {}
            "WRONG_CREDENTIALS_ERROR" => return Err(EventDevError::WrongCredentials),
            "FIELD_ERROR" => {
                let mut errors = ValidationErrors::new();
                for field in outcome.form_fields {
                    let name = if field.id == "password" { "password" } else { "email" };
                    errors.add(name, field.error);
                }
                return Err(errors.into());
            }
            other => {
                return Err(EventDevError::Http {
                    status,
                    message: format!("Sign-in failed ({other})"),
                });
            }
        }

        self.check().await?;
        self.user().ok_or(EventDevError::Unauthorized)
    }

    /// POST /auth/signout
    ///
    /// Always ends anonymous, even when the backend call fails.
    pub async fn sign_out(&mut self) {
        let result = self
            .api
            .send(
                self.api
                    .request(Method::POST, "/auth/signout")
                    .header("rid", "session"),
                "Sign-out failed",
            )
            .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "Sign-out request failed; clearing local session anyway");
        }
        self.state = SessionState::Anonymous;
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user().is_some_and(|u| u.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    /// The signed-in user, provided they hold `role`.
    pub fn require_role(&self, role: &str) -> EventDevResult<&User> {
        let user = self.user().ok_or(EventDevError::Unauthorized)?;
        let allowed = if role == ROLE_ADMIN {
            user.is_admin()
        } else {
            user.has_role(role)
        };
        if allowed {
            Ok(user)
        } else {
            Err(EventDevError::Forbidden(role.to_string()))
        }
    }

    /// Create an account from the admin panel. Requires an admin session.
    pub async fn create_user(&self, user: &NewUser) -> EventDevResult<()> {
        self.require_role(ROLE_ADMIN)?;
        self.api.create_user(user).await
    }
}

/// Session cookies kept between CLI runs, at
/// ~/.local/share/eventdev/session.toml (platform data dir).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Backend the cookies belong to.
    pub api_url: String,
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl StoredSession {
    pub fn path() -> EventDevResult<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| EventDevError::Config("Could not determine data directory".into()))?
            .join("eventdev");

        Ok(data_dir.join("session.toml"))
    }

    pub fn capture(api: &ApiClient) -> Self {
        StoredSession {
            api_url: api.base_url().to_string(),
            cookies: api.cookies(),
        }
    }

    /// Put saved cookies back into `api`, if they were issued by the same backend.
    pub fn restore(&self, api: &ApiClient) -> bool {
        if self.api_url != api.base_url() {
            tracing::debug!(saved = %self.api_url, current = %api.base_url(), "Ignoring session for another backend");
            return false;
        }
        api.restore_cookies(&self.cookies);
        true
    }

    pub fn load(path: &Path) -> EventDevResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let stored = toml::from_str(&content).map_err(|e| EventDevError::Config(e.to_string()))?;
        Ok(Some(stored))
    }

    pub fn save(&self, path: &Path) -> EventDevResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EventDevError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn clear(path: &Path) -> EventDevResult<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
