pub mod admin;
pub mod auth;
pub mod calendar;
pub mod cep;
pub mod communities;
pub mod community;
pub mod event;
pub mod events;

use std::path::Path;

use anyhow::Result;
use eventdev_core::api::ApiClient;
use eventdev_core::config::EventDevConfig;
use eventdev_core::session::{Session, StoredSession};

/// Load saved cookies into `api`. An unreadable file only costs the session.
fn restore_saved_session(api: &ApiClient, path: &Path) -> bool {
    match StoredSession::load(path) {
        Ok(Some(stored)) => stored.restore(api),
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Ignoring unreadable saved session");
            false
        }
    }
}

/// What every command needs: the config and a client carrying any saved
/// session cookies.
pub struct Context {
    pub config: EventDevConfig,
    pub api: ApiClient,
}

impl Context {
    pub fn load() -> Result<Self> {
        let config = EventDevConfig::load()?;
        let api = ApiClient::from_config(&config)?;

        restore_saved_session(&api, &StoredSession::path()?);

        Ok(Context { config, api })
    }

    /// A session checked against the backend.
    pub async fn session(&self) -> Result<Session> {
        let mut session = Session::new(self.api.clone());
        session.check().await?;
        Ok(session)
    }

    /// Write the current cookies so the next run stays signed in.
    pub fn save_session(&self) -> Result<()> {
        StoredSession::capture(&self.api).save(&StoredSession::path()?)?;
        Ok(())
    }

    pub fn forget_session(&self) -> Result<()> {
        StoredSession::clear(&StoredSession::path()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_session_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("eventdev-{}-{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_corrupt_session_is_ignored() {
        let api = ApiClient::new("http://localhost:5122/api/v1").unwrap();
        let path = temp_session_file("corrupt", "api_url = [not toml");

        assert!(!restore_saved_session(&api, &path));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_session_is_ignored() {
        let api = ApiClient::new("http://localhost:5122/api/v1").unwrap();
        let path = std::env::temp_dir().join("eventdev-no-such-session.toml");

        assert!(!restore_saved_session(&api, &path));
    }

    #[test]
    fn test_saved_session_is_restored() {
        let api = ApiClient::new("http://localhost:5122/api/v1").unwrap();
        let path = std::env::temp_dir().join(format!("eventdev-{}-saved.toml", std::process::id()));
        StoredSession::capture(&api).save(&path).unwrap();

        assert!(restore_saved_session(&api, &path));
        std::fs::remove_file(&path).unwrap();
    }
}
