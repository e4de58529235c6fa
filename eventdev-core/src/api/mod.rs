//! Resource fetchers for the EventDev REST backend.
//!
//! Every fetcher issues exactly one request and returns the parsed body.
//! Transport failures become [`EventDevError::Connection`]; non-2xx answers
//! become [`EventDevError::Http`] carrying the best message the body offers.

mod address;
mod auth;
mod community;
mod event;

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::EventDevConfig;
use crate::error::{EventDevError, EventDevResult};

pub use auth::{NewUser, SignUpOutcome};
pub use community::resolve_slug;

/// Thin wrapper over one `reqwest::Client` pointed at the backend.
///
/// Session credentials travel as cookies; clones share the same jar.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> EventDevResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| EventDevError::Config(format!("Invalid api_url '{base_url}': {e}")))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| EventDevError::Connection(e.to_string()))?;

        Ok(ApiClient {
            http,
            jar,
            base_url,
        })
    }

    pub fn from_config(config: &EventDevConfig) -> EventDevResult<Self> {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cookie_url(&self) -> Option<Url> {
        Url::parse(&self.base_url).ok()
    }

    /// Cookies currently held for the backend, one `name=value` per entry.
    pub fn cookies(&self) -> Vec<String> {
        self.cookie_url()
            .and_then(|url| self.jar.cookies(&url))
            .and_then(|header| header.to_str().map(str::to_string).ok())
            .map(|header| header.split("; ").map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Seed the jar with cookies saved by an earlier run.
    pub fn restore_cookies(&self, cookies: &[String]) {
        let Some(url) = self.cookie_url() else {
            return;
        };
        for cookie in cookies {
            self.jar.add_cookie_str(cookie, &url);
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "Sending request");
        self.http.request(method, self.url(path))
    }

    /// Send and classify. `fallback` is the message used when the error body
    /// has nothing better.
    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> EventDevResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| EventDevError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body, fallback);
        tracing::debug!(status = status.as_u16(), %message, "Request failed");
        Err(EventDevError::Http {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> EventDevResult<T> {
        let response = self.send(self.request(Method::GET, path), fallback).await?;
        parse_json(response).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> EventDevResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(method, path).json(body), fallback)
            .await?;
        parse_json(response).await
    }

    /// DELETE whose body, if any, is ignored.
    pub(crate) async fn delete(&self, path: &str, fallback: &str) -> EventDevResult<()> {
        self.send(self.request(Method::DELETE, path), fallback)
            .await?;
        Ok(())
    }
}

pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> EventDevResult<T> {
    let text = response
        .text()
        .await
        .map_err(|e| EventDevError::Connection(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| EventDevError::Serialization(e.to_string()))
}

/// Pick the user-facing message out of an error body.
///
/// JSON `message` (string, or array joined with ", "), then the raw text,
/// then `fallback`.
pub fn extract_message(body: &str, fallback: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("message") {
            Some(Value::String(message)) if !message.trim().is_empty() => {
                return message.clone();
            }
            Some(Value::Array(messages)) if !messages.is_empty() => {
                return messages
                    .iter()
                    .map(|m| match m {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
            }
            _ => {}
        }
    }

    let text = body.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_string() {
        assert_eq!(
            extract_message(r#"{"message":"Slug already taken"}"#, "Failed"),
            "Slug already taken"
        );
    }

    #[test]
    fn test_extract_message_array() {
        assert_eq!(
            extract_message(
                r#"{"message":["email must be an email","password too short"],"statusCode":400}"#,
                "Failed"
            ),
            "email must be an email, password too short"
        );
    }

    #[test]
    fn test_extract_message_raw_text_and_fallback() {
        assert_eq!(extract_message("Bad Gateway", "Failed"), "Bad Gateway");
        assert_eq!(extract_message("   ", "Failed to create event"), "Failed to create event");
        assert_eq!(extract_message("", "Failed to delete event"), "Failed to delete event");
    }

    #[test]
    fn test_extract_message_json_without_message_uses_text() {
        assert_eq!(
            extract_message(r#"{"error":"boom"}"#, "Failed"),
            r#"{"error":"boom"}"#
        );
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(EventDevError::Config(_))
        ));
        let client = ApiClient::new("http://localhost:5122/api/v1/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5122/api/v1");
    }

    #[test]
    fn test_cookies_roundtrip_through_jar() {
        let client = ApiClient::new("http://localhost:5122/api/v1").unwrap();
        assert!(client.cookies().is_empty());

        client.restore_cookies(&["sAccessToken=abc".to_string(), "sFrontToken=def".to_string()]);
        let mut cookies = client.cookies();
        cookies.sort();
        assert_eq!(cookies, vec!["sAccessToken=abc", "sFrontToken=def"]);
    }
}
