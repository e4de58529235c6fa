use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::ApiClient;
use crate::community::{Community, CommunityForm};
use crate::constants::{ROLE_ADMIN, ROLE_COMMUNITY};
use crate::error::EventDevResult;
use crate::validation::{ValidationErrors, check_required, is_email};

/// Account an administrator creates from the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_required(&mut errors, "email", Some(self.email.as_str()), "E-mail is required");
        if !self.email.trim().is_empty() && !is_email(&self.email) {
            errors.add("email", "Invalid e-mail");
        }
        check_required(
            &mut errors,
            "password",
            Some(self.password.as_str()),
            "Password is required",
        );
        if self.role != ROLE_ADMIN && self.role != ROLE_COMMUNITY {
            errors.add("role", format!("Role must be '{ROLE_ADMIN}' or '{ROLE_COMMUNITY}'"));
        }

        errors.into_result()
    }
}

/// Whatever the sign-up endpoint echoes back. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpOutcome {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub community: Option<Community>,
}

impl ApiClient {
    /// POST /auth/signup/community
    ///
    /// Registers a community account in one step. The body is the sanitized
    /// community payload plus credentials, `role: community` and
    /// `is_active: true`.
    pub async fn sign_up_community(
        &self,
        email: &str,
        password: &str,
        form: &CommunityForm,
    ) -> EventDevResult<SignUpOutcome> {
        form.validate()?;

        let mut body = form.create_payload().to_body()?;
        body.insert("email".into(), json!(email.trim()));
        body.insert("password".into(), json!(password));
        body.insert("role".into(), json!(ROLE_COMMUNITY));
        body.insert("is_active".into(), Value::Bool(true));

        self.send_json(
            Method::POST,
            "/auth/signup/community",
            &body,
            "Failed to register community",
        )
        .await
    }

    /// POST /auth/admin/create-user
    pub async fn create_user(&self, user: &NewUser) -> EventDevResult<()> {
        user.validate()?;

        let body = NewUser {
            email: user.email.trim().to_string(),
            ..user.clone()
        };
        self.send(
            self.request(Method::POST, "/auth/admin/create-user").json(&body),
            "Failed to create user",
        )
        .await?;
        Ok(())
    }
}
