//! Schema-level checks applied to form input before anything is sent.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Same pattern the registration and edit forms use for social links.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("link pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for a given field, if it was rejected.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Empty is fine; anything else must look like an http(s) link.
pub(crate) fn check_link(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    let present = value.map(str::trim).filter(|v| !v.is_empty());
    if present.is_some_and(|v| !LINK_RE.is_match(v)) {
        errors.add(field, "Invalid URL. Use the format https://example.com");
    }
}

/// Empty is fine; anything else must parse as an absolute URL.
pub(crate) fn check_url(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    let present = value.map(str::trim).filter(|v| !v.is_empty());
    if present.is_some_and(|v| url::Url::parse(v).is_err()) {
        errors.add(field, "Must be a valid URL");
    }
}

pub(crate) fn check_required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    message: &str,
) {
    if is_blank(value) {
        errors.add(field, message);
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}
