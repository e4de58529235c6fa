use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};

/// Prompt for a value, pre-filled with `initial` when editing.
pub fn prompt_text(label: &str, initial: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(format!("  {label}"))
        .allow_empty(true);
    if let Some(initial) = initial.filter(|s| !s.is_empty()) {
        input = input.with_initial_text(initial);
    }
    Ok(input.interact_text()?.trim().to_string())
}

/// Same as [`prompt_text`] but an empty answer is `None`.
pub fn prompt_optional(label: &str, initial: Option<&str>) -> Result<Option<String>> {
    let value = prompt_text(&format!("{label} (skip)"), initial)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Prompt the user for password input (hidden).
pub fn prompt_password(label: &str) -> Result<String> {
    let prompt = format!("  {}: ", label);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}

pub fn confirm(question: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()?)
}
