use anyhow::Result;
use eventdev_core::api::NewUser;
use eventdev_core::constants::ROLE_ADMIN;
use eventdev_core::error::EventDevError;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::utils::prompt::prompt_password;
use crate::utils::tui::create_spinner;

pub async fn create_user(ctx: &Context, email: String, role: String) -> Result<()> {
    let session = ctx.session().await?;
    session.require_role(ROLE_ADMIN)?;

    let user = NewUser {
        email,
        password: prompt_password("Password for the new account")?,
        role,
    };
    user.validate().map_err(EventDevError::from)?;

    let spinner = create_spinner("Creating user...");
    let result = session.create_user(&user).await;
    spinner.finish_and_clear();
    result?;

    println!(
        "{} {} {}",
        "Created".green(),
        user.email.bold(),
        format!("({})", user.role).dimmed()
    );
    Ok(())
}
