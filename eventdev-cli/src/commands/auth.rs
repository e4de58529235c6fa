use anyhow::Result;
use eventdev_core::session::{Session, SessionState};
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::Render;
use crate::utils::prompt::{prompt_password, prompt_text};
use crate::utils::tui::create_spinner;

pub async fn login(ctx: &mut Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_text("E-mail", ctx.config.email.as_deref())?,
    };
    let password = prompt_password("Password")?;

    let mut session = Session::new(ctx.api.clone());
    let spinner = create_spinner("Signing in...");
    let result = session.sign_in(&email, &password).await.cloned();
    spinner.finish_and_clear();
    let user = result?;

    ctx.save_session()?;
    if ctx.config.email.as_deref() != Some(email.trim()) {
        ctx.config.email = Some(email.trim().to_string());
        if let Err(e) = ctx.config.save() {
            tracing::warn!(error = %e, "Could not remember e-mail");
        }
    }

    println!("{} {}", "Signed in as".green(), user.render());
    if user.is_admin() {
        println!(
            "{}",
            "Create accounts with: eventdev admin create-user --email <email> --role <role>"
                .dimmed()
        );
    } else if ctx.api.my_community().await?.is_none() && user.has_role("community") {
        println!(
            "{}",
            "Register your community with: eventdev community register".dimmed()
        );
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let mut session = Session::new(ctx.api.clone());
    session.sign_out().await;
    ctx.forget_session()?;

    println!("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;

    match session.state() {
        SessionState::Authenticated(user) => {
            println!("{}", user.render());
            if let Some(community) = ctx.api.my_community().await? {
                println!("  {} {}", "community:".dimmed(), community.render());
            }
        }
        _ => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}
