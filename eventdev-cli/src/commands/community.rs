use anyhow::Result;
use eventdev_core::community::{Community, CommunityForm, Logo};
use eventdev_core::constants::ROLE_COMMUNITY;
use eventdev_core::error::EventDevError;
use eventdev_core::screen::CommunityScreen;
use eventdev_core::view::ModalityFilter;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{Render, print_event_list};
use crate::utils::prompt::{confirm, prompt_optional, prompt_password, prompt_text};
use crate::utils::tui::create_spinner;

async fn load_screen(ctx: &Context, key: &str) -> Result<CommunityScreen> {
    let mut screen = CommunityScreen::new(ctx.api.clone(), key);

    let spinner = create_spinner(format!("Loading {}...", key));
    let result = screen.load().await;
    spinner.finish_and_clear();
    result?;

    Ok(screen)
}

fn print_about(community: &Community) {
    if let Some(description) = community.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    for (label, value) in community.links() {
        println!("  {} {}", format!("{label}:").dimmed(), value);
    }
    if let Some(logo) = community.logo_url.as_deref() {
        println!("  {} {}", "logo:".dimmed(), logo);
    }
}

pub async fn show(ctx: &Context, key: &str, filter: ModalityFilter, about: bool) -> Result<()> {
    let screen = load_screen(ctx, key).await?;
    let Some(community) = screen.community() else {
        anyhow::bail!("Community '{}' not found", key);
    };

    println!("{}", community.render());
    println!();

    if about {
        print_about(community);
        return Ok(());
    }

    let events = screen.events(filter);
    if events.is_empty() {
        let label = match filter {
            ModalityFilter::All => "No events yet".to_string(),
            other => format!("No {} events", other),
        };
        println!("{}", label.dimmed());
        return Ok(());
    }

    print_event_list(&events, true);
    Ok(())
}

fn prompt_form(initial: Option<&Community>) -> Result<CommunityForm> {
    let form = CommunityForm {
        name: prompt_text("Name", initial.map(|c| c.name.as_str()))?,
        description: prompt_optional("Description", initial.and_then(|c| c.description.as_deref()))?,
        phone: prompt_optional("Phone", initial.and_then(|c| c.phone_number.as_deref()))?,
        website: prompt_optional("Website", initial.and_then(|c| c.link_website.as_deref()))?,
        instagram: prompt_optional("Instagram", initial.and_then(|c| c.link_instagram.as_deref()))?,
        linkedin: prompt_optional("LinkedIn", initial.and_then(|c| c.link_linkedin.as_deref()))?,
        github: prompt_optional("GitHub", initial.and_then(|c| c.link_github.as_deref()))?,
        logo: Logo::from_input(
            prompt_optional("Logo URL", initial.and_then(|c| c.logo_url.as_deref()))?.as_deref(),
        ),
    };

    form.validate().map_err(EventDevError::from)?;
    Ok(form)
}

/// Register a community for the signed-in community account.
pub async fn register(ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    session.require_role(ROLE_COMMUNITY)?;

    if let Some(existing) = ctx.api.my_community().await? {
        anyhow::bail!(
            "You already manage '{}'. Edit it with:\n  eventdev community edit {}",
            existing.name,
            existing.effective_slug()
        );
    }

    let form = prompt_form(None)?;

    let spinner = create_spinner("Creating community...");
    let result = ctx.api.create_community(&form.create_payload()).await;
    spinner.finish_and_clear();
    let created = result?;

    println!("{} {}", "Created".green(), created.render());
    Ok(())
}

/// Create an account and its community in one step.
pub async fn signup(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_text("E-mail", None)?,
    };
    let password = prompt_password("Password")?;
    if password != prompt_password("Repeat password")? {
        anyhow::bail!("Passwords do not match");
    }
    let form = prompt_form(None)?;

    let spinner = create_spinner("Registering...");
    let result = ctx.api.sign_up_community(&email, &password, &form).await;
    spinner.finish_and_clear();
    result?;

    println!(
        "{} Sign in with {}",
        "Registered.".green(),
        format!("eventdev login --email {email}").bold()
    );
    Ok(())
}

pub async fn edit(ctx: &Context, key: &str) -> Result<()> {
    let session = ctx.session().await?;
    session.require_role(ROLE_COMMUNITY)?;

    let mut screen = load_screen(ctx, key).await?;
    let form = prompt_form(screen.community())?;

    let spinner = create_spinner("Saving...");
    let result = screen.update_community(&form).await;
    spinner.finish_and_clear();

    println!("{} {}", "Updated".green(), result?.render());
    Ok(())
}

pub async fn delete(ctx: &Context, key: &str, force: bool) -> Result<()> {
    let mut screen = load_screen(ctx, key).await?;
    let Some(community) = screen.community() else {
        anyhow::bail!("Community '{}' not found", key);
    };
    let name = community.name.clone();
    let owned = screen.events(ModalityFilter::All).len();

    if !force {
        let question = if owned > 0 {
            format!("Delete '{}' and its {} events?", name, owned)
        } else {
            format!("Delete '{}'?", name)
        };
        if !confirm(&question)? {
            return Ok(());
        }
    }

    let spinner = create_spinner("Deleting...");
    let result = screen.delete_community().await;
    spinner.finish_and_clear();
    result?;

    println!("{} {}", "Deleted".red(), name);
    Ok(())
}
