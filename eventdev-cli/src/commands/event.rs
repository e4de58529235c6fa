use anyhow::Result;
use chrono::Local;
use dialoguer::Select;
use eventdev_core::cep::{CepLookup, ViaCep};
use eventdev_core::constants::ROLE_COMMUNITY;
use eventdev_core::error::EventDevError;
use eventdev_core::event::{EventForm, EventId, Modality};
use eventdev_core::screen::CommunityScreen;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{Render, render_event_details};
use crate::utils::prompt::{confirm, prompt_optional, prompt_text};
use crate::utils::tui::create_spinner;

const MODALITIES: [Modality; 3] = [Modality::Online, Modality::Presential, Modality::Hybrid];

async fn load_screen(ctx: &Context, key: &str) -> Result<CommunityScreen> {
    let mut screen = CommunityScreen::new(ctx.api.clone(), key);

    let spinner = create_spinner("Loading...");
    let result = screen.load().await;
    spinner.finish_and_clear();
    result?;

    Ok(screen)
}

/// The page of the community that owns event `id`.
async fn screen_for_event(ctx: &Context, id: EventId) -> Result<CommunityScreen> {
    let spinner = create_spinner("Looking up event...");
    let result = ctx.api.event_collection().await;
    spinner.finish_and_clear();
    let events = result?;

    let Some(event) = events.get(id) else {
        anyhow::bail!("Event {} not found", id);
    };
    let Some(community) = event.community.clone() else {
        anyhow::bail!("Event {} does not belong to a known community", id);
    };

    Ok(CommunityScreen::from_loaded(ctx.api.clone(), community, events))
}

async fn fill_address(ctx: &Context, form: &mut EventForm) -> Result<()> {
    let cep = prompt_text("CEP", form.cep.as_deref())?;
    form.cep = Some(cep.clone());

    let viacep = ViaCep::from_config(&ctx.config);
    let spinner = create_spinner("Looking up CEP...");
    let result = viacep.lookup(&cep).await;
    spinner.finish_and_clear();

    match result {
        Ok(lookup) => form.apply_lookup(&lookup),
        Err(e) => {
            println!("   {} {}", "!".yellow(), e);
            form.clear_lookup();
        }
    }

    form.street = Some(prompt_text("Street", form.street.as_deref())?);
    form.number = Some(prompt_text("Number", form.number.as_deref())?);
    form.neighborhood = Some(prompt_text("Neighborhood", form.neighborhood.as_deref())?);
    form.city = Some(prompt_text("City", form.city.as_deref())?);
    form.state = Some(prompt_text("State", form.state.as_deref())?);
    Ok(())
}

async fn prompt_form(ctx: &Context, mut form: EventForm) -> Result<EventForm> {
    form.title = prompt_text("Title", Some(&form.title))?;
    form.description = prompt_text("Description", Some(&form.description))?;
    form.date = prompt_text("Date (YYYY-MM-DD)", Some(&form.date))?;
    form.start_time = prompt_text("Starts (HH:MM)", Some(&form.start_time))?;
    form.end_time = prompt_text("Ends (HH:MM)", Some(&form.end_time))?;

    let labels: Vec<String> = MODALITIES.iter().map(|m| m.key().to_string()).collect();
    let current = form
        .modality
        .as_ref()
        .and_then(|m| MODALITIES.iter().position(|c| c == m))
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("  Modality")
        .items(&labels)
        .default(current)
        .interact()?;
    let modality = MODALITIES[choice].clone();

    if modality.needs_address() {
        fill_address(ctx, &mut form).await?;
    }
    form.modality = Some(modality);
    form.link = prompt_optional("Link", form.link.as_deref())?;

    form.validate(Local::now().date_naive())
        .map_err(EventDevError::from)?;
    Ok(form)
}

pub async fn create(ctx: &Context, community_key: &str) -> Result<()> {
    ctx.session().await?.require_role(ROLE_COMMUNITY)?;

    let mut screen = load_screen(ctx, community_key).await?;
    if let Some(community) = screen.community() {
        println!("New event for {}", community.name.bold());
    }
    let form = prompt_form(ctx, EventForm::default()).await?;

    let spinner = create_spinner("Creating event...");
    let result = screen.create_event(&form, Local::now().date_naive()).await;
    spinner.finish_and_clear();
    let created = result?;

    println!("{} {}", "Created".green(), created.render());
    for line in render_event_details(created) {
        println!("          {}", line);
    }
    Ok(())
}

pub async fn edit(ctx: &Context, id: EventId) -> Result<()> {
    ctx.session().await?.require_role(ROLE_COMMUNITY)?;

    let mut screen = screen_for_event(ctx, id).await?;
    let Some(current) = screen.event(id) else {
        anyhow::bail!("Event {} not found", id);
    };
    let initial = EventForm::from_event(&current.event, current.address.as_ref());
    let form = prompt_form(ctx, initial).await?;

    let spinner = create_spinner("Saving...");
    let result = screen.update_event(id, &form, Local::now().date_naive()).await;
    spinner.finish_and_clear();

    println!("{} {}", "Updated".green(), result?.render());
    Ok(())
}

pub async fn delete(ctx: &Context, id: EventId, force: bool) -> Result<()> {
    let mut screen = screen_for_event(ctx, id).await?;
    let Some(current) = screen.event(id) else {
        anyhow::bail!("Event {} not found", id);
    };
    let title = current.event.title.clone();

    if !force && !confirm(&format!("Delete '{}'?", title))? {
        return Ok(());
    }

    let spinner = create_spinner("Deleting...");
    let result = screen.delete_event(id).await;
    spinner.finish_and_clear();
    result?;

    println!("{} {}", "Deleted".red(), title);
    Ok(())
}
