use anyhow::{Context as _, Result};
use chrono::{Datelike, Local, NaiveDate};
use eventdev_core::view::{ModalityFilter, days_with_events, events_on};
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{Render, format_day, print_event_list};
use crate::utils::tui::create_spinner;

/// Parse "YYYY-MM" into (year, month).
fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}'. Expected YYYY-MM", raw))?;
    Ok((date.year(), date.month()))
}

pub async fn run(
    ctx: &Context,
    month: Option<String>,
    day: Option<String>,
    filter: ModalityFilter,
) -> Result<()> {
    let spinner = create_spinner("Loading events...");
    let result = ctx.api.enriched_events().await;
    spinner.finish_and_clear();
    let (events, _) = result?;

    if let Some(day) = day {
        let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid day '{}'. Expected YYYY-MM-DD", day))?;
        let selected = events_on(&events, date, filter);

        if selected.is_empty() {
            println!("{}", format!("No events on {}", format_day(date)).dimmed());
        } else {
            print_event_list(&selected, true);
        }
        return Ok(());
    }

    let (year, month) = match month {
        Some(raw) => parse_month(&raw)?,
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };

    let days = days_with_events(&events, year, month, filter);
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        anyhow::bail!("Invalid month {year}-{month:02}");
    };
    println!("{}", first.format("%B %Y").to_string().bold());

    if days.is_empty() {
        println!("{}", "No events this month".dimmed());
        return Ok(());
    }

    for day in days {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let on_day = events_on(&events, date, filter);
        println!();
        println!("{}", format_day(date).bold());
        for event in on_day {
            println!("  {}", event.render());
        }
    }

    Ok(())
}
