use anyhow::Result;
use chrono::Utc;
use eventdev_core::screen::HomeScreen;
use eventdev_core::view::UpcomingFilter;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{print_event_list, pluralize};
use crate::utils::tui::create_spinner;

pub async fn run(ctx: &Context, online: bool, limit: usize, detailed: bool) -> Result<()> {
    let mut home = HomeScreen::new(ctx.api.clone());

    let spinner = create_spinner("Loading events...");
    let result = home.load().await;
    spinner.finish_and_clear();
    result?;

    let filter = if online {
        UpcomingFilter::Online
    } else {
        UpcomingFilter::All
    };
    let events = home.upcoming(Utc::now(), filter, limit);

    if events.is_empty() {
        let label = if online { "No upcoming online events" } else { "No upcoming events" };
        println!("{}", label.dimmed());
        return Ok(());
    }

    print_event_list(&events, detailed);

    let total = home.upcoming(Utc::now(), filter, usize::MAX).len();
    if total > events.len() {
        println!(
            "\n{}",
            format!(
                "Showing {} of {} upcoming {} (use --limit to see more)",
                events.len(),
                total,
                pluralize("event", total)
            )
            .dimmed()
        );
    }

    Ok(())
}
