use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::{Render, pluralize};
use crate::utils::tui::create_spinner;

pub async fn run(ctx: &Context, include_inactive: bool) -> Result<()> {
    let spinner = create_spinner("Loading communities...");
    let result = ctx.api.communities().await;
    spinner.finish_and_clear();

    let mut communities: Vec<_> = result?
        .into_iter()
        .filter(|c| include_inactive || c.is_active)
        .collect();
    communities.sort_by_key(|c| c.name.to_lowercase());

    if communities.is_empty() {
        println!("{}", "No communities yet".dimmed());
        return Ok(());
    }

    for community in &communities {
        println!("  {}", community.render());
    }
    println!(
        "\n{}",
        format!(
            "{} {}",
            communities.len(),
            pluralize("community", communities.len())
        )
        .dimmed()
    );

    Ok(())
}
