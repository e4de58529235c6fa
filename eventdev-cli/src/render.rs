//! Colored terminal rendering for EventDev types.

use chrono::{DateTime, Local, NaiveDate, Utc};
use eventdev_core::aggregate::EnrichedEvent;
use eventdev_core::community::Community;
use eventdev_core::session::User;
use eventdev_core::validation::ValidationErrors;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EnrichedEvent {
    fn render(&self) -> String {
        let time = match self.event.start() {
            Some(start) => format_time(start),
            None => format!("{:>7}", "??:??"),
        };
        let community = self
            .community
            .as_ref()
            .map(|c| format!("[{}]", c.name))
            .unwrap_or_default();

        format!(
            "{} {} {} {}",
            time,
            self.event.title,
            render_modality(&self.modality_key),
            community.dimmed()
        )
    }
}

impl Render for Community {
    fn render(&self) -> String {
        let status = if self.is_active {
            String::new()
        } else {
            format!(" {}", "(inactive)".red())
        };
        format!(
            "{} {}{}",
            self.name.bold(),
            self.effective_slug().dimmed(),
            status
        )
    }
}

impl Render for User {
    fn render(&self) -> String {
        let roles = if self.roles.is_empty() {
            "no roles".to_string()
        } else {
            self.roles.join(", ")
        };
        format!("{} {}", self.email.bold(), format!("({roles})").dimmed())
    }
}

impl Render for ValidationErrors {
    fn render(&self) -> String {
        self.errors()
            .iter()
            .map(|e| format!("   {} {}: {}", "✗".red(), e.field.bold(), e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_modality(key: &str) -> String {
    match key {
        "online" => "online".cyan().to_string(),
        "presential" => "presential".magenta().to_string(),
        "hybrid" => "hybrid".yellow().to_string(),
        "" => String::new(),
        other => other.dimmed().to_string(),
    }
}

/// Venue and link lines printed under an event in detailed views.
pub fn render_event_details(event: &EnrichedEvent) -> Vec<String> {
    let mut lines = vec![format!("{} {}", "#".dimmed(), event.id().to_string().dimmed())];
    if let Some(end) = event.event.end() {
        lines.push(format!("{} {}", "until:".dimmed(), format_time(end).trim_start()));
    }
    lines.push(format!("{} {}", "where:".dimmed(), event.venue()));
    if let Some(link) = event.event.link.as_deref().filter(|l| !l.is_empty()) {
        lines.push(format!("{} {}", "link:".dimmed(), link.underline()));
    }
    lines
}

/// Print events grouped by local day, in the order given.
pub fn print_event_list(events: &[&EnrichedEvent], detailed: bool) {
    let mut current_date: Option<String> = None;

    for event in events {
        let date_label = event
            .event
            .start()
            .map(format_date_label)
            .unwrap_or_else(|| "No date".to_string());

        if current_date.as_ref() != Some(&date_label) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", date_label.bold());
            current_date = Some(date_label);
        }

        println!("  {}", event.render());
        if detailed {
            for line in render_event_details(event) {
                println!("          {}", line);
            }
        }
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(time: DateTime<Utc>) -> String {
    let date = time.with_timezone(&Local).date_naive();
    format_day(date)
}

pub fn format_day(date: NaiveDate) -> String {
    let today = Local::now().date_naive();
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Format the time portion of an event (e.g. "  19:00")
fn format_time(time: DateTime<Utc>) -> String {
    format!("{:>7}", time.with_timezone(&Local).format("%H:%M"))
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> &str {
    if count == 1 {
        return word;
    }
    match word {
        "event" => "events",
        "community" => "communities",
        _ => word,
    }
}
