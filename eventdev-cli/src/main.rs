mod commands;
mod render;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventdev_core::constants::HOME_EVENT_LIMIT;
use eventdev_core::error::EventDevError;
use eventdev_core::event::EventId;
use eventdev_core::view::ModalityFilter;
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, fmt};

use commands::Context;
use render::Render;

#[derive(Parser)]
#[command(name = "eventdev")]
#[command(about = "Browse and manage developer community events on EventDev")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upcoming events, soonest first
    Events {
        /// Only online and hybrid events
        #[arg(long)]
        online: bool,

        /// How many events to show
        #[arg(short = 'n', long, default_value_t = HOME_EVENT_LIMIT)]
        limit: usize,

        /// Show venue and link under each event
        #[arg(short, long)]
        detailed: bool,
    },
    /// Days with events in a month, or the events of one day
    Calendar {
        /// Month to show (YYYY-MM, default: current month)
        #[arg(long, conflicts_with = "day")]
        month: Option<String>,

        /// Single day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,

        /// all, online, presential or hybrid
        #[arg(short, long, default_value = "all")]
        modality: ModalityFilter,
    },
    /// List communities
    Communities {
        /// Include deactivated communities
        #[arg(long)]
        all: bool,
    },
    /// Show or manage a community
    Community {
        #[command(subcommand)]
        command: CommunityCommands,
    },
    /// Create, edit or delete events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Look up an address by CEP
    Cep { code: String },
    /// Sign in with e-mail and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Administrator tools
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum CommunityCommands {
    /// Profile and events (KEY: slug, id or part of the name)
    Show {
        key: String,

        /// all, online, presential or hybrid
        #[arg(short, long, default_value = "all")]
        modality: ModalityFilter,

        /// Show description and links instead of events
        #[arg(long)]
        about: bool,
    },
    /// Register your community (requires a community account)
    Register,
    /// Create a community account and its profile in one step
    Signup {
        #[arg(long)]
        email: Option<String>,
    },
    /// Edit a community profile
    Edit { key: String },
    /// Delete a community
    Delete {
        key: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum EventCommands {
    /// Create an event for a community
    Create { community: String },
    /// Edit an event
    Edit { id: EventId },
    /// Delete an event
    Delete {
        id: EventId,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create a user account
    CreateUser {
        #[arg(long)]
        email: String,

        /// admin or community
        #[arg(long, default_value = "community")]
        role: String,
    },
}

/// Logs go to stderr so command output stays clean. Filter with EVENTDEV_LOG.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("EVENTDEV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::load()?;

    match cli.command {
        Commands::Events {
            online,
            limit,
            detailed,
        } => commands::events::run(&ctx, online, limit, detailed).await,
        Commands::Calendar {
            month,
            day,
            modality,
        } => commands::calendar::run(&ctx, month, day, modality).await,
        Commands::Communities { all } => commands::communities::run(&ctx, all).await,
        Commands::Community { command } => match command {
            CommunityCommands::Show {
                key,
                modality,
                about,
            } => commands::community::show(&ctx, &key, modality, about).await,
            CommunityCommands::Register => commands::community::register(&ctx).await,
            CommunityCommands::Signup { email } => commands::community::signup(&ctx, email).await,
            CommunityCommands::Edit { key } => commands::community::edit(&ctx, &key).await,
            CommunityCommands::Delete { key, force } => {
                commands::community::delete(&ctx, &key, force).await
            }
        },
        Commands::Event { command } => match command {
            EventCommands::Create { community } => {
                commands::event::create(&ctx, &community).await
            }
            EventCommands::Edit { id } => commands::event::edit(&ctx, id).await,
            EventCommands::Delete { id, force } => commands::event::delete(&ctx, id, force).await,
        },
        Commands::Cep { code } => commands::cep::run(&ctx, &code).await,
        Commands::Login { email } => commands::auth::login(&mut ctx, email).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Admin { command } => match command {
            AdminCommands::CreateUser { email, role } => {
                commands::admin::create_user(&ctx, email, role).await
            }
        },
    }
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<EventDevError>() {
        Some(EventDevError::Validation(errors)) => {
            eprintln!("{}", "Please fix the following:".red());
            eprintln!("{}", errors.render());
        }
        Some(EventDevError::Unauthorized) => {
            eprintln!("{} {}", "Error:".red(), error);
            eprintln!("Sign in with: eventdev login");
        }
        Some(EventDevError::Connection(_)) => {
            eprintln!("{} {}", "Error:".red(), error);
            eprintln!("Is the EventDev backend running? Check api_url in your config or EVENTDEV_API_URL.");
        }
        _ => eprintln!("{} {:#}", "Error:".red(), error),
    }
}
