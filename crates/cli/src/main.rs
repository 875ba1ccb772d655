//! `reviewdesk` -- operator command line for the registration review desk.
//!
//! Logs in against the backend gateway, lists and inspects pending site
//! reviews, records approve/reject decisions, and runs an interactive
//! `triage` loop that advances through the queue as decisions are made.
//!
//! # Environment variables
//!
//! | Variable                          | Default                          | Description                 |
//! |-----------------------------------|----------------------------------|-----------------------------|
//! | `REVIEWDESK_API_URL`              | `http://localhost:3000`          | Gateway base URL            |
//! | `REVIEWDESK_SESSION_FILE`         | `$HOME/.reviewdesk/session.json` | Stored token and profile    |
//! | `REVIEWDESK_REQUEST_TIMEOUT_SECS` | `30`                             | Per-request HTTP timeout    |
//! | `REVIEWDESK_PASSWORD`             | --                               | Password for `login`        |
//! | `RUST_LOG`                        | `reviewdesk=info`                | Log filter                  |

mod commands;
mod config;
mod render;
mod triage;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reviewdesk_core::approval::Outcome;
use reviewdesk_core::time_range::TimeRange;
use reviewdesk_core::types::AreaId;
use reviewdesk_gateway::{FileSessionStore, GatewayClient, SessionStore};

use commands::QueueArgs;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "reviewdesk")]
#[command(about = "Review and decide pending site registrations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        username: String,

        #[arg(long, env = "REVIEWDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the session (the local session is cleared even if the call fails)
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// List pending reviews
    Queue(QueueArgs),

    /// Show a review's details
    Show { id: String },

    /// Approve a review
    Approve {
        id: String,

        /// Approval note (defaults to the standard note)
        #[arg(long)]
        note: Option<String>,
    },

    /// Reject a review
    Reject {
        id: String,

        /// Free-text reason
        #[arg(long, required_unless_present = "preset", conflicts_with = "preset")]
        reason: Option<String>,

        /// Preset reason number (see `reviewdesk reasons`)
        #[arg(long)]
        preset: Option<usize>,
    },

    /// List preset rejection reasons
    Reasons,

    /// List areas
    Areas,

    /// List the blocks of an area
    Blocks { area_id: AreaId },

    /// Show dashboard totals for a time range
    Overview {
        #[arg(long, default_value_t)]
        range: TimeRange,
    },

    /// Work through the queue interactively
    Triage {
        /// Only reviews submitted in this range
        #[arg(long)]
        range: Option<TimeRange>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::from_env().context("Invalid configuration")?;
    tracing::debug!(
        api_url = %config.gateway.base_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file));
    let client =
        GatewayClient::new(&config.gateway, session).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Login { username, password } => {
            commands::login(&client, &username, &password).await
        }
        Command::Logout => {
            commands::logout(&client).await;
            Ok(())
        }
        Command::Whoami => {
            commands::whoami(&client);
            Ok(())
        }
        Command::Queue(args) => commands::queue(&client, &args).await,
        Command::Show { id } => commands::show(&client, &id).await,
        Command::Approve { id, note } => {
            commands::decide(&client, &id, Outcome::Approve, note.as_deref()).await
        }
        Command::Reject { id, reason, preset } => {
            let reason = commands::rejection_reason(reason.as_deref(), preset)?;
            commands::decide(&client, &id, Outcome::Reject, Some(&reason)).await
        }
        Command::Reasons => {
            commands::reasons();
            Ok(())
        }
        Command::Areas => commands::areas(&client).await,
        Command::Blocks { area_id } => commands::blocks(&client, area_id).await,
        Command::Overview { range } => commands::overview(&client, &range).await,
        Command::Triage { range } => triage::run(client, range).await,
    }
}
