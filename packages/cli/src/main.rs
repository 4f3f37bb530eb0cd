#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the panic-report toolchain.
//!
//! ```text
//! panic_report submit [--type fisica] [--description "..."] [--urgency alta]
//! panic_report panic [--window-secs 30]
//! panic_report list
//! panic_report dashboard [--level critica]
//! panic_report cache
//! ```
//!
//! Running with no subcommand starts the disguised calculator prompt; see
//! [`interactive`].
//!
//! Uses `indicatif-log-bridge` (via [`panic_report_cli_utils::init_logger`])
//! so log lines and the recording countdown never fight for the terminal.

mod app;
mod commands;
mod interactive;
mod prompts;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use panic_report_admin::Level;
use panic_report_config::Config;

use crate::app::App;

#[derive(Parser)]
#[command(name = "panic_report", about = "Submit and review panic reports")]
struct Cli {
    /// TOML file overriding the built-in configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Grant every device permission and the storage directory without asking
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a report; missing fields are asked for
    Submit {
        /// Abuse type (fisica, assedio-moral, assedio-sexual, negligencia, outro)
        #[arg(long = "type")]
        report_type: Option<String>,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Urgency (baixa, media, alta, critica)
        #[arg(long)]
        urgency: Option<String>,
    },
    /// Record audio for the panic window and send an alert (Ctrl-C cancels)
    Panic {
        /// Override the recording window length
        #[arg(long)]
        window_secs: Option<u64>,
    },
    /// List reports held by the configured store
    List,
    /// Show the admin dashboard from the remote API
    Dashboard {
        /// Only show this urgency (critica, alta, media, baixa); all by default
        #[arg(long)]
        level: Option<String>,
    },
    /// Show the on-device report snapshot
    Cache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = panic_report_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let mut app = App::build(config, cli.yes)?;

    let Some(command) = cli.command else {
        return interactive::run(&mut app, &multi).await;
    };

    match command {
        Commands::Submit {
            report_type,
            description,
            urgency,
        } => {
            let form = interactive::prompt_form(report_type, description, urgency)?;
            commands::submit(&mut app, &form).await?;
        }
        Commands::Panic { window_secs } => commands::panic(&mut app, &multi, window_secs).await?,
        Commands::List => commands::list(&mut app).await,
        Commands::Dashboard { level } => {
            let level = match level.as_deref() {
                None | Some("all" | "todos") => Level::All,
                Some(name) => Level::from_urgency_name(name)?,
            };
            commands::dashboard(&app, level).await?;
        }
        Commands::Cache => commands::cache(&app).await?,
    }

    Ok(())
}
