//! Profiles - member directory command-line tool
//!
//! Looks up members, rosters and roles in the house directory and applies
//! the same writes the profiles web application performs.

mod commands;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use commands::CommandContext;
use profiles_core::config::LoggingConfig;
use profiles_core::ProfilesConfig;
use profiles_directory::{Directory, LdapDirectory, Roster};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "profiles")]
#[command(author = "Profiles Team")]
#[command(version = profiles_core::VERSION)]
#[command(about = "Member directory lookups and updates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PROFILES_CONFIG")]
    config: Option<String>,

    /// Directory server URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a member
    Member { uid: String },

    /// Free-text member search
    Search { query: String },

    /// List a member's groups
    Groups { uid: String },

    /// List a roster (active, intro, onfloor, current, all, eboard)
    Roster { roster: Roster },

    /// List every eboard seat holder
    Eboard,

    /// Show a group's description
    Describe { group: String },

    /// Show a member's statuses and directorships
    Roles { uid: String },

    /// Print a member's fallback avatar URL
    Gravatar { uid: String },

    /// Fetch a member's profile photo
    Photo {
        uid: String,

        /// Write the photo to this file
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },

    /// Add a member to the active group
    SetActive { uid: String },

    /// Remove a member from the active group
    SetInactive { uid: String },

    /// Add a member to the current students group
    SetCurrentStudent { uid: String },

    /// Remove a member from the current students group
    SetNonCurrentStudent { uid: String },

    /// Set a member's room number; an empty value clears it
    SetRoom { uid: String, room: String },

    /// Set a member's housing points
    SetHousingPoints {
        uid: String,
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },

    /// Update profile fields from key=value pairs
    UpdateProfile {
        uid: String,

        /// Form fields, e.g. name="Jane Doe" shell=/bin/zsh
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load config
    let mut config = if let Some(config_path) = &cli.config {
        ProfilesConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path))?
    } else {
        ProfilesConfig::from_env()
    };

    // Override with CLI args
    if let Some(server_url) = cli.server_url {
        config.ldap.server_url = server_url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);
    config.validate()?;

    // No connection is opened until a command queries the directory
    let client = Arc::new(LdapDirectory::new(config.ldap.clone())?);
    debug!("Using directory at {}", config.ldap.server_url);

    let ctx = CommandContext {
        directory: Directory::from_config(client, &config),
        output_format: cli.output,
    };

    let result = match cli.command {
        Commands::Member { uid } => commands::member::show(&ctx, &uid).await,
        Commands::Search { query } => commands::member::search(&ctx, &query).await,
        Commands::Groups { uid } => commands::member::groups(&ctx, &uid).await,
        Commands::Roster { roster } => commands::roster::execute(&ctx, roster).await,
        Commands::Eboard => commands::roster::execute(&ctx, Roster::Eboard).await,
        Commands::Describe { group } => commands::member::describe(&ctx, &group).await,
        Commands::Roles { uid } => commands::member::roles(&ctx, &uid).await,
        Commands::Gravatar { uid } => commands::avatar::gravatar(&ctx, &uid),
        Commands::Photo { uid, file } => commands::avatar::photo(&ctx, &uid, file.as_deref()).await,
        Commands::SetActive { uid } => {
            commands::update::set_status(&ctx, &uid, commands::update::Status::Active).await
        }
        Commands::SetInactive { uid } => {
            commands::update::set_status(&ctx, &uid, commands::update::Status::Inactive).await
        }
        Commands::SetCurrentStudent { uid } => {
            commands::update::set_status(&ctx, &uid, commands::update::Status::CurrentStudent).await
        }
        Commands::SetNonCurrentStudent { uid } => {
            commands::update::set_status(&ctx, &uid, commands::update::Status::NonCurrentStudent)
                .await
        }
        Commands::SetRoom { uid, room } => commands::update::set_room(&ctx, &uid, &room).await,
        Commands::SetHousingPoints { uid, points } => {
            commands::update::set_housing_points(&ctx, &uid, points).await
        }
        Commands::UpdateProfile { uid, fields } => {
            commands::update::update_profile(&ctx, &uid, &fields).await
        }
        Commands::CheckConfig => commands::config::execute(&config, cli.output),
    };

    if let Err(e) = &result {
        if ctx.is_json() {
            if let Some(err) = e.downcast_ref::<profiles_core::Error>() {
                output::print_json(&serde_json::json!({
                    "error": err.code(),
                    "message": err.to_string(),
                }))?;
            }
        }
    }

    result
}

/// Logs go to stderr so JSON output on stdout stays parseable
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
