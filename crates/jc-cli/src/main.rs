//! jcli-admin CLI
//!
//! Drives the Jasmin jCli console from the command line. Every gateway
//! command prints exactly one JSON object on stdout:
//! - `{"success": true, ...}` with the command's fields
//! - `{"success": false, "error": "..."}` on any failure
//!
//! Logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jc_core::config::{self, ConfigFile};
use jc_session::GatewayRequest;
use jcli_admin::commands::{self, ConsoleOverrides};
use jcli_admin::output::{print_reply, OutputFormat};

#[derive(Parser)]
#[command(name = "jcli-admin")]
#[command(author, version, about = "Administration client for the Jasmin SMS gateway jCli console")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "JCLI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Reply format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(flatten)]
    console: ConsoleOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
#[command(rename_all = "snake_case")]
enum Commands {
    /// Create a group
    CreateGroup {
        /// Group ID
        gid: String,
    },

    /// Create a user inside an existing group
    CreateUser {
        /// User ID
        uid: String,
        /// Group the user belongs to
        gid: String,
        /// Login name
        username: String,
        /// Login password
        password: String,
    },

    /// Create a customer: a group and a user derived from the username
    CreateCustomer {
        /// Customer username
        username: String,
        /// Password for the customer's user
        password: String,
    },

    /// Remove a user
    DeleteUser {
        /// User ID
        uid: String,
    },

    /// Remove a group
    DeleteGroup {
        /// Group ID
        gid: String,
    },

    /// Remove a customer's user and group
    DeleteCustomer {
        /// Customer username
        username: String,
    },

    /// List users with their quotas and permissions
    ListUsers,

    /// List groups
    ListGroups,

    /// Enable a user
    EnableUser {
        /// User ID
        uid: String,
    },

    /// Disable a user
    DisableUser {
        /// User ID
        uid: String,
    },

    /// Grant or revoke permissions, e.g. `http_send=1 priority=0`
    UpdatePermissions {
        /// User ID
        uid: String,
        /// Permission assignments
        #[arg(value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Set quota values, e.g. `balance=100 sms_count=500`
    UpdateBalance {
        /// User ID
        uid: String,
        /// Quota assignments
        #[arg(value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Show one user's console record
    ShowUser {
        /// User ID
        uid: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the configuration file
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return report_parse_error(e),
    };

    init_logging(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        print_reply(&error_reply("No command provided"), OutputFormat::Json);
        std::process::exit(1);
    };

    let request = match command {
        Commands::Config { action } => return run_config_action(action, cli.config.as_deref()),
        Commands::CreateGroup { gid } => GatewayRequest::CreateGroup { gid },
        Commands::CreateUser {
            uid,
            gid,
            username,
            password,
        } => GatewayRequest::CreateUser {
            uid,
            gid,
            username,
            password,
        },
        Commands::CreateCustomer { username, password } => {
            GatewayRequest::CreateCustomer { username, password }
        }
        Commands::DeleteUser { uid } => GatewayRequest::DeleteUser { uid },
        Commands::DeleteGroup { gid } => GatewayRequest::DeleteGroup { gid },
        Commands::DeleteCustomer { username } => GatewayRequest::DeleteCustomer { username },
        Commands::ListUsers => GatewayRequest::ListUsers,
        Commands::ListGroups => GatewayRequest::ListGroups,
        Commands::EnableUser { uid } => GatewayRequest::EnableUser { uid },
        Commands::DisableUser { uid } => GatewayRequest::DisableUser { uid },
        Commands::UpdatePermissions { uid, assignments } => GatewayRequest::UpdatePermissions {
            uid,
            permissions: commands::parse_assignments(&assignments),
        },
        Commands::UpdateBalance { uid, assignments } => GatewayRequest::UpdateBalance {
            uid,
            balance: commands::parse_assignments(&assignments),
        },
        Commands::ShowUser { uid } => GatewayRequest::ShowUser { uid },
    };

    let reply = match load_config(cli.config.as_deref(), &cli.console) {
        Ok(config) => commands::run_request(&config, request).await,
        Err(e) => error_reply(&format!("{:#}", e)),
    };
    print_reply(&reply, cli.format);

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Help and version print normally; every other parse error becomes a JSON
/// reply so callers always get one object back
fn report_parse_error(e: clap::Error) -> Result<()> {
    let message = match e.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
        ErrorKind::InvalidSubcommand => "Unknown command".to_string(),
        _ => first_line(&e.to_string()),
    };

    print_reply(&error_reply(&message), OutputFormat::Json);
    Ok(())
}

fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

fn error_reply(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

fn load_config(path: Option<&Path>, overrides: &ConsoleOverrides) -> Result<ConfigFile> {
    let mut config = config::load_or_default(path).context("Failed to load configuration")?;
    overrides.apply(&mut config.console);
    tracing::debug!(console = ?config.console, "Configuration loaded");
    Ok(config)
}

fn run_config_action(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => commands::config_show(path),
        ConfigAction::Path => {
            commands::config_path(path);
            Ok(())
        }
        ConfigAction::Init { force } => commands::config_init(path, force),
    }
}
