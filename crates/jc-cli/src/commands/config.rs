//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use jc_core::config;

/// The config file in use: `--config` when given, otherwise the default path
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Print the config file path
pub fn config_path(config_path: Option<&Path>) {
    println!("{}", resolve_config_path(config_path).display());
}

/// Show current configuration
pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Built-in defaults are in effect; run 'jcli-admin config init' to create one");
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    println!("{}", content);

    Ok(())
}

/// Write a commented default configuration
pub fn config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path);

    if let Some(config_dir) = config_file.parent() {
        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            std::fs::create_dir_all(config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            print_success(&format!("Created config directory: {:?}", config_dir));
        }
    }

    if config_file.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", config_file));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    std::fs::write(&config_file, generate_default_config())
        .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

    print_success(&format!("Created configuration file: {:?}", config_file));
    Ok(())
}

/// Generate default configuration content
fn generate_default_config() -> String {
    r#"# jcli-admin configuration

[console]
# jCli telnet endpoint
host = "localhost"
port = 8990

# Console credentials
username = "jcliadmin"
password = "jclipwd"

# Seconds to wait for any prompt
timeout_secs = 10

# Extra connection attempts after the first failure
connect_retries = 0

# Reject responses that match no known success or error phrasing
strict_responses = true

[console.backoff]
# Initial retry delay in seconds
initial = 1
# Maximum retry delay in seconds
max = 30
# Backoff multiplier
multiplier = 2.0
# Jitter factor
jitter = 0.25

[customer]
# Suffixes appended to a customer's username
group_suffix = "_group"
user_suffix = "_user"

# Milliseconds to wait between creating the group and the user
settle_delay_ms = 1000

[worker]
# Requests that may wait for the console
queue_capacity = 32
"#
    .to_string()
}
