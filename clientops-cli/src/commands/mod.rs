//! CLI command implementations

pub mod inspect;
pub mod login_check;
pub mod logs;
pub mod migrate;
pub mod report;
pub mod verify_password;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clientops_core::{ClientOpsContext, LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let ops_dir = get_ops_dir().ok()?;
    std::fs::create_dir_all(&ops_dir).ok()?;
    LoggingService::new(&ops_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the operator directory from CLIENTOPS_DIR or default to ~/.clientops
pub fn get_ops_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CLIENTOPS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".clientops"))
}

/// Load settings and build the operator context
pub fn get_context() -> Result<ClientOpsContext> {
    let ops_dir = get_ops_dir()?;

    std::fs::create_dir_all(&ops_dir)
        .with_context(|| format!("Failed to create clientops directory: {:?}", ops_dir))?;

    ClientOpsContext::new(&ops_dir).context("Failed to initialize clientops context")
}

/// Use the given password or prompt for one without echo
pub fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let p = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;
    Ok(p)
}
