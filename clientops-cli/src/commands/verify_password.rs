//! Verify-password command - check a user's stored hash and repair it

use anyhow::Result;
use clientops_core::services::VerifyOutcome;
use clientops_core::LogEvent;

use super::{get_context, get_logger, log_event, password_or_prompt};
use crate::output;

pub fn run(username: &str, password: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("verify-password"));

    let ctx = get_context()?;
    let password = password_or_prompt(password, &format!("Expected password for '{}'", username))?;

    let outcome = match ctx
        .credential_verifier
        .verify_and_repair_at(ctx.app_db(), username, &password)
    {
        Ok(outcome) => outcome,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("password_check_failed")
                    .with_command("verify-password")
                    .with_subject(username)
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    let status = match &outcome {
        VerifyOutcome::Verified => "verified",
        VerifyOutcome::Repaired { .. } => "repaired",
    };
    log_event(
        &logger,
        LogEvent::new(format!("password_{}", status))
            .with_command("verify-password")
            .with_subject(username)
            .succeeded(),
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "username": username,
                "status": status,
                "scheme": ctx.config.hashing.scheme.as_str(),
            }))?
        );
        return Ok(());
    }

    match outcome {
        VerifyOutcome::Verified => {
            output::success(&format!("Password for '{}' verifies", username));
        }
        VerifyOutcome::Repaired { .. } => {
            output::warning(&format!("Password for '{}' did not verify", username));
            output::success(&format!(
                "Stored hash replaced ({})",
                ctx.config.hashing.scheme.as_str()
            ));
        }
    }

    Ok(())
}
