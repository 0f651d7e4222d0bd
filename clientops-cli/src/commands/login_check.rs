//! Login-check command - one request against the running application

use std::process::ExitCode;

use anyhow::Result;
use clientops_core::LogEvent;

use super::{get_context, get_logger, log_event, password_or_prompt};
use crate::output;

pub fn run(
    url: Option<&str>,
    username: &str,
    password: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("login-check"));

    let ctx = get_context()?;
    let check = ctx.login_check(url)?;
    let password = password_or_prompt(password, &format!("Password for '{}'", username))?;

    let result = match check.run(username, &password) {
        Ok(result) => result,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("login_check_failed")
                    .with_command("login-check")
                    .with_subject(username)
                    .with_error(e.to_string()),
            );
            return Err(e.into());
        }
    };

    let event = LogEvent::new("login_check_completed")
        .with_command("login-check")
        .with_subject(username);
    log_event(
        &logger,
        if result.is_success() {
            event.succeeded()
        } else {
            event.with_error(format!("HTTP {}", result.status))
        },
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let line = format!("{} -> HTTP {}", check.url(), result.status);
        if result.is_success() {
            output::success(&line);
        } else {
            output::warning(&line);
        }
        println!("{}", serde_json::to_string_pretty(&result.body)?);
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
