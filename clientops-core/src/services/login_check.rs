//! Login smoke test - one POST against the application's login endpoint

use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use url::Url;

use crate::domain::result::{Error, Result};

pub const DEFAULT_LOGIN_URL: &str = "http://localhost:5000/login";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Status code and body returned by the endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginCheckResult {
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string
    pub body: serde_json::Value,
}

impl LoginCheckResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking client for the login endpoint
pub struct LoginCheck {
    client: reqwest::blocking::Client,
    url: Url,
}

impl LoginCheck {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::validation(format!("invalid login URL '{}': {}", url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::validation(format!(
                "login URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `{username, password}` as JSON and capture the response
    ///
    /// Any HTTP status is a result; only transport failures are errors.
    pub fn run(&self, username: &str, password: &str) -> Result<LoginCheckResult> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({ "username": username, "password": password }))
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        Ok(LoginCheckResult { status, body })
    }
}
