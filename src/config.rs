use crate::models::{Error, Result};
use clap::Parser;
use std::env;
use std::fmt;
use std::time::Duration;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_FILTER: &str = "gemini_ask=warn,reqwest=warn";

#[derive(Debug, Parser)]
#[command(name = "gemini-ask", version)]
#[command(about = "Ask Gemini a single question and print a structured answer")]
#[command(long_about = "Reads one question from standard input, sends it to Gemini with an \
instruction asking for a well-structured answer, and prints the reply.\n\n\
The API key is read from the GEMINI_API_KEY environment variable (or a .env file).")]
pub struct Cli {
    /// Gemini model to query
    #[arg(short, long, value_name = "MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Seconds to wait for Gemini before giving up
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Render the answer's markdown for the terminal instead of printing it verbatim
    #[arg(long)]
    pub render: bool,

    /// Base URL of the Generative Language API
    #[arg(long, hide = true, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

/// Validated run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: String,
    pub timeout: Duration,
    pub render: bool,
    pub endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            render: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl TryFrom<Cli> for Settings {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let model = cli.model.trim();
        if model.is_empty() {
            return Err(Error::Config("model name must not be empty".to_string()));
        }
        if cli.timeout == 0 {
            return Err(Error::Config("timeout must be at least one second".to_string()));
        }

        let endpoint = cli.endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(Error::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                cli.endpoint
            )));
        }

        Ok(Self {
            model: model.to_string(),
            timeout: Duration::from_secs(cli.timeout),
            render: cli.render,
            endpoint: endpoint.to_string(),
        })
    }
}

/// A Gemini API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty or whitespace-only value.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Raw value of `GEMINI_API_KEY`, if the variable is set and valid unicode.
pub fn api_key_from_env() -> Option<String> {
    env::var(API_KEY_ENV_VAR).ok()
}
