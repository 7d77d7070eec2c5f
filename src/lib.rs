pub mod client;
pub mod config;
pub mod models;
pub mod prompt;
pub mod renderer;
pub mod ui;

pub use client::{GeminiClient, TextGenerator};
pub use config::{ApiKey, Cli, Settings};
pub use models::{Error, GenerateError, Result};
pub use ui::{Outcome, TerminalUI};
