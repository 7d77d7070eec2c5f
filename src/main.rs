use clap::Parser;
use colored::*;
use gemini_ask::config::{api_key_from_env, DEFAULT_LOG_FILTER};
use gemini_ask::ui::{report_invalid_settings, EditorInput, ReaderInput};
use gemini_ask::{Cli, GeminiClient, Outcome, Settings, TerminalUI};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

async fn run(settings: Settings) -> anyhow::Result<Outcome> {
    let interactive = io::stdin().is_terminal();
    let mut ui = TerminalUI::new(settings, io::stdout()).with_progress(interactive);
    let raw_key = api_key_from_env();

    let outcome = if interactive {
        let mut input = EditorInput::new()?;
        ui.run(raw_key, GeminiClient::new, &mut input).await?
    } else {
        let mut input = ReaderInput::new(io::stdin().lock(), io::stdout());
        ui.run(raw_key, GeminiClient::new, &mut input).await?
    };

    Ok(outcome)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let settings = match Settings::try_from(Cli::parse()) {
        Ok(settings) => settings,
        Err(e) => {
            let _ = report_invalid_settings(&mut io::stdout(), &e);
            return ExitCode::from(2);
        }
    };

    match run(settings).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            println!("{}", format!("A critical error occurred in the main application: {}", e).red());
            println!("The application may not have started correctly or encountered issues during runtime.");
            ExitCode::FAILURE
        }
    }
}
