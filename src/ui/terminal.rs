use super::input::LineSource;
use crate::client::TextGenerator;
use crate::config::{ApiKey, Settings, API_KEY_ENV_VAR};
use crate::models::{Error, GenerateError, Result};
use crate::prompt::{compose, STRUCTURED_ANSWER_INSTRUCTION};
use crate::renderer::MarkdownRenderer;
use colored::*;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{info, warn};

pub const QUESTION_PROMPT: &str = "Ask your question: ";
pub const ANSWER_HEADER: &str = "--- Structured Answer ---";
pub const ANSWER_FOOTER: &str = "--- End Answer ---";

const THINKING: &str = "Thinking...";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    MissingKey,
    NoQuestion,
    Answered(String),
    Failed(GenerateError),
}

impl Outcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Outcome::MissingKey => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }
}

/// Reports settings that failed validation. Goes to `out` like every other
/// diagnostic, never to stderr.
pub fn report_invalid_settings<W: Write>(out: &mut W, err: &Error) -> io::Result<()> {
    writeln!(out, "{}", format!("Error: {}", err).red())?;
    out.flush()
}

/// Drives a single question from key check to printed answer.
pub struct TerminalUI<W: Write> {
    settings: Settings,
    out: W,
    renderer: Option<MarkdownRenderer>,
    show_progress: bool,
}

impl<W: Write> TerminalUI<W> {
    pub fn new(settings: Settings, out: W) -> Self {
        let renderer = settings.render.then(MarkdownRenderer::for_terminal);
        Self {
            settings,
            out,
            renderer,
            show_progress: false,
        }
    }

    /// Show a "Thinking..." notice while waiting on the model.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Runs the whole exchange once. `configure` is only called when a key is
    /// present; its error is reported and returned. The generator is called at
    /// most once and its failure is reported, never returned.
    pub async fn run<G, F, S>(
        &mut self,
        raw_key: Option<String>,
        configure: F,
        input: &mut S,
    ) -> Result<Outcome>
    where
        G: TextGenerator,
        F: FnOnce(&ApiKey, &Settings) -> Result<G>,
        S: LineSource + ?Sized,
    {
        let Some(key) = self.load_key(raw_key)? else {
            return Ok(Outcome::MissingKey);
        };

        let client = match configure(&key, &self.settings) {
            Ok(client) => {
                info!(model = %self.settings.model, "Gemini client configured");
                writeln!(self.out, "{}", "Gemini API configured successfully.".green())?;
                client
            }
            Err(err) => {
                writeln!(self.out, "{}", format!("Error configuring Gemini API: {}", err).red())?;
                return Err(err);
            }
        };

        // Whitespace-only counts as no question; anything else is sent as typed.
        let question = input.read_line(QUESTION_PROMPT)?;
        if question.trim().is_empty() {
            writeln!(self.out, "You did not enter a question.")?;
            return Ok(Outcome::NoQuestion);
        }

        self.ask(&client, &question).await
    }

    fn load_key(&mut self, raw_key: Option<String>) -> Result<Option<ApiKey>> {
        let key = raw_key.and_then(ApiKey::new);
        if key.is_none() {
            let message = format!(
                "Error: API key not found. Please set the '{}' environment variable.",
                API_KEY_ENV_VAR
            );
            writeln!(self.out, "{}", message.red())?;
        }
        Ok(key)
    }

    /// Sends one question and prints either the framed answer or the failure.
    pub async fn ask<G>(&mut self, client: &G, question: &str) -> Result<Outcome>
    where
        G: TextGenerator + ?Sized,
    {
        let prompt = compose(STRUCTURED_ANSWER_INSTRUCTION, question);

        if self.show_progress {
            write!(self.out, "{}", THINKING.yellow())?;
            self.out.flush()?;
        }
        let result = client.generate(&prompt, &self.settings.model).await;
        if self.show_progress {
            write!(self.out, "\r{}\r", " ".repeat(THINKING.len()))?;
        }

        match result {
            Ok(answer) => {
                self.print_answer(&answer)?;
                Ok(Outcome::Answered(answer))
            }
            Err(err) => {
                warn!(error = %err, "no answer from Gemini");
                self.report_failure(&err)?;
                Ok(Outcome::Failed(err))
            }
        }
    }

    fn print_answer(&mut self, answer: &str) -> Result<()> {
        let body = match &self.renderer {
            Some(renderer) => renderer.render(answer),
            None => answer.to_string(),
        };

        writeln!(self.out)?;
        writeln!(self.out, "{}", ANSWER_HEADER.green().bold())?;
        writeln!(self.out, "{}", body)?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", ANSWER_FOOTER.green().bold())?;
        self.out.flush()?;
        Ok(())
    }

    fn report_failure(&mut self, err: &GenerateError) -> Result<()> {
        if err.is_api_rejection() {
            writeln!(self.out, "{}", format!("API Error from Gemini: {}", err).red())?;
            writeln!(self.out, "Please check your API key, API access, and request limits.")?;
        } else {
            writeln!(self.out, "{}", format!("An unexpected error occurred: {}", err).red())?;
        }
        writeln!(self.out, "Failed to get a structured answer from Gemini API.")?;
        self.out.flush()?;
        Ok(())
    }
}
