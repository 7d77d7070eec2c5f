use crate::models::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, Write};

/// Where the question comes from.
pub trait LineSource {
    /// Shows `prompt` and returns one line without its line ending.
    /// End of input yields an empty string.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Line editor for an interactive terminal.
pub struct EditorInput {
    editor: DefaultEditor,
}

impl EditorInput {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reads from any buffered reader, echoing the prompt to `echo`.
pub struct ReaderInput<R, W> {
    reader: R,
    echo: W,
}

impl<R: BufRead, W: Write> ReaderInput<R, W> {
    pub fn new(reader: R, echo: W) -> Self {
        Self { reader, echo }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.echo, "{}", prompt)?;
        self.echo.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
    }
}
