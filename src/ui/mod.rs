mod input;
mod terminal;

pub use input::{EditorInput, LineSource, ReaderInput};
pub use terminal::{report_invalid_settings, Outcome, TerminalUI, ANSWER_FOOTER, ANSWER_HEADER, QUESTION_PROMPT};
