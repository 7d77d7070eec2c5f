use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

static SYNTAX_CACHE: OnceLock<SyntaxCache> = OnceLock::new();

const THEME: &str = "base16-ocean.dark";

/// Syntax definitions and themes, loaded once on first use.
pub struct SyntaxCache {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntaxCache {
    pub fn global() -> &'static SyntaxCache {
        SYNTAX_CACHE.get_or_init(|| Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        })
    }

    fn syntax_for(&self, language: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(THEME)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlights `code` for a 24-bit terminal, prefixing every line with `indent`.
    /// Lines that fail to highlight are emitted as-is.
    pub fn highlight(&self, code: &str, language: &str, indent: &str) -> String {
        let mut output = String::with_capacity(code.len() * 2);
        let Some(theme) = self.theme() else {
            for line in LinesWithEndings::from(code) {
                output.push_str(indent);
                output.push_str(line);
            }
            return output;
        };

        let mut highlighter = HighlightLines::new(self.syntax_for(language), theme);
        for line in LinesWithEndings::from(code) {
            output.push_str(indent);
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
                Err(_) => output.push_str(line),
            }
        }
        output.push_str("\x1B[0m");
        output
    }
}
