use crate::renderer::SyntaxCache;
use colored::*;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag};
use textwrap::{wrap, Options};

const BASE_INDENT: &str = "  ";
const CODE_INDENT: &str = "    ";

/// Renders a markdown answer for a plain terminal: wrapped paragraphs,
/// bold headings, bullets and numbered lists, highlighted code blocks.
pub struct MarkdownRenderer {
    width: usize,
}

#[derive(Default)]
struct RenderState {
    output: String,
    paragraph: String,
    // One entry per open list: the next number for ordered lists.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
    code_language: Option<String>,
    quote_depth: usize,
}

impl MarkdownRenderer {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(20),
        }
    }

    pub fn for_terminal() -> Self {
        let width = match terminal_size::terminal_size() {
            Some((terminal_size::Width(w), _)) => (w as usize).saturating_sub(2),
            None => 80,
        };
        Self::new(width)
    }

    pub fn render(&self, text: &str) -> String {
        let mut state = RenderState::default();

        for event in Parser::new(text) {
            match event {
                Event::Start(Tag::Heading(..)) => {
                    self.flush(&mut state);
                }
                Event::End(Tag::Heading(level, ..)) => {
                    let heading = std::mem::take(&mut state.paragraph);
                    let styled = match level {
                        HeadingLevel::H1 => heading.trim().bold().underline().to_string(),
                        _ => heading.trim().bold().to_string(),
                    };
                    state.output.push_str(BASE_INDENT);
                    state.output.push_str(&styled);
                    state.output.push_str("\n\n");
                }
                Event::Start(Tag::BlockQuote) => {
                    self.flush(&mut state);
                    state.quote_depth += 1;
                }
                Event::End(Tag::BlockQuote) => {
                    self.flush(&mut state);
                    state.quote_depth = state.quote_depth.saturating_sub(1);
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    self.flush(&mut state);
                    state.code_language = Some(match kind {
                        CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => {
                            lang.split_whitespace().next().unwrap_or("txt").to_string()
                        }
                        _ => "txt".to_string(),
                    });
                }
                Event::End(Tag::CodeBlock(_)) => {
                    state.code_language = None;
                    state.output.push('\n');
                }
                Event::Start(Tag::List(start)) => {
                    self.flush(&mut state);
                    state.lists.push(start);
                }
                Event::End(Tag::List(_)) => {
                    self.flush(&mut state);
                    state.lists.pop();
                    if state.lists.is_empty() {
                        state.output.push('\n');
                    }
                }
                Event::Start(Tag::Item) => {
                    self.flush(&mut state);
                    let marker = match state.lists.last_mut() {
                        Some(Some(next)) => {
                            let marker = format!("{}. ", next);
                            *next += 1;
                            marker
                        }
                        _ => "• ".to_string(),
                    };
                    state.item_marker = Some(marker);
                }
                Event::End(Tag::Item) => {
                    self.flush(&mut state);
                }
                Event::End(Tag::Paragraph) => {
                    self.flush(&mut state);
                    if state.lists.is_empty() {
                        state.output.push('\n');
                    }
                }
                Event::Start(Tag::Emphasis) => state.paragraph.push_str("\x1B[3m"),
                Event::End(Tag::Emphasis) => state.paragraph.push_str("\x1B[23m"),
                Event::Start(Tag::Strong) => state.paragraph.push_str("\x1B[1m"),
                Event::End(Tag::Strong) => state.paragraph.push_str("\x1B[22m"),
                Event::Code(code) => {
                    state.paragraph.push('`');
                    state.paragraph.push_str(&code);
                    state.paragraph.push('`');
                }
                Event::Text(text) => match &state.code_language {
                    Some(language) => {
                        let highlighted = SyntaxCache::global().highlight(&text, language, CODE_INDENT);
                        state.output.push_str(&highlighted);
                    }
                    None => state.paragraph.push_str(&text),
                },
                Event::SoftBreak => state.paragraph.push(' '),
                Event::HardBreak => self.flush(&mut state),
                Event::Rule => {
                    self.flush(&mut state);
                    state.output.push_str(BASE_INDENT);
                    state.output.push_str(&"─".repeat(self.width.saturating_sub(BASE_INDENT.len())));
                    state.output.push_str("\n\n");
                }
                _ => {}
            }
        }

        self.flush(&mut state);
        state.output.trim_end().to_string()
    }

    fn flush(&self, state: &mut RenderState) {
        if state.paragraph.trim().is_empty() {
            state.paragraph.clear();
            return;
        }

        let mut indent = BASE_INDENT.to_string();
        indent.push_str(&"│ ".repeat(state.quote_depth));
        indent.push_str(&"  ".repeat(state.lists.len().saturating_sub(1)));

        let (first, rest) = match state.item_marker.take() {
            Some(marker) => {
                let hanging = " ".repeat(marker.chars().count());
                (format!("{}{}", indent, marker), format!("{}{}", indent, hanging))
            }
            None if !state.lists.is_empty() => {
                // Continuation paragraph inside a list item.
                let hanging = format!("{}  ", indent);
                (hanging.clone(), hanging)
            }
            None => (indent.clone(), indent),
        };

        let options = Options::new(self.width)
            .initial_indent(&first)
            .subsequent_indent(&rest);
        for line in wrap(state.paragraph.trim(), &options) {
            state.output.push_str(&line);
            state.output.push('\n');
        }
        state.paragraph.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1B' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn render(text: &str) -> String {
        strip_ansi(&MarkdownRenderer::new(40).render(text))
    }

    #[test]
    fn headings_and_paragraphs_are_indented() {
        let out = render("# Overview\n\nTwo plus two is four.");
        assert_eq!(out, "  Overview\n\n  Two plus two is four.");
    }

    #[test]
    fn bullet_and_numbered_lists_get_markers() {
        let out = render("- apples\n- pears\n\n1. first\n2. second\n");
        assert!(out.contains("  • apples\n  • pears"));
        assert!(out.contains("  1. first\n  2. second"));
    }

    #[test]
    fn ordered_list_honours_start_number() {
        let out = render("3. three\n4. four\n");
        assert!(out.contains("  3. three\n  4. four"));
    }

    #[test]
    fn nested_list_is_indented_further() {
        let out = render("- outer\n  - inner\n");
        assert!(out.contains("  • outer\n    • inner"));
    }

    #[test]
    fn long_paragraph_wraps_to_width() {
        let text = "word ".repeat(40);
        let out = render(&text);
        assert!(out.lines().count() > 1);
        assert!(out.lines().all(|line| line.chars().count() <= 40));
    }

    #[test]
    fn wrapped_list_item_uses_hanging_indent() {
        let text = format!("- {}", "alpha ".repeat(12));
        let out = render(&text);
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("  • alpha"));
        assert!(lines.next().unwrap().starts_with("    alpha"));
    }

    #[test]
    fn code_block_content_survives_highlighting() {
        let out = render("```rust\nlet answer = 4;\n```\n");
        assert!(out.contains("    let answer = 4;"));
    }

    #[test]
    fn inline_code_keeps_backticks() {
        assert_eq!(render("Run `cargo doc` now."), "  Run `cargo doc` now.");
    }
}
