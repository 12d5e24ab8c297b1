use regex::Regex;
use std::sync::LazyLock;

use crate::config::SanitizerConfig;

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|\*|__").expect("valid emphasis regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#{1,6}\s+").expect("valid heading regex"));

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`{1,3}(.*?)`{1,3}").expect("valid code regex"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("valid link regex"));

/// Turns model output into something a speech engine can read aloud
///
/// Strips markdown, collapses whitespace and makes sure the text ends in a
/// terminal mark. Output is a fixed point: sanitizing it again changes nothing.
#[derive(Debug, Clone)]
pub struct ResponseSanitizer {
    terminal_marks: Vec<char>,
    default_mark: char,
}

impl ResponseSanitizer {
    pub fn new(config: &SanitizerConfig) -> Self {
        let mut terminal_marks: Vec<char> = config.terminal_marks.chars().collect();
        if !terminal_marks.contains(&config.default_mark) {
            terminal_marks.push(config.default_mark);
        }

        Self {
            terminal_marks,
            default_mark: config.default_mark,
        }
    }

    pub fn sanitize(&self, text: &str) -> String {
        // Collapse first so multi-line links and code spans are seen whole
        let mut out = collapse_whitespace(text);

        // Each pass only ever removes characters, so this terminates
        loop {
            let stripped = strip_markup(&out);
            if stripped == out {
                break;
            }
            out = stripped;
        }

        let mut out = collapse_whitespace(&out);

        if let Some(last) = out.chars().last() {
            if !self.terminal_marks.contains(&last) {
                out.push(self.default_mark);
            }
        }

        out
    }
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::new(&SanitizerConfig::default())
    }
}

fn strip_markup(text: &str) -> String {
    let text = EMPHASIS.replace_all(text, "");
    let text = HEADING.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    text.into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
