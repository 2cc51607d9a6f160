//! Transcript text normalization
//!
//! Applies a fixed sequence of cleanup rules to each raw cue or API text line
//! and assembles the survivors into paragraph text. Normalization never fails;
//! an empty input yields an empty transcript and the caller decides what that
//! means.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static LEADING_CHEVRON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>>\s*").unwrap());
static INTERIOR_CHEVRON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*>>\s*").unwrap());
static COLON_PERIOD: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*\.").unwrap());
static PERIOD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static TRAILING_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*:\s*$").unwrap());
static SPACED_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\u{2013}\u{2014}]\s*").unwrap());
static ANY_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleaned transcript: one paragraph per surviving input line.
///
/// Invariants: no paragraph is empty, no markup or timing tokens remain, and
/// each paragraph starts with an upper-case character unless the source line
/// was fully upper-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    paragraphs: Vec<String>,
}

impl Transcript {
    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.paragraphs.join("\n\n"))
    }
}

/// Normalize an ordered sequence of raw lines into a transcript.
pub fn normalize_lines<'a, I>(lines: I) -> Transcript
where
    I: IntoIterator<Item = &'a str>,
{
    let paragraphs = lines
        .into_iter()
        .filter_map(normalize_line)
        .collect::<Vec<_>>();

    Transcript { paragraphs }
}

/// Apply the per-line cleanup rules in order; `None` if nothing survives.
fn normalize_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let line = LEADING_CHEVRON.replace(line, "");
    let line = INTERIOR_CHEVRON.replace_all(&line, " ");
    let line = COLON_PERIOD.replace_all(&line, ":");
    let line = PERIOD_RUN.replace_all(&line, ".");
    let line = SPACE_RUN.replace_all(&line, " ");
    let line = TRAILING_COLON.replace(&line, "");
    let line = SPACED_DASH.replace_all(&line, "-");
    let line = ANY_WHITESPACE.replace_all(&line, " ");
    let line = line.trim();

    if line.is_empty() {
        return None;
    }

    if is_fully_uppercase(line) {
        // Acronyms and shouted lines are intentional; leave them alone
        Some(line.to_string())
    } else {
        Some(uppercase_first(line))
    }
}

/// True when the line has at least one cased character and none of them are
/// lower-case.
fn is_fully_uppercase(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn uppercase_first(line: &str) -> String {
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_chevrons_removed() {
        let t = normalize_lines([">> hello everyone"]);
        assert_eq!(t.paragraphs(), ["Hello everyone"]);

        let t = normalize_lines(["first >> second"]);
        assert_eq!(t.paragraphs(), ["First second"]);
    }

    #[test]
    fn test_punctuation_cleanup() {
        let t = normalize_lines(["so: . it begins"]);
        assert_eq!(t.paragraphs(), ["So: it begins"]);

        let t = normalize_lines(["wait... what"]);
        assert_eq!(t.paragraphs(), ["Wait. what"]);

        let t = normalize_lines(["coming up :"]);
        assert_eq!(t.paragraphs(), ["Coming up"]);
    }

    #[test]
    fn test_dash_normalization() {
        let t = normalize_lines(["one \u{2013} two", "three\u{2014}four"]);
        assert_eq!(t.paragraphs(), ["One-two", "Three-four"]);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let t = normalize_lines(["  too    many\tspaces  "]);
        assert_eq!(t.paragraphs(), ["Too many spaces"]);
    }

    #[test]
    fn test_uppercase_lines_left_untouched() {
        let t = normalize_lines(["NASA", "BREAKING NEWS"]);
        assert_eq!(t.paragraphs(), ["NASA", "BREAKING NEWS"]);
    }

    #[test]
    fn test_first_character_capitalized() {
        let t = normalize_lines(["hello there"]);
        assert_eq!(t.paragraphs(), ["Hello there"]);
    }

    #[test]
    fn test_one_line_one_paragraph() {
        let t = normalize_lines(["first", "second"]);
        assert_eq!(t.to_string(), "First\n\nSecond");
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(normalize_lines(Vec::<&str>::new()).is_empty());
        assert!(normalize_lines(["", "   ", "\t"]).is_empty());
        // A line that is nothing but a trailing colon vanishes entirely
        assert!(normalize_lines([" : "]).is_empty());
    }

    #[test]
    fn test_no_empty_paragraphs() {
        let t = normalize_lines(["real text", "  ", ":", "more text"]);
        assert!(t.paragraphs().iter().all(|p| !p.is_empty()));
        assert_eq!(t.paragraphs().len(), 2);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let raw = [
            ">> hello... there",
            "ALL CAPS LINE",
            "one \u{2013} two : ",
            "plain sentence",
        ];
        let once = normalize_lines(raw);
        let twice = normalize_lines(once.paragraphs().iter().map(String::as_str));
        assert_eq!(once, twice);
    }
}
