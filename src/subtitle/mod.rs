//! Timed-caption document parsing
//!
//! Turns one VTT-like caption document into an ordered sequence of plain cue
//! lines: timing ranges, header metadata and inline styling markup are
//! stripped, and lines repeated by overlapping auto-caption windows are
//! suppressed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub mod normalize;

pub use normalize::{normalize_lines, Transcript};

/// Inline timestamp tags embedded in auto-generated cues, e.g. `<00:00:01.280>`
static TIMESTAMP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\d{2}:\d{2}:\d{2}\.\d{3}>").unwrap());

/// Styling/voice tags such as `<c>`, `</c>`, `<c.colorE5E5E5>`, `<i>`
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

/// Sound placeholders that collapse to whitespace once entities are dropped
static NBSP_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*&nbsp;.*?&nbsp;\s*\]").unwrap());

static EMPTY_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\s*\]$").unwrap());

/// Parse a caption document into markup-free, deduplicated cue lines.
///
/// A document with no retained lines yields an empty vector; deciding whether
/// that is an error belongs to the caller.
pub fn parse_caption_document(document: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut cues = Vec::new();

    for line in document.lines() {
        let line = line.trim();

        if line.is_empty() || line.contains("-->") || is_header_line(line) {
            continue;
        }

        let line = TIMESTAMP_TAG.replace_all(line, "");
        let line = MARKUP_TAG.replace_all(&line, "");
        let line = NBSP_PLACEHOLDER.replace_all(&line, "");
        let line = line.trim();

        if line.is_empty() || EMPTY_BRACKETS.is_match(line) {
            continue;
        }

        // Overlapping caption windows repeat the same text verbatim
        if seen.insert(line.to_string()) {
            cues.push(line.to_string());
        }
    }

    cues
}

fn is_header_line(line: &str) -> bool {
    line.starts_with("WEBVTT") || line.starts_with("Kind:") || line.starts_with("Language:")
}
