//! Cell sanitization for the scraped reference table.

use std::sync::LazyLock;

use chunab_core::repair_mojibake;
use regex::Regex;

/// Class name that only shows up when the table render leaked its stylesheet
/// into cell text.
const STYLE_LEAK_MARKER: &str = "mw-parser-output";

/// Punctuation left at the edges of a cell by the render.
const EDGE_MARKUP: &[char] = &['{', '}', '[', ']', ';', '|', '"'];

const LONE_DASHES: &[&str] = &["-", "–", "—", "−"];

/// Footnote markers such as `[1]`, `[a]`, `[note 2]`.
static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?:note\s*)?[0-9a-z]{1,3}\]").unwrap());

/// Clean one reference-table cell.
///
/// - Leaked CSS: keep only what follows the last `}`.
/// - Footnote markers removed, edge markup trimmed, horizontal whitespace
///   collapsed per line. Line breaks survive for candidate splitting.
/// - A lone dash means "no candidate" and sanitizes to empty.
pub fn sanitize_cell(raw: &str) -> String {
    let repaired = repair_mojibake(raw);
    let mut text: &str = &repaired;
    if text.contains(STYLE_LEAK_MARKER)
        && let Some(idx) = text.rfind('}')
    {
        text = &text[idx + 1..];
    }
    let text = FOOTNOTE.replace_all(text, "");

    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            line.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .trim_matches(EDGE_MARKUP)
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();
    let joined = lines.join("\n");

    if LONE_DASHES.contains(&joined.as_str()) {
        return String::new();
    }
    joined
}
