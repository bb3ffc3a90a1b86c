//! Splitting a reference cell into one or more candidate names.
//!
//! Alliance seats list several nominees in one cell, formatted however the
//! table author felt like. Strategies are tried in a fixed order and the
//! first one that yields two or more names wins; otherwise the whole cell is
//! a single candidate.

use std::sync::LazyLock;

use regex::Regex;

/// Which strategy produced a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    LineBreak,
    BrTag,
    Parenthetical,
    Delimiter,
    CommaCapital,
    Whole,
}

type Splitter = fn(&str) -> Option<Vec<String>>;

/// Priority order. Each splitter returns `None` unless it finds at least two
/// names.
const STRATEGIES: &[(SplitStrategy, Splitter)] = &[
    (SplitStrategy::LineBreak, split_line_breaks),
    (SplitStrategy::BrTag, split_br_tags),
    (SplitStrategy::Parenthetical, split_parentheticals),
    (SplitStrategy::Delimiter, split_delimiters),
    (SplitStrategy::CommaCapital, split_comma_capital),
];

const DELIMITERS: &[&str] = &[" • ", " ; ", " | "];

/// Leading glue left on a name after a split.
const JOINERS: &[char] = &[',', ';', '/', '&', '•', '|'];

static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// `name (affiliation)` groups.
static PAREN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^()]+?\([^()]*\)").unwrap());

/// Split a sanitized cell into candidate names.
pub fn split_candidates(cell: &str) -> Vec<String> {
    split_with_strategy(cell).1
}

/// Like [`split_candidates`] but also reports which strategy matched.
pub fn split_with_strategy(cell: &str) -> (SplitStrategy, Vec<String>) {
    let cell = cell.trim();
    if cell.is_empty() {
        return (SplitStrategy::Whole, Vec::new());
    }
    for (strategy, splitter) in STRATEGIES {
        if let Some(names) = splitter(cell) {
            return (*strategy, names);
        }
    }
    (SplitStrategy::Whole, vec![cell.to_string()])
}

fn tidy(part: &str) -> String {
    part.trim()
        .trim_start_matches(JOINERS)
        .trim_end_matches(JOINERS)
        .trim()
        .to_string()
}

fn at_least_two<'a>(parts: impl Iterator<Item = &'a str>) -> Option<Vec<String>> {
    let names: Vec<String> = parts.map(tidy).filter(|n| !n.is_empty()).collect();
    (names.len() >= 2).then_some(names)
}

fn split_line_breaks(cell: &str) -> Option<Vec<String>> {
    if !cell.contains('\n') {
        return None;
    }
    at_least_two(cell.lines())
}

fn split_br_tags(cell: &str) -> Option<Vec<String>> {
    if !BR_TAG.is_match(cell) {
        return None;
    }
    at_least_two(BR_TAG.split(cell))
}

fn split_parentheticals(cell: &str) -> Option<Vec<String>> {
    at_least_two(PAREN_GROUP.find_iter(cell).map(|m| m.as_str()))
}

fn split_delimiters(cell: &str) -> Option<Vec<String>> {
    let delimiter = DELIMITERS.iter().find(|d| cell.contains(*d))?;
    at_least_two(cell.split(delimiter))
}

/// Split on commas followed by a capital letter only, so `"Sharma, ji"`
/// stays one name.
fn split_comma_capital(cell: &str) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, c) in cell.char_indices() {
        if c != ',' {
            continue;
        }
        let next = cell[idx + 1..].trim_start().chars().next();
        if next.is_some_and(char::is_uppercase) {
            parts.push(&cell[start..idx]);
            start = idx + 1;
        }
    }
    if parts.is_empty() {
        return None;
    }
    parts.push(&cell[start..]);
    at_least_two(parts.into_iter())
}
