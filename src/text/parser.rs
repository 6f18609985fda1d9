//! Turns numbered-list model replies into clean items.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // literal pattern
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\s*[.):]|\s)|[-*•])\s*").expect("valid list marker pattern")
});

#[allow(clippy::expect_used)] // literal pattern
static LEADING_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*|\*|#+\s*)").expect("valid markup pattern")
});

/// Strips list numbering, bullets and markdown emphasis from a single line.
///
/// `"1. **A sunlit kitchen**"` becomes `"A sunlit kitchen"`. Digits that are
/// part of the text (`"3D studio"`) are left alone.
pub fn normalize_line(line: &str) -> String {
    let trimmed = line.trim();
    let unnumbered = LIST_MARKER.replace(trimmed, "");
    let unmarked = LEADING_MARKUP.replace(unnumbered.trim_start(), "");
    let cleaned = unmarked.trim();
    cleaned.strip_suffix("**").unwrap_or(cleaned).trim().to_string()
}

/// Splits a reply into one item per line, keeping items longer than `min_chars`.
pub fn parse_list(text: &str, min_chars: usize) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(normalize_line)
        .filter(|item| item.chars().count() > min_chars)
        .collect()
}

/// Pads `items` out to exactly `count` entries.
///
/// The padding cycles through `items`, or through `defaults` when nothing was
/// parsed. Once every base entry has been used, repeats go through `vary`
/// with a 1-based round number so they don't come out identical.
pub fn fill_to_count<F>(items: Vec<String>, defaults: &[String], count: usize, vary: F) -> Vec<String>
where
    F: Fn(&str, usize) -> String,
{
    let base = if items.is_empty() {
        defaults.to_vec()
    } else {
        items.clone()
    };
    let mut filled = items;
    if base.is_empty() {
        filled.truncate(count);
        return filled;
    }

    while filled.len() < count {
        let idx = filled.len() % base.len();
        let item = &base[idx];
        let next = if filled.len() >= base.len() {
            vary(item, filled.len() - base.len() + 1)
        } else {
            item.clone()
        };
        filled.push(next);
    }
    filled.truncate(count);
    filled
}
