//! Sub-list marker rewriting
//!
//! Some source dialects express a nested step list with literal roman
//! numerals (`i.`, `ii.`) or outline numbers (`1.1.`, `1.2.`) typed into the
//! text. These become explicit alphabetic markers (`a.`, `b.`) so the output
//! reads as one consistent sub-list.
//!
//! Numbering is tracked per contiguous run of marker lines. Blank lines and
//! `+` continuations do not end a run; any other line does, so each new list
//! context starts again at `a.`.

use regex::Regex;
use std::sync::LazyLock;

use super::{LineRole, Syntax, VerbatimTracker};

/// `<indent><marker>. <rest>` where marker is letters or dotted numbers
static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([a-z]+|\d+(?:\.\d+)+)\. (.*)$").expect("MARKER_LINE: hardcoded regex is valid")
});

/// Largest roman numeral accepted as a marker
const MAX_ROMAN: u32 = 39;

/// Marker found at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// Lowercase roman numeral with its value
    Roman(u32),
    /// Outline number; carries its last component
    Outline(u32),
    /// Single lowercase letter with its 1-based position
    Alpha(u32),
}

/// Run state between lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    None,
    Roman { next: u32 },
    Outline { next: u32 },
    Alpha { next: u32 },
}

/// Rewrite roman-numeral and outline sub-list markers to `a.`, `b.`, ...
#[must_use]
pub fn rewrite_sublist_markers(text: &str) -> String {
    let mut tracker = VerbatimTracker::new(Syntax::AsciiDoc);
    let mut run = Run::None;
    let mut out: Vec<String> = Vec::new();

    for line in text.lines() {
        if tracker.observe(line) != LineRole::Text {
            run = Run::None;
            out.push(line.to_string());
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "+" {
            out.push(line.to_string());
            continue;
        }

        let Some(caps) = MARKER_LINE.captures(line) else {
            run = Run::None;
            out.push(line.to_string());
            continue;
        };
        let indent = &caps[1];
        let rest = &caps[3];
        let Some(marker) = parse_marker(&caps[2]) else {
            run = Run::None;
            out.push(line.to_string());
            continue;
        };

        let (position, next_run) = step(run, marker);
        run = next_run;
        match position {
            Some(position) => out.push(format!("{indent}{}. {rest}", alpha(position))),
            None => out.push(line.to_string()),
        }
    }

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Advance the run with one marker line.
///
/// Returns the alphabetic position to write (None leaves the line as is)
/// and the new run state.
fn step(run: Run, marker: Marker) -> (Option<u32>, Run) {
    // a letter that continues an alphabetic run wins over its roman reading
    if let Run::Alpha { next } = run
        && let Some(letter) = alpha_reading(marker)
        && letter == next
    {
        return (Some(letter), Run::Alpha { next: next + 1 });
    }

    match marker {
        Marker::Roman(value) => match run {
            Run::Roman { next } if value == next => (Some(value), Run::Roman { next: next + 1 }),
            _ if value == 1 => (Some(1), Run::Roman { next: 2 }),
            _ => match alpha_reading(marker) {
                // `v.` or `x.` outside a roman run reads as a letter
                Some(letter) => (None, Run::Alpha { next: letter + 1 }),
                None => (None, Run::None),
            },
        },
        Marker::Outline(last) => match run {
            Run::Outline { next } if last != 1 => (Some(next), Run::Outline { next: next + 1 }),
            _ => (Some(1), Run::Outline { next: 2 }),
        },
        Marker::Alpha(letter) => (None, Run::Alpha { next: letter + 1 }),
    }
}

/// Position of a single-letter marker in the alphabet
fn alpha_reading(marker: Marker) -> Option<u32> {
    match marker {
        Marker::Alpha(letter) => Some(letter),
        Marker::Roman(1) => Some(9),
        Marker::Roman(5) => Some(22),
        Marker::Roman(10) => Some(24),
        _ => None,
    }
}

fn parse_marker(token: &str) -> Option<Marker> {
    if token.contains('.') {
        let last = token.rsplit('.').next()?.parse::<u32>().ok()?;
        return Some(Marker::Outline(last));
    }
    if let Some(value) = parse_roman(token) {
        return Some(Marker::Roman(value));
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Some(Marker::Alpha(c as u32 - 'a' as u32 + 1)),
        _ => None,
    }
}

/// Parse a lowercase roman numeral built from `i`, `v` and `x`.
fn parse_roman(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| matches!(c, 'i' | 'v' | 'x')) {
        return None;
    }
    let mut rest = token;
    let mut total = 0u32;
    for &(step, glyph) in ROMAN_TABLE {
        while let Some(tail) = rest.strip_prefix(glyph) {
            total += step;
            rest = tail;
        }
    }
    // only canonical spellings: re-encoding must give the same token
    (rest.is_empty() && total > 0 && total <= MAX_ROMAN && to_roman(total) == token).then_some(total)
}

const ROMAN_TABLE: &[(u32, &str)] = &[(10, "x"), (9, "ix"), (5, "v"), (4, "iv"), (1, "i")];

fn to_roman(mut value: u32) -> String {
    let mut out = String::new();
    for &(step, glyph) in ROMAN_TABLE {
        while value >= step {
            out.push_str(glyph);
            value -= step;
        }
    }
    out
}

/// Letter for a 1-based position; past `z` the letters double (`aa.`)
fn alpha(position: u32) -> String {
    let index = (position.max(1) - 1) % 26;
    let letter = char::from(b'a' + index as u8);
    let repeat = (position.max(1) - 1) / 26 + 1;
    std::iter::repeat_n(letter, repeat as usize).collect()
}
