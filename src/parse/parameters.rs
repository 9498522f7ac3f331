//! Regex-based extraction of command parameters from free text.
//!
//! Every extractor is pure and case-insensitive. Vocabulary matches come back
//! lowercased and grouped in vocabulary order (not the order they appear in
//! the input); pattern matches keep the text as written.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::graph::{Properties, PropertyValue};

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

pub const NAMED_COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "black", "white", "gray",
    "grey", "brown", "cyan", "magenta", "teal", "navy", "maroon", "olive", "lime", "indigo",
    "violet", "gold", "silver",
];

pub const RELATIVE_SIZES: &[&str] = &[
    "small", "medium", "large", "tiny", "huge", "bigger", "smaller",
];

pub const POSITIONS: &[&str] = &[
    "top", "bottom", "left", "right", "center", "middle", "top-left", "top-right",
    "bottom-left", "bottom-right", "above", "below", "beside", "next to", "corner",
];

pub const SHAPES: &[&str] = &[
    "circle", "square", "rectangle", "triangle", "ellipse", "oval", "line", "star", "polygon",
    "hexagon", "pentagon", "octagon", "diamond", "heart", "arrow", "arc", "curve",
];

pub const DURATION_WORDS: &[&str] = &["slow", "fast", "quick", "instant", "delay", "pause"];

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static NAMED_COLOR_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(NAMED_COLORS));
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("Invalid hex regex"));
static RGB_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)rgba?\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*(?:,\s*\d*\.?\d+\s*)?\)")
        .expect("Invalid rgb regex")
});

static PX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b\d+px\b").expect("Invalid px regex"));
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+%").expect("Invalid percent regex"));
static EM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d+(?:\.\d+)?(?:em|rem)\b").expect("Invalid em regex"));
static RELATIVE_SIZE_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(RELATIVE_SIZES));

static POSITION_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(POSITIONS));
static COORDINATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+),\s*(\d+)").expect("Invalid coordinate regex"));

static SHAPE_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(SHAPES));

static TIME_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:milliseconds|seconds|ms|s)\b").expect("Invalid time regex")
});
static DURATION_WORD_RE: Lazy<Regex> = Lazy::new(|| vocabulary_regex(DURATION_WORDS));

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("Invalid number regex"));

/// Whole-word, case-insensitive alternation over a vocabulary. Longer terms
/// come first so "top-left" wins over "top".
pub(crate) fn vocabulary_regex(terms: &[&str]) -> Regex {
    let mut sorted: Vec<&str> = terms.to_vec();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = sorted
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("Invalid vocabulary regex")
}

/// Vocabulary hits, lowercased, ordered by position in `terms`.
fn vocabulary_matches(re: &Regex, terms: &[&str], text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = re
        .find_iter(text)
        .filter_map(|m| {
            let term = m.as_str().to_lowercase();
            terms.iter().position(|t| *t == term).map(|idx| (idx, term))
        })
        .collect();
    found.sort_by_key(|(idx, _)| *idx);
    found.into_iter().map(|(_, term)| term).collect()
}

fn pattern_matches(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Per-category extractors
// ---------------------------------------------------------------------------

/// Named colors, then hex codes, then `rgb()`/`rgba()` notation.
pub fn extract_colors(text: &str) -> Vec<String> {
    let mut colors = vocabulary_matches(&NAMED_COLOR_RE, NAMED_COLORS, text);
    colors.extend(pattern_matches(&HEX_COLOR_RE, text));
    colors.extend(pattern_matches(&RGB_COLOR_RE, text));
    colors
}

pub fn extract_sizes(text: &str) -> Vec<String> {
    let mut sizes = pattern_matches(&PX_RE, text);
    sizes.extend(pattern_matches(&PERCENT_RE, text));
    sizes.extend(pattern_matches(&EM_RE, text));
    sizes.extend(vocabulary_matches(&RELATIVE_SIZE_RE, RELATIVE_SIZES, text));
    sizes
}

pub fn extract_positions(text: &str) -> Vec<String> {
    let mut positions = vocabulary_matches(&POSITION_RE, POSITIONS, text);
    positions.extend(pattern_matches(&COORDINATE_RE, text));
    positions
}

pub fn extract_shapes(text: &str) -> Vec<String> {
    vocabulary_matches(&SHAPE_RE, SHAPES, text)
}

pub fn extract_timing(text: &str) -> Vec<String> {
    let mut timing: Vec<String> = TIME_UNIT_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    timing.extend(vocabulary_matches(&DURATION_WORD_RE, DURATION_WORDS, text));
    timing
}

/// Standalone numeric literals in order of appearance. Digits glued to
/// letters, `#`, `.` or `_` (as in `10px`, `#3b82f6`, `v1.2.3`) are skipped;
/// a number ending a sentence still counts.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let mut rest = text[m.end()..].chars();
            let (after, after_next) = (rest.next(), rest.next());
            let glued_before = before.is_some_and(|c| c.is_alphanumeric() || "#._".contains(c));
            // a trailing '.' only glues when another digit follows it
            let glued_after = after.is_some_and(|c| c.is_alphanumeric() || c == '_')
                || (after == Some('.') && after_next.is_some_and(|c| c.is_ascii_digit()));
            !glued_before && !glued_after
        })
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

// ---------------------------------------------------------------------------
// ExtractedParameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedParameters {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub numbers: Vec<f64>,
}

impl ExtractedParameters {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.sizes.is_empty()
            && self.positions.is_empty()
            && self.shapes.is_empty()
            && self.timing.is_empty()
            && self.numbers.is_empty()
    }

    /// Convert into an intent parameter map. A key is present only when its
    /// category matched at least once.
    pub fn into_properties(self) -> Properties {
        let mut props = Properties::new();
        let text_lists = [
            ("colors", self.colors),
            ("sizes", self.sizes),
            ("positions", self.positions),
            ("shapes", self.shapes),
            ("timing", self.timing),
        ];
        for (key, values) in text_lists {
            if !values.is_empty() {
                props.insert(key.to_string(), PropertyValue::from(values));
            }
        }
        if !self.numbers.is_empty() {
            props.insert("numbers".to_string(), PropertyValue::from(self.numbers));
        }
        props
    }
}

/// Run every extractor over `text`.
pub fn extract_parameters(text: &str) -> ExtractedParameters {
    ExtractedParameters {
        colors: extract_colors(text),
        sizes: extract_sizes(text),
        positions: extract_positions(text),
        shapes: extract_shapes(text),
        timing: extract_timing(text),
        numbers: extract_numbers(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_color_is_whole_word() {
        assert_eq!(extract_colors("make it Red"), vec!["red"]);
        assert!(extract_colors("I am bored").is_empty());
        assert!(extract_colors("reddish tones").is_empty());
    }

    #[test]
    fn test_colors_follow_scan_order_not_position() {
        let colors = extract_colors("rgb(0, 0, 255) then #fff then blue and red");
        assert_eq!(colors, vec!["red", "blue", "#fff", "rgb(0, 0, 255)"]);
    }

    #[test]
    fn test_hex_lengths() {
        assert_eq!(extract_colors("#3b82f6"), vec!["#3b82f6"]);
        assert_eq!(extract_colors("#ABC"), vec!["#ABC"]);
        assert!(extract_colors("#abcd").is_empty());
    }

    #[test]
    fn test_rgba() {
        assert_eq!(
            extract_colors("fill rgba(10,20,30,0.5)"),
            vec!["rgba(10,20,30,0.5)"]
        );
    }

    #[test]
    fn test_sizes() {
        let sizes = extract_sizes("make it 20px wide, 50% tall, 1.5em padding and bigger");
        assert_eq!(sizes, vec!["20px", "50%", "1.5em", "bigger"]);
        assert_eq!(extract_sizes("2rem gap"), vec!["2rem"]);
    }

    #[test]
    fn test_positions_and_coordinates() {
        let positions = extract_positions("move it to the top-left corner at 100, 200");
        assert_eq!(positions, vec!["top-left", "corner", "100, 200"]);
        assert_eq!(extract_positions("put it next to the logo"), vec!["next to"]);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(
            extract_shapes("draw a Circle inside a square"),
            vec!["circle", "square"]
        );
        assert!(extract_shapes("encircled").is_empty());
    }

    #[test]
    fn test_timing() {
        let timing = extract_timing("fade in over 2 seconds with a 500ms delay, slow");
        assert_eq!(timing, vec!["2 seconds", "500ms", "slow", "delay"]);
        assert_eq!(extract_timing("1.5s"), vec!["1.5s"]);
        assert_eq!(extract_timing("200 milliseconds"), vec!["200 milliseconds"]);
    }

    #[test]
    fn test_numbers_are_standalone_and_ordered() {
        assert_eq!(extract_numbers("rotate 45 then -12.5 and 3"), vec![45.0, -12.5, 3.0]);
        assert!(extract_numbers("10px #3b82f6 1.5s").is_empty());
        assert_eq!(extract_numbers("at 100, 200"), vec![100.0, 200.0]);
    }

    #[test]
    fn test_number_before_full_stop() {
        assert_eq!(extract_numbers("rotate it by 45."), vec![45.0]);
        assert_eq!(extract_numbers("scale to 1.5. then stop"), vec![1.5]);
        assert!(extract_numbers("build v1.2.3").is_empty());
    }

    #[test]
    fn test_absent_categories_have_no_key() {
        let props = extract_parameters("draw a red circle").into_properties();
        assert!(props.contains_key("colors"));
        assert!(props.contains_key("shapes"));
        assert!(!props.contains_key("sizes"));
        assert!(!props.contains_key("timing"));
        assert!(!props.contains_key("numbers"));
        assert!(props["shapes"].is_non_empty_list());

        assert!(extract_parameters("hello there").into_properties().is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "Animate the blue star 30px left in 2s, then #ff0000 at 10, 20";
        assert_eq!(extract_parameters(text), extract_parameters(text));
    }
}
