use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Style commands: explicit "set X to Y" edits of the style system
// ---------------------------------------------------------------------------

/// A parsed style-system command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum StyleCommand {
    /// `set primary to #3b82f6`, `set accent color to rgb(1,2,3)`
    #[serde(rename_all = "camelCase")]
    SetColor {
        color_name: String,
        color_value: String,
    },
    /// `set heading font to Inter`, `use font "Fira Code" for code`
    SetFont { target: String, family: String },
    /// `set spacing to 8px`, `set section spacing to 2rem`
    SetSpacing { name: String, value: String },
}

static SET_FONT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*set\s+(?:the\s+)?(?:(?P<target>[\w-]+)\s+)?font(?:\s+family)?\s+(?:to|=)\s+(?P<family>.+?)\s*$",
    )
    .expect("Invalid set-font regex")
});

static USE_FONT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*use\s+(?:the\s+)?font\s+(?P<family>.+?)\s+for\s+(?:the\s+)?(?P<target>[\w-]+)\s*$",
    )
    .expect("Invalid use-font regex")
});

static SET_SPACING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*set\s+(?:the\s+)?(?:(?P<name>[\w-]+)\s+)?spacing\s+(?:to|=)\s+(?P<value>\d+(?:\.\d+)?(?:px|rem|em|%)?)\s*$",
    )
    .expect("Invalid set-spacing regex")
});

static SET_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*set\s+(?:the\s+)?(?P<colorName>[\w-]+)(?:\s+colou?r)?\s+(?:to|=)\s+(?P<colorValue>#[0-9a-f]{3,8}|rgba?\([^)]*\)|[\w-]+)\s*$",
    )
    .expect("Invalid set-color regex")
});

const DEFAULT_FONT_TARGET: &str = "body";
const DEFAULT_SPACING_NAME: &str = "base";

fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().to_string())
}

fn unquote(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Parse a style command. Returns `None` for anything that is not one.
///
/// Font and spacing forms are tried before the color form, which would
/// otherwise read "set spacing to 8px" as a color named "spacing".
pub fn parse_style_command(input: &str) -> Option<StyleCommand> {
    if let Some(caps) = SET_FONT_RE.captures(input) {
        return Some(StyleCommand::SetFont {
            target: group(&caps, "target").unwrap_or_else(|| DEFAULT_FONT_TARGET.to_string()),
            family: unquote(caps.name("family")?.as_str()),
        });
    }

    if let Some(caps) = USE_FONT_RE.captures(input) {
        return Some(StyleCommand::SetFont {
            target: group(&caps, "target")?,
            family: unquote(caps.name("family")?.as_str()),
        });
    }

    if let Some(caps) = SET_SPACING_RE.captures(input) {
        return Some(StyleCommand::SetSpacing {
            name: group(&caps, "name").unwrap_or_else(|| DEFAULT_SPACING_NAME.to_string()),
            value: group(&caps, "value")?,
        });
    }

    let caps = SET_COLOR_RE.captures(input)?;
    Some(StyleCommand::SetColor {
        color_name: group(&caps, "colorName")?,
        color_value: group(&caps, "colorValue")?,
    })
}
