use tracing::debug;

use crate::model::intent::{CommandDomain, Intent, IntentCategory, IntentType};
use crate::parse::domain::classify_command;
use crate::parse::parameters::{extract_parameters, ExtractedParameters};

// ---------------------------------------------------------------------------
// Intent catalog: per-type keyword lists for the scoring classifier
// ---------------------------------------------------------------------------

/// Types the scoring classifier can pick, in tie-break order, with the
/// keywords that vote for each.
pub const INTENT_CATALOG: &[(IntentType, &[&str])] = &[
    (
        IntentType::DrawShape,
        &["draw", "shape", "circle", "rectangle", "square", "triangle", "ellipse", "polygon", "star"],
    ),
    (IntentType::DrawLine, &["line", "stroke", "arrow", "connect"]),
    (
        IntentType::DrawFreehand,
        &["sketch", "freehand", "scribble", "brush", "pencil", "doodle"],
    ),
    (IntentType::DrawErase, &["erase", "eraser", "clear", "rub out"]),
    (
        IntentType::StyleChangeColor,
        &["color", "colour", "fill", "tint", "primary", "secondary", "accent"],
    ),
    (IntentType::StyleChangeBackgroundColor, &["background", "backdrop"]),
    (
        IntentType::StyleChangeSize,
        &["size", "bigger", "smaller", "larger", "width", "height"],
    ),
    (
        IntentType::StyleChangeFont,
        &["font", "typeface", "typography", "bold", "italic", "text"],
    ),
    (
        IntentType::StyleApplyTheme,
        &["theme", "palette", "dark mode", "light mode", "scheme"],
    ),
    (IntentType::AnimateFadeIn, &["fade in", "appear", "reveal", "show"]),
    (IntentType::AnimateFadeOut, &["fade out", "disappear", "vanish", "hide"]),
    (IntentType::AnimateMove, &["animate", "slide", "move", "path"]),
    (IntentType::AnimateRotate, &["spin", "rotate", "twirl"]),
    (IntentType::AnimateScale, &["grow", "shrink", "zoom", "scale", "pulse"]),
    (IntentType::AnimateBounce, &["bounce", "jump", "wobble"]),
    (IntentType::WebsiteCreatePage, &["page", "website", "site", "landing"]),
    (
        IntentType::WebsiteAddComponent,
        &["button", "header", "footer", "navbar", "menu", "form", "section", "component", "hero"],
    ),
    (
        IntentType::WebsiteChangeLayout,
        &["layout", "grid", "column", "align", "arrange"],
    ),
    (IntentType::TransformMove, &["move", "drag", "shift", "position", "place"]),
    (IntentType::TransformResize, &["resize", "scale", "stretch", "enlarge"]),
    (IntentType::TransformRotate, &["rotate", "flip", "turn", "tilt"]),
    (
        IntentType::Conversation,
        &["chat", "talk", "question", "explain", "tell me", "what is", "how do"],
    ),
];

/// Phrases that mark small talk when nothing else matched.
pub const CONVERSATIONAL_PHRASES: &[&str] = &[
    "hello", "hi", "hey", "thanks", "thank you", "how are you", "good morning",
    "good evening", "who are you", "what can you do",
];

/// Confidence assigned to the conversation/unknown fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Highest confidence the scoring classifier ever reports.
pub const MAX_CLASSIFIER_CONFIDENCE: f64 = 0.9;

const PARAMETER_BOOST: u32 = 2;

/// Extra score an intent type earns from the parameters found in the input.
fn parameter_boost(intent_type: IntentType, params: &ExtractedParameters) -> u32 {
    let name = intent_type.as_str();
    let mut boost = 0;

    if intent_type.category() == IntentCategory::Drawing && !params.shapes.is_empty() {
        boost += PARAMETER_BOOST;
    }
    if name.contains("Color") && !params.colors.is_empty() {
        boost += PARAMETER_BOOST;
    }
    if intent_type.category() == IntentCategory::Animation && !params.timing.is_empty() {
        boost += PARAMETER_BOOST;
    }
    if (name.contains("Size") || name.contains("resize") || name.contains("scale"))
        && !params.sizes.is_empty()
    {
        boost += PARAMETER_BOOST;
    }
    if matches!(intent_type, IntentType::TransformMove | IntentType::AnimateMove)
        && !params.positions.is_empty()
    {
        boost += PARAMETER_BOOST;
    }

    boost
}

/// Score every catalog type eligible for `domain`. A `general` domain makes
/// every type eligible.
pub fn score_intents(
    normalized: &str,
    domain: CommandDomain,
    params: &ExtractedParameters,
) -> Vec<(IntentType, u32)> {
    INTENT_CATALOG
        .iter()
        .filter(|(intent_type, _)| {
            domain == CommandDomain::General || intent_type.domain() == domain
        })
        .map(|(intent_type, keywords)| {
            let hits = keywords.iter().filter(|kw| normalized.contains(*kw)).count() as u32;
            (*intent_type, hits + parameter_boost(*intent_type, params))
        })
        .collect()
}

/// `min(0.9, 0.5 + (best/10)*0.3 + (gap/5)*0.2)`.
pub fn score_confidence(best: u32, second: u32) -> f64 {
    let gap = best.saturating_sub(second) as f64;
    (0.5 + (best as f64 / 10.0) * 0.3 + (gap / 5.0) * 0.2).min(MAX_CLASSIFIER_CONFIDENCE)
}

/// Classify free text into a single best intent.
pub fn classify_intent(input: &str) -> Intent {
    let normalized = input.trim().to_lowercase();
    let domain = classify_command(&normalized);
    let params = extract_parameters(&normalized);
    let scores = score_intents(&normalized, domain, &params);

    let mut best: Option<(IntentType, u32)> = None;
    for &(intent_type, score) in &scores {
        // Strictly greater: ties keep catalog order.
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((intent_type, score));
        }
    }

    let (best_type, best_score) = match best {
        Some((t, s)) if s > 0 => (t, s),
        _ => {
            let fallback = if CONVERSATIONAL_PHRASES.iter().any(|p| normalized.contains(p)) {
                IntentType::Conversation
            } else {
                IntentType::Unknown
            };
            debug!(input = %input, intent = %fallback, "no intent keywords matched");
            return Intent::new(
                fallback,
                CommandDomain::General,
                params.into_properties(),
                FALLBACK_CONFIDENCE,
                input,
            );
        }
    };

    let second_score = scores
        .iter()
        .filter(|(t, _)| *t != best_type)
        .map(|(_, s)| *s)
        .max()
        .unwrap_or(0);

    let confidence = score_confidence(best_score, second_score);
    debug!(
        input = %input,
        %domain,
        intent = %best_type,
        best_score,
        second_score,
        confidence,
        "classified intent"
    );

    Intent::new(
        best_type,
        best_type.domain(),
        params.into_properties(),
        confidence,
        input,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::PropertyValue;

    fn list(intent: &Intent, key: &str) -> Vec<String> {
        intent
            .parameters
            .get(key)
            .and_then(PropertyValue::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_draw_red_circle() {
        let intent = classify_intent("draw a red circle");
        assert_eq!(intent.intent_type, IntentType::DrawShape);
        assert_eq!(intent.domain, CommandDomain::Drawing);
        assert!(list(&intent, "colors").contains(&"red".to_string()));
        assert!(list(&intent, "shapes").contains(&"circle".to_string()));
        // best 4 (draw, circle, +2 shapes), runner-up 2 (shape boost only)
        assert!((intent.confidence - 0.70).abs() < 1e-9);

        let hello = classify_intent("hello there");
        assert!(intent.confidence > hello.confidence);
    }

    #[test]
    fn test_hello_falls_back_to_conversation() {
        let intent = classify_intent("hello there");
        assert_eq!(intent.intent_type, IntentType::Conversation);
        assert_eq!(intent.domain, CommandDomain::General);
        assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(intent.raw_input, "hello there");
    }

    #[test]
    fn test_gibberish_is_unknown() {
        let intent = classify_intent("qwzx vbnm");
        assert_eq!(intent.intent_type, IntentType::Unknown);
        assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);
        assert!(intent.parameters.is_empty());
    }

    #[test]
    fn test_domain_filters_candidates() {
        // styling domain: only style.* types compete
        let intent = classify_intent("change the primary color to blue");
        assert_eq!(intent.intent_type, IntentType::StyleChangeColor);
        assert_eq!(intent.domain, CommandDomain::Styling);
    }

    #[test]
    fn test_timing_boost_on_animation() {
        let intent = classify_intent("bounce the logo for 2s");
        assert_eq!(intent.intent_type, IntentType::AnimateBounce);
        assert!(list(&intent, "timing").contains(&"2s".to_string()));
    }

    #[test]
    fn test_confidence_formula_and_cap() {
        assert!((score_confidence(4, 2) - 0.70).abs() < 1e-9);
        assert!((score_confidence(1, 1) - 0.53).abs() < 1e-9);
        assert_eq!(score_confidence(10, 0), MAX_CLASSIFIER_CONFIDENCE);
        assert_eq!(score_confidence(50, 0), MAX_CLASSIFIER_CONFIDENCE);
    }

    #[test]
    fn test_whitespace_and_case_are_normalized() {
        let a = classify_intent("  DRAW A RED CIRCLE  ");
        let b = classify_intent("draw a red circle");
        assert_eq!(a.intent_type, b.intent_type);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.parameters, b.parameters);
    }
}
