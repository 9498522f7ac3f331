use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::intent::{
    CommandDomain, Intent, IntentType, TranslationContext, TranslationResult,
};
use crate::parse::parameters::{extract_parameters, vocabulary_regex};
use crate::translate::{TranslationStrategy, PATTERN_MATCHING};

// ---------------------------------------------------------------------------
// Pattern matching: coarse whole-word vocabularies, first match wins
// ---------------------------------------------------------------------------

pub const MATCH_CONFIDENCE: f64 = 0.7;
pub const CONVERSATIONAL_CONFIDENCE: f64 = 0.5;
pub const NO_MATCH_CONFIDENCE: f64 = 0.0;

static DRAWING_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&[
        "draw", "sketch", "paint", "circle", "rectangle", "square", "triangle", "line", "shape",
        "ellipse", "polygon", "star",
    ])
});

static STYLING_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&[
        "color", "colour", "style", "font", "theme", "background", "border", "bold", "italic",
        "shadow", "palette",
    ])
});

static ANIMATION_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&[
        "animate", "animation", "fade", "bounce", "spin", "slide", "transition", "keyframe",
        "pulse",
    ])
});

static TRANSFORM_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&[
        "move", "rotate", "resize", "scale", "flip", "translate", "position", "align",
    ])
});

static UI_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&[
        "button", "page", "header", "footer", "navbar", "menu", "layout", "section", "form",
        "component",
    ])
});

static CONVERSATIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    vocabulary_regex(&["hello", "hi", "hey", "thanks", "thank you", "help", "how are you"])
});

/// Vocabularies in priority order.
fn vocabularies() -> [(&'static Lazy<Regex>, IntentType); 5] {
    [
        (&DRAWING_RE, IntentType::DrawCreate),
        (&STYLING_RE, IntentType::StyleApply),
        (&ANIMATION_RE, IntentType::AnimateCreate),
        (&TRANSFORM_RE, IntentType::TransformApply),
        (&UI_RE, IntentType::UiUpdate),
    ]
}

/// Classifies by the first vocabulary that matches. Much coarser than the
/// scoring classifier, and kept separate from it.
#[derive(Debug, Clone, Default)]
pub struct PatternMatchingStrategy;

impl PatternMatchingStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, input: &str) -> Intent {
        let parameters = extract_parameters(input).into_properties();

        let matched = vocabularies()
            .into_iter()
            .find(|(re, _)| re.is_match(input))
            .map(|(_, intent_type)| intent_type);

        let (intent_type, domain, confidence) = match matched {
            Some(t) => (t, t.domain(), MATCH_CONFIDENCE),
            None if CONVERSATIONAL_RE.is_match(input) => (
                IntentType::Conversation,
                CommandDomain::General,
                CONVERSATIONAL_CONFIDENCE,
            ),
            None => (IntentType::Unknown, CommandDomain::General, NO_MATCH_CONFIDENCE),
        };

        Intent::new(intent_type, domain, parameters, confidence, input)
    }
}

#[async_trait]
impl TranslationStrategy for PatternMatchingStrategy {
    fn name(&self) -> &str {
        PATTERN_MATCHING
    }

    async fn translate(&self, input: &str, _context: &TranslationContext) -> TranslationResult {
        TranslationResult::from_intent(self.classify(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let s = PatternMatchingStrategy::new();
        // drawing beats styling even though both match
        let intent = s.classify("draw a bold line");
        assert_eq!(intent.intent_type, IntentType::DrawCreate);
        assert_eq!(intent.domain, CommandDomain::Drawing);
        assert_eq!(intent.confidence, MATCH_CONFIDENCE);

        assert_eq!(s.classify("make the font bigger").intent_type, IntentType::StyleApply);
        assert_eq!(s.classify("fade the title").intent_type, IntentType::AnimateCreate);
        assert_eq!(s.classify("rotate it").intent_type, IntentType::TransformApply);
        assert_eq!(s.classify("add a button").domain, CommandDomain::Website);
    }

    #[test]
    fn test_whole_word_only() {
        let s = PatternMatchingStrategy::new();
        // "drawer" is not "draw", "pages" is not "page"
        assert_eq!(s.classify("open the drawer pages").intent_type, IntentType::Unknown);
    }

    #[test]
    fn test_conversational_and_unknown() {
        let s = PatternMatchingStrategy::new();
        let hello = s.classify("Hello there");
        assert_eq!(hello.intent_type, IntentType::Conversation);
        assert_eq!(hello.confidence, CONVERSATIONAL_CONFIDENCE);

        let unknown = s.classify("qwzx");
        assert_eq!(unknown.intent_type, IntentType::Unknown);
        assert_eq!(unknown.domain, CommandDomain::General);
        assert_eq!(unknown.confidence, NO_MATCH_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_translate_carries_parameters() {
        let s = PatternMatchingStrategy::new();
        let result = s
            .translate("draw a red circle", &TranslationContext::default())
            .await;
        assert_eq!(result.original, "draw a red circle");
        assert!(result.parameters.contains_key("colors"));
        assert!(result.parameters.contains_key("shapes"));
        assert!(result.alternative_intents.is_empty());
    }
}
