use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::graph::{GraphNode, Properties};

// ---------------------------------------------------------------------------
// CommandDomain: the coarse area of the studio a command targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandDomain {
    Drawing,
    Styling,
    Animation,
    Website,
    General,
}

impl CommandDomain {
    /// All domains in classifier order. Ties in the domain vote keep this order.
    pub const ALL: [CommandDomain; 5] = [
        CommandDomain::Drawing,
        CommandDomain::Styling,
        CommandDomain::Animation,
        CommandDomain::Website,
        CommandDomain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandDomain::Drawing => "drawing",
            CommandDomain::Styling => "styling",
            CommandDomain::Animation => "animation",
            CommandDomain::Website => "website",
            CommandDomain::General => "general",
        }
    }
}

impl fmt::Display for CommandDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown command domain '{}'", s))
    }
}

// ---------------------------------------------------------------------------
// IntentType: the closed set of things a command can ask for
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentType {
    #[serde(rename = "draw.shape")]
    DrawShape,
    #[serde(rename = "draw.line")]
    DrawLine,
    #[serde(rename = "draw.freehand")]
    DrawFreehand,
    #[serde(rename = "draw.erase")]
    DrawErase,
    #[serde(rename = "draw.create")]
    DrawCreate,

    #[serde(rename = "style.changeColor")]
    StyleChangeColor,
    #[serde(rename = "style.changeBackgroundColor")]
    StyleChangeBackgroundColor,
    #[serde(rename = "style.changeSize")]
    StyleChangeSize,
    #[serde(rename = "style.changeFont")]
    StyleChangeFont,
    #[serde(rename = "style.applyTheme")]
    StyleApplyTheme,
    #[serde(rename = "style.apply")]
    StyleApply,

    #[serde(rename = "animate.fadeIn")]
    AnimateFadeIn,
    #[serde(rename = "animate.fadeOut")]
    AnimateFadeOut,
    #[serde(rename = "animate.move")]
    AnimateMove,
    #[serde(rename = "animate.rotate")]
    AnimateRotate,
    #[serde(rename = "animate.scale")]
    AnimateScale,
    #[serde(rename = "animate.bounce")]
    AnimateBounce,
    #[serde(rename = "animate.create")]
    AnimateCreate,

    #[serde(rename = "website.createPage")]
    WebsiteCreatePage,
    #[serde(rename = "website.addComponent")]
    WebsiteAddComponent,
    #[serde(rename = "website.changeLayout")]
    WebsiteChangeLayout,
    #[serde(rename = "ui.update")]
    UiUpdate,

    #[serde(rename = "transform.move")]
    TransformMove,
    #[serde(rename = "transform.resize")]
    TransformResize,
    #[serde(rename = "transform.rotate")]
    TransformRotate,
    #[serde(rename = "transform.apply")]
    TransformApply,

    #[serde(rename = "conversation")]
    Conversation,
    #[serde(rename = "respond")]
    Respond,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Grouping used by the scoring classifier's parameter boosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentCategory {
    Drawing,
    Styling,
    Animation,
    Website,
    Transform,
    Conversation,
    Fallback,
}

impl IntentType {
    /// Every variant, used for name lookup.
    pub const ALL: [IntentType; 29] = [
        IntentType::DrawShape,
        IntentType::DrawLine,
        IntentType::DrawFreehand,
        IntentType::DrawErase,
        IntentType::DrawCreate,
        IntentType::StyleChangeColor,
        IntentType::StyleChangeBackgroundColor,
        IntentType::StyleChangeSize,
        IntentType::StyleChangeFont,
        IntentType::StyleApplyTheme,
        IntentType::StyleApply,
        IntentType::AnimateFadeIn,
        IntentType::AnimateFadeOut,
        IntentType::AnimateMove,
        IntentType::AnimateRotate,
        IntentType::AnimateScale,
        IntentType::AnimateBounce,
        IntentType::AnimateCreate,
        IntentType::WebsiteCreatePage,
        IntentType::WebsiteAddComponent,
        IntentType::WebsiteChangeLayout,
        IntentType::UiUpdate,
        IntentType::TransformMove,
        IntentType::TransformResize,
        IntentType::TransformRotate,
        IntentType::TransformApply,
        IntentType::Conversation,
        IntentType::Respond,
        IntentType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::DrawShape => "draw.shape",
            IntentType::DrawLine => "draw.line",
            IntentType::DrawFreehand => "draw.freehand",
            IntentType::DrawErase => "draw.erase",
            IntentType::DrawCreate => "draw.create",
            IntentType::StyleChangeColor => "style.changeColor",
            IntentType::StyleChangeBackgroundColor => "style.changeBackgroundColor",
            IntentType::StyleChangeSize => "style.changeSize",
            IntentType::StyleChangeFont => "style.changeFont",
            IntentType::StyleApplyTheme => "style.applyTheme",
            IntentType::StyleApply => "style.apply",
            IntentType::AnimateFadeIn => "animate.fadeIn",
            IntentType::AnimateFadeOut => "animate.fadeOut",
            IntentType::AnimateMove => "animate.move",
            IntentType::AnimateRotate => "animate.rotate",
            IntentType::AnimateScale => "animate.scale",
            IntentType::AnimateBounce => "animate.bounce",
            IntentType::AnimateCreate => "animate.create",
            IntentType::WebsiteCreatePage => "website.createPage",
            IntentType::WebsiteAddComponent => "website.addComponent",
            IntentType::WebsiteChangeLayout => "website.changeLayout",
            IntentType::UiUpdate => "ui.update",
            IntentType::TransformMove => "transform.move",
            IntentType::TransformResize => "transform.resize",
            IntentType::TransformRotate => "transform.rotate",
            IntentType::TransformApply => "transform.apply",
            IntentType::Conversation => "conversation",
            IntentType::Respond => "respond",
            IntentType::Unknown => "unknown",
        }
    }

    pub fn category(&self) -> IntentCategory {
        use IntentType::*;
        match self {
            DrawShape | DrawLine | DrawFreehand | DrawErase | DrawCreate => IntentCategory::Drawing,
            StyleChangeColor | StyleChangeBackgroundColor | StyleChangeSize | StyleChangeFont
            | StyleApplyTheme | StyleApply => IntentCategory::Styling,
            AnimateFadeIn | AnimateFadeOut | AnimateMove | AnimateRotate | AnimateScale
            | AnimateBounce | AnimateCreate => IntentCategory::Animation,
            WebsiteCreatePage | WebsiteAddComponent | WebsiteChangeLayout | UiUpdate => {
                IntentCategory::Website
            }
            TransformMove | TransformResize | TransformRotate | TransformApply => {
                IntentCategory::Transform
            }
            Conversation => IntentCategory::Conversation,
            Respond | Unknown => IntentCategory::Fallback,
        }
    }

    /// The command domain this intent type belongs to. Transforms act on
    /// canvas objects and map to drawing.
    pub fn domain(&self) -> CommandDomain {
        match self.category() {
            IntentCategory::Drawing | IntentCategory::Transform => CommandDomain::Drawing,
            IntentCategory::Styling => CommandDomain::Styling,
            IntentCategory::Animation => CommandDomain::Animation,
            IntentCategory::Website => CommandDomain::Website,
            IntentCategory::Conversation | IntentCategory::Fallback => CommandDomain::General,
        }
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown intent type '{}'", s))
    }
}

// ---------------------------------------------------------------------------
// Intent and TranslationResult
// ---------------------------------------------------------------------------

/// A classified command. Built fresh per translation; adjustments produce a
/// new value through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    pub domain: CommandDomain,
    pub parameters: Properties,
    /// In [0.0, 1.0].
    pub confidence: f64,
    pub raw_input: String,
}

impl Intent {
    pub fn new(
        intent_type: IntentType,
        domain: CommandDomain,
        parameters: Properties,
        confidence: f64,
        raw_input: impl Into<String>,
    ) -> Self {
        Self {
            intent_type,
            domain,
            parameters,
            confidence: confidence.clamp(0.0, 1.0),
            raw_input: raw_input.into(),
        }
    }

    pub fn with_confidence(self, confidence: f64) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn with_type(self, intent_type: IntentType, domain: CommandDomain) -> Self {
        Self {
            intent_type,
            domain,
            ..self
        }
    }

    pub fn with_domain(self, domain: CommandDomain) -> Self {
        Self { domain, ..self }
    }

    pub fn with_parameters(self, parameters: Properties) -> Self {
        Self { parameters, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeIntent {
    pub intent: Intent,
    pub confidence: f64,
}

impl AlternativeIntent {
    pub fn new(intent: Intent) -> Self {
        let confidence = intent.confidence;
        Self { intent, confidence }
    }
}

/// What a strategy hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub original: String,
    pub intent: Intent,
    pub confidence: f64,
    /// Sorted by descending confidence; none exceeds `confidence`.
    pub alternative_intents: Vec<AlternativeIntent>,
    pub parameters: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_nodes: Vec<GraphNode>,
    /// Name of the strategy that produced the primary intent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl TranslationResult {
    pub fn from_intent(intent: Intent) -> Self {
        Self {
            original: intent.raw_input.clone(),
            confidence: intent.confidence,
            parameters: intent.parameters.clone(),
            intent,
            alternative_intents: Vec::new(),
            related_nodes: Vec::new(),
            strategy: None,
        }
    }

    pub fn with_strategy(mut self, name: impl Into<String>) -> Self {
        self.strategy = Some(name.into());
        self
    }

    pub fn with_related_nodes(mut self, nodes: Vec<GraphNode>) -> Self {
        self.related_nodes = nodes;
        self
    }

    /// Add an alternative and restore ordering: if the newcomer beats the
    /// primary it is promoted and the old primary becomes an alternative.
    pub fn with_alternative(mut self, alternative: Intent) -> Self {
        if alternative.confidence > self.confidence {
            let demoted = std::mem::replace(&mut self.intent, alternative);
            self.confidence = self.intent.confidence;
            self.parameters = self.intent.parameters.clone();
            self.alternative_intents.push(AlternativeIntent::new(demoted));
        } else {
            self.alternative_intents
                .push(AlternativeIntent::new(alternative));
        }
        sort_by_confidence(&mut self.alternative_intents, |a| a.confidence);
        self
    }
}

/// Stable descending sort by confidence. Equal confidences keep their order.
pub fn sort_by_confidence<T>(items: &mut [T], confidence: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| {
        confidence(b)
            .partial_cmp(&confidence(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Caller-supplied context for context-sensitive strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationContext {
    /// Oldest first; the last entry is the most recent intent.
    pub recent_intents: Vec<Intent>,
    pub selected_asset_id: Option<String>,
}

impl TranslationContext {
    pub fn most_recent_intent(&self) -> Option<&Intent> {
        self.recent_intents.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(t: IntentType, confidence: f64) -> Intent {
        Intent::new(t, t.domain(), Properties::new(), confidence, "x")
    }

    #[test]
    fn test_intent_type_names_round_trip_through_from_str() {
        for t in IntentType::ALL {
            assert_eq!(t.as_str().parse::<IntentType>().unwrap(), t);
        }
        assert!("draw.nothing".parse::<IntentType>().is_err());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        let json = serde_json::to_string(&IntentType::StyleChangeColor).unwrap();
        assert_eq!(json, "\"style.changeColor\"");
        let json = serde_json::to_string(&CommandDomain::Animation).unwrap();
        assert_eq!(json, "\"animation\"");
    }

    #[test]
    fn test_transform_maps_to_drawing() {
        assert_eq!(IntentType::TransformResize.domain(), CommandDomain::Drawing);
        assert_eq!(IntentType::UiUpdate.domain(), CommandDomain::Website);
        assert_eq!(IntentType::Unknown.domain(), CommandDomain::General);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(intent(IntentType::DrawShape, 1.7).confidence, 1.0);
        assert_eq!(intent(IntentType::DrawShape, -0.2).confidence, 0.0);
    }

    #[test]
    fn test_alternatives_stay_sorted_and_below_primary() {
        let result = TranslationResult::from_intent(intent(IntentType::DrawShape, 0.6))
            .with_alternative(intent(IntentType::Respond, 0.4))
            .with_alternative(intent(IntentType::DrawLine, 0.5));

        assert_eq!(result.intent.intent_type, IntentType::DrawShape);
        let confs: Vec<f64> = result.alternative_intents.iter().map(|a| a.confidence).collect();
        assert_eq!(confs, vec![0.5, 0.4]);
    }

    #[test]
    fn test_stronger_alternative_is_promoted() {
        let result = TranslationResult::from_intent(intent(IntentType::Unknown, 0.0))
            .with_alternative(intent(IntentType::Respond, 0.4));

        assert_eq!(result.intent.intent_type, IntentType::Respond);
        assert_eq!(result.confidence, 0.4);
        assert_eq!(result.alternative_intents.len(), 1);
        assert_eq!(
            result.alternative_intents[0].intent.intent_type,
            IntentType::Unknown
        );
    }
}
