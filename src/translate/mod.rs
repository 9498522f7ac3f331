use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslatorConfig;
use crate::error::{StudioError, StudioResult};
use crate::model::intent::{sort_by_confidence, AlternativeIntent, TranslationContext, TranslationResult};
use crate::store::graph::GraphStore;

pub mod context;
pub mod graph_enhanced;
pub mod pattern;

pub use context::ContextAwareStrategy;
pub use graph_enhanced::GraphEnhancedStrategy;
pub use pattern::PatternMatchingStrategy;

pub const PATTERN_MATCHING: &str = "pattern-matching";
pub const CONTEXT_AWARE: &str = "context-aware";
pub const GRAPH_ENHANCED: &str = "graph-enhanced";

/// Strategy names `with_default_strategies` registers, in registration order.
pub const BUILTIN_STRATEGIES: &[&str] = &[CONTEXT_AWARE, PATTERN_MATCHING, GRAPH_ENHANCED];

// ---------------------------------------------------------------------------
// TranslationStrategy trait
// ---------------------------------------------------------------------------

/// One way of turning free text into an intent.
///
/// Translation never fails: unmatched input yields a low-confidence intent,
/// and graph trouble is logged and skipped.
#[async_trait]
pub trait TranslationStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, input: &str, context: &TranslationContext) -> TranslationResult;
}

/// Run a graph lookup for `strategy`, absorbing errors and timeouts.
pub(crate) async fn guarded_lookup<T, F>(strategy: &str, timeout: Duration, lookup: F) -> Option<T>
where
    F: Future<Output = StudioResult<T>>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            warn!(strategy, error = %err, "graph lookup failed; continuing without context");
            None
        }
        Err(_) => {
            warn!(
                strategy,
                timeout_ms = timeout.as_millis() as u64,
                "graph lookup timed out; continuing without context"
            );
            None
        }
    }
}

// ---------------------------------------------------------------------------
// IntentTranslator: strategy registry and ranking
// ---------------------------------------------------------------------------

/// Registry of translation strategies.
///
/// Constructed explicitly and passed around; each instance owns its own
/// strategy list so tests can build isolated translators.
pub struct IntentTranslator {
    strategies: Vec<Arc<dyn TranslationStrategy>>,
    default_strategy: Option<String>,
    fallback: PatternMatchingStrategy,
}

impl Default for IntentTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentTranslator {
    /// An empty translator. Until something is registered, translation falls
    /// back to pattern matching.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            default_strategy: None,
            fallback: PatternMatchingStrategy::new(),
        }
    }

    /// Pattern matching only.
    pub fn simple() -> Self {
        let mut translator = Self::new();
        translator.register_strategy(Arc::new(PatternMatchingStrategy::new()));
        translator
    }

    /// All built-in strategies sharing `graph`, with the configured default.
    pub fn with_default_strategies(
        graph: Arc<dyn GraphStore>,
        config: &TranslatorConfig,
    ) -> StudioResult<Self> {
        let timeout = config.graph_query_timeout();
        let mut translator = Self::new();
        translator.register_strategy(Arc::new(ContextAwareStrategy::new(graph.clone(), timeout)));
        translator.register_strategy(Arc::new(PatternMatchingStrategy::new()));
        translator.register_strategy(Arc::new(GraphEnhancedStrategy::new(graph, timeout)));
        translator.set_default_strategy(&config.default_strategy)?;

        info!(
            strategies = ?translator.strategies(),
            default = %config.default_strategy,
            "intent translator ready"
        );
        Ok(translator)
    }

    /// Register a strategy. A strategy with the same name is replaced in
    /// place, keeping its registration slot. The first registration becomes
    /// the default unless one was set.
    pub fn register_strategy(&mut self, strategy: Arc<dyn TranslationStrategy>) {
        let name = strategy.name().to_string();
        match self.strategies.iter().position(|s| s.name() == name) {
            Some(idx) => self.strategies[idx] = strategy,
            None => self.strategies.push(strategy),
        }
        if self.default_strategy.is_none() {
            self.default_strategy = Some(name);
        }
    }

    pub fn set_default_strategy(&mut self, name: &str) -> StudioResult<()> {
        self.strategy(name)?;
        self.default_strategy = Some(name.to_string());
        Ok(())
    }

    pub fn default_strategy(&self) -> Option<&str> {
        self.default_strategy.as_deref()
    }

    /// Registered strategy names, in registration order.
    pub fn strategies(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn strategy(&self, name: &str) -> StudioResult<Arc<dyn TranslationStrategy>> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| StudioError::StrategyNotFound(name.to_string()))
    }

    /// Translate with the default strategy.
    pub async fn translate_intent(
        &self,
        input: &str,
        context: &TranslationContext,
    ) -> TranslationResult {
        let default = self
            .default_strategy
            .as_deref()
            .and_then(|name| self.strategy(name).ok());

        match default {
            Some(strategy) => strategy
                .translate(input, context)
                .await
                .with_strategy(strategy.name()),
            None => self
                .fallback
                .translate(input, context)
                .await
                .with_strategy(self.fallback.name()),
        }
    }

    /// Translate with a strategy picked by exact name.
    pub async fn translate_with_strategy(
        &self,
        input: &str,
        strategy_name: &str,
        context: &TranslationContext,
    ) -> StudioResult<TranslationResult> {
        let strategy = self.strategy(strategy_name)?;
        Ok(strategy
            .translate(input, context)
            .await
            .with_strategy(strategy.name()))
    }

    /// Run every strategy and keep the most confident result. The others
    /// become its alternatives, most confident first; equal confidences keep
    /// registration order.
    pub async fn translate_with_best_strategy(
        &self,
        input: &str,
        context: &TranslationContext,
    ) -> TranslationResult {
        if self.strategies.is_empty() {
            return self.translate_intent(input, context).await;
        }

        let runs = self.strategies.iter().map(|strategy| async move {
            strategy
                .translate(input, context)
                .await
                .with_strategy(strategy.name())
        });
        let mut results: Vec<TranslationResult> = join_all(runs).await;
        sort_by_confidence(&mut results, |r| r.confidence);

        let mut ranked = results.into_iter();
        let Some(mut best) = ranked.next() else {
            return self.translate_intent(input, context).await;
        };
        best.alternative_intents = ranked
            .map(|r| AlternativeIntent {
                intent: r.intent,
                confidence: r.confidence,
            })
            .collect();

        debug!(
            input = %input,
            winner = ?best.strategy,
            confidence = best.confidence,
            "best strategy selected"
        );
        best
    }

    /// Drop every registered strategy. Later calls fall back to pattern
    /// matching.
    pub fn dispose(&mut self) {
        info!(strategies = self.strategies.len(), "disposing intent translator");
        self.strategies.clear();
        self.default_strategy = None;
    }
}
