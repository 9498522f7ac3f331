use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use studio_intent::config::{load_config, AppConfig, LoggingConfig};
use studio_intent::model::graph::{new_id, properties, Properties};
use studio_intent::model::intent::{Intent, IntentType, TranslationContext, TranslationResult};
use studio_intent::parse::{
    classify_command, classify_intent, domain_scores, extract_parameters, parse_style_command,
};
use studio_intent::server::{run_http_server, AppState};
use studio_intent::store::graph::{GraphStore, InMemoryGraphStore};
use studio_intent::store::seed::{intent_node_id, seed_concept_graph};
use studio_intent::translate::IntentTranslator;

/// studio-intent: turn free-text creative commands into typed intents
#[derive(Parser)]
#[command(name = "studio-intent")]
#[command(
    about = "Translate creative commands (\"draw a red circle\") into typed intents with confidence scores."
)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "STUDIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a command into an intent
    Translate {
        input: String,
        /// Strategy to use instead of the default
        #[arg(short, long, conflicts_with = "best")]
        strategy: Option<String>,
        /// Run every strategy and keep the most confident result
        #[arg(long)]
        best: bool,
        /// Earlier intent types, oldest first (e.g. draw.shape)
        #[arg(long = "recent")]
        recent: Vec<String>,
        /// Id of the selected asset node
        #[arg(long)]
        asset: Option<String>,
        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },
    /// Show domain scores and the scoring classifier's intent
    Classify { input: String },
    /// Extract parameters (colors, sizes, positions, ...)
    Extract { input: String },
    /// Parse an explicit style command ("set primary to #3b82f6")
    Style { input: String },
    /// List registered strategies
    Strategies,
    /// Walk through a scripted session against the seeded graph
    Demo,
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Translate {
            input,
            strategy,
            best,
            recent,
            asset,
            json,
        } => {
            let (translator, _graph) = build_services(&config).await?;
            let context = TranslationContext {
                recent_intents: recent_intents(&recent)?,
                selected_asset_id: asset,
            };

            let result = if best {
                translator.translate_with_best_strategy(&input, &context).await
            } else if let Some(name) = strategy.as_deref() {
                translator.translate_with_strategy(&input, name, &context).await?
            } else {
                translator.translate_intent(&input, &context).await
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Commands::Classify { input } => {
            println!("Domain: {}", classify_command(&input));
            for (domain, score) in domain_scores(&input) {
                println!("  {:<10} {}", domain.as_str(), score);
            }
            let intent = classify_intent(&input);
            println!(
                "Intent: {} ({:.2})",
                intent.intent_type, intent.confidence
            );
            if !intent.parameters.is_empty() {
                println!("Parameters: {}", serde_json::to_string(&intent.parameters)?);
            }
        }
        Commands::Extract { input } => {
            let params = extract_parameters(&input);
            if params.is_empty() {
                println!("No parameters found.");
            } else {
                println!("{}", serde_json::to_string_pretty(&params)?);
            }
        }
        Commands::Style { input } => match parse_style_command(&input) {
            Some(command) => println!("{}", serde_json::to_string_pretty(&command)?),
            None => println!("Not a style command."),
        },
        Commands::Strategies => {
            let (translator, _graph) = build_services(&config).await?;
            let default = translator.default_strategy();
            for name in translator.strategies() {
                let marker = if Some(name) == default { " (default)" } else { "" };
                println!("{}{}", name, marker);
            }
        }
        Commands::Demo => run_demo(&config).await?,
        Commands::Serve => {
            let (translator, graph) = build_services(&config).await?;
            run_http_server(&config.server, AppState::new(translator, graph)).await?;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn build_services(
    config: &AppConfig,
) -> anyhow::Result<(IntentTranslator, Arc<dyn GraphStore>)> {
    let graph: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::new());
    if config.translator.seed_graph {
        seed_concept_graph(graph.as_ref()).await?;
    }
    let translator = IntentTranslator::with_default_strategies(graph.clone(), &config.translator)?;
    Ok((translator, graph))
}

fn recent_intents(types: &[String]) -> anyhow::Result<Vec<Intent>> {
    types
        .iter()
        .map(|name| {
            let intent_type: IntentType = name.parse().map_err(|err: String| anyhow!(err))?;
            Ok(Intent::new(
                intent_type,
                intent_type.domain(),
                Properties::new(),
                1.0,
                name.as_str(),
            ))
        })
        .collect()
}

fn print_result(result: &TranslationResult) {
    println!(
        "Intent:     {} ({})",
        result.intent.intent_type, result.intent.domain
    );
    println!("Confidence: {:.2}", result.confidence);
    if let Some(strategy) = &result.strategy {
        println!("Strategy:   {}", strategy);
    }
    if !result.parameters.is_empty() {
        let params = serde_json::to_string(&result.parameters).unwrap_or_default();
        println!("Parameters: {}", params);
    }
    if !result.alternative_intents.is_empty() {
        println!("Alternatives:");
        for alt in &result.alternative_intents {
            println!("  {:.2}  {}", alt.confidence, alt.intent.intent_type);
        }
    }
    if !result.related_nodes.is_empty() {
        println!("Related nodes:");
        for node in &result.related_nodes {
            println!("  [{}] {}", node.node_type, node.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Demo (non-interactive walkthrough)
// ---------------------------------------------------------------------------

const DEMO_ASSET: &str = "asset:hero-banner";

const DEMO_SCRIPT: &[&str] = &[
    "hello",
    "draw a red circle in the top-left",
    "make it bigger",
    "paint a sunset behind it",
    "fade the title in over 2s",
    "add a navbar to the landing page",
];

async fn run_demo(config: &AppConfig) -> anyhow::Result<()> {
    println!("=== studio-intent demo ===\n");

    let (translator, graph) = build_services(config).await?;
    graph
        .create_node(
            DEMO_ASSET,
            "asset",
            properties([("name", "Hero banner"), ("domain", "website")]),
        )
        .await?;
    for intent_type in [IntentType::StyleApplyTheme, IntentType::WebsiteAddComponent] {
        let target = intent_node_id(intent_type);
        graph
            .create_relationship(
                &new_id(),
                DEMO_ASSET,
                &target,
                "uses",
                Properties::new(),
            )
            .await?;
    }
    info!(
        nodes = graph.node_count().await,
        relationships = graph.relationship_count().await,
        "demo graph ready"
    );

    let mut context = TranslationContext {
        recent_intents: Vec::new(),
        selected_asset_id: Some(DEMO_ASSET.to_string()),
    };

    for (step, input) in DEMO_SCRIPT.iter().enumerate() {
        println!("--- {}. \"{}\" ---", step + 1, input);
        let result = translator.translate_with_best_strategy(input, &context).await;
        print_result(&result);
        println!();
        context.recent_intents.push(result.intent);
    }

    println!("Strategies: {}", translator.strategies().join(", "));
    Ok(())
}
