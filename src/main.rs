use agristack_analytics::config::{AppConfig, DataSource};
use agristack_analytics::intent::{IntentClassifier, QueryExtractor};
use agristack_analytics::query_plan::QueryPlanBuilder;
use agristack_analytics::region::RegionDirectory;
use agristack_analytics::security::authorize;
use agristack_analytics::AnalyticsAssistant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agristack")]
#[command(about = "Natural-language analytics over AgriStack survey data")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question and print the chart payload as JSON
    Ask {
        /// The question in natural language
        query: String,

        /// User's LGD region code (default: DEFAULT_USER_LGD or 27)
        #[arg(short, long)]
        region: Option<String>,

        /// Data source: csv or database (default: DATA_SOURCE or csv)
        #[arg(short, long)]
        source: Option<DataSource>,

        /// Directory holding <table>.csv files (default: DATA_DIR or ./data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Rewrite narration with the configured Ollama model
        #[arg(long)]
        narrate: bool,
    },
    /// Classify a question without touching data
    Classify {
        query: String,
    },
    /// Show the extracted descriptor and query plan for a question
    Plan {
        query: String,

        /// User's LGD region code (default: DEFAULT_USER_LGD or 27)
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;

    match args.command {
        Commands::Ask {
            query,
            region,
            source,
            data_dir,
            narrate,
        } => {
            if let Some(source) = source {
                config.data_source = source;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            config.narration.enabled |= narrate;
            let region = region.unwrap_or_else(|| config.default_user_region.clone());

            info!("Answering for region {} from {}", region, config.data_source.as_str());
            let assistant = AnalyticsAssistant::from_config(&config)?;
            let response = assistant.respond_or_error(&query, &region).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Classify { query } => {
            let result = IntentClassifier::new().classify(&query);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Plan { query, region } => {
            let region = region.unwrap_or_else(|| config.default_user_region.clone());
            let directory =
                RegionDirectory::load(config.state_lgd_csv.as_deref(), config.district_lgd_csv.as_deref())?;
            let descriptor = QueryExtractor::new(&directory).extract(&query);

            let output = match authorize(&descriptor, &region) {
                Ok(scope) if descriptor.paired_comparison.is_some() => {
                    let legs = QueryPlanBuilder::new().build_paired(&descriptor, &scope);
                    let previews: Vec<String> = legs.iter().map(|leg| leg.plan.sql_preview()).collect();
                    serde_json::json!({
                        "descriptor": descriptor,
                        "scope": scope,
                        "sql_preview": previews,
                        "legs": legs,
                    })
                }
                Ok(scope) => {
                    let plan = QueryPlanBuilder::new().build(&descriptor, &scope);
                    serde_json::json!({
                        "descriptor": descriptor,
                        "scope": scope,
                        "sql_preview": plan.as_ref().map(|p| p.sql_preview()),
                        "plan": plan,
                    })
                }
                Err(denied) => serde_json::json!({
                    "descriptor": descriptor,
                    "unauthorized": denied,
                    "message": denied.message(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
