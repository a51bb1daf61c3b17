use std::sync::Arc;

use clap::Parser;
use tracing::info;

use ainews_core::config::PipelineConfig;
use ainews_core::types::PipelineArgs;
use ainews_core::Result;
use ainews_extractors::export;
use ainews_extractors::fetch;
use ainews_extractors::pipeline::{self, Pipeline};
use ainews_extractors::StrategyRegistry;
use ainews_storage::{create_store, DedupSink};
use ainews_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend for the news table (memory, sqlite)
    #[arg(long, default_value = "sqlite")]
    storage: String,
    /// Path of the sqlite database file
    #[arg(long)]
    db_path: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the extraction pipeline and export the results
    Extract {
        /// Comma-separated feed urls. Defaults to the configured publishers.
        #[arg(long, value_delimiter = ',')]
        feeds: Option<Vec<String>>,
        /// Comma-separated case-sensitive keywords
        #[arg(long, value_delimiter = ',')]
        case_sen_kw: Option<Vec<String>>,
        /// Comma-separated case-insensitive keywords
        #[arg(long, value_delimiter = ',')]
        case_insen_kw: Option<Vec<String>>,
        /// Maximum article age in days
        #[arg(long)]
        max_days_old: Option<u32>,
        /// Destination spreadsheet (.xlsx)
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        sheet_name: Option<String>,
        #[arg(long)]
        table_name: Option<String>,
        /// Persist rows but skip the spreadsheet export
        #[arg(long)]
        skip_export: bool,
    },
    /// List registered publishers
    List,
    /// Serve the extraction API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env();
    let registry = Arc::new(StrategyRegistry::with_known_publishers());
    let client = fetch::http_client();

    match cli.command {
        Commands::Extract {
            feeds,
            case_sen_kw,
            case_insen_kw,
            max_days_old,
            output,
            sheet_name,
            table_name,
            skip_export,
        } => {
            if let Some(feeds) = feeds {
                config.feed_urls = feeds;
            }
            if let Some(path) = output {
                config.export_path = path;
            }
            if let Some(sheet) = sheet_name {
                config.sheet_name = sheet;
            }
            if let Some(table) = table_name {
                config.table_name = table;
            }

            let mut args = PipelineArgs::default();
            if let Some(keywords) = case_sen_kw {
                args.case_sen_search_kw = keywords;
            }
            if let Some(keywords) = case_insen_kw {
                args.case_insen_search_kw = keywords;
            }
            if let Some(days) = max_days_old {
                args.max_days_old = days;
            }

            let store = create_store(&cli.storage, cli.db_path.as_deref()).await?;
            let pipeline = Pipeline::new(client, registry, DedupSink::new(store), config.clone());

            info!("Starting AI news retrieval process...");
            let articles = pipeline.run(&args).await?;
            info!("{} articles matched the filters", articles.len());

            if articles.is_empty() {
                info!("There are no news to save into an excel file");
            } else if !skip_export {
                info!(
                    "Storing {} news into an Excel file...",
                    articles.len()
                );
                let rows = pipeline::render_rows(&articles, &config.date_string_format);
                export::write_table(
                    &config.export_path,
                    &config.sheet_name,
                    &config.table_name,
                    &pipeline::EXPORT_HEADERS,
                    &rows,
                )?;
                info!("AI news successfully stored in {}", config.export_path);
            }
        }
        Commands::List => {
            println!("Registered publishers:");
            for (origin, publisher) in registry.publishers() {
                println!("  - {} ({})", publisher, origin);
            }
        }
        Commands::Serve { addr } => {
            let store = create_store(&cli.storage, cli.db_path.as_deref()).await?;
            let pipeline = Pipeline::new(client, registry, DedupSink::new(store), config);
            let app = ainews_web::create_app(AppState { pipeline }).await;

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Listening on {}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
