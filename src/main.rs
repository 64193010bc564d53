use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cat_facts::client::{build_http_client, FactClient, FactSource, ImageClient};
use cat_facts::config::AppConfig;
use cat_facts::db::{CounterStore, Database, MemoryStore};
use cat_facts::feedback::FeedbackRecorder;
use cat_facts::reveal::{RevealController, FACT_ERROR_TEXT};
use cat_facts::terminal;

#[derive(Parser)]
#[command(name = "cat-facts")]
#[command(about = "A random cat fact, a cat picture if you ask, and a tally of what you liked")]
struct Cli {
    /// Fact endpoint URL
    #[arg(long, global = true)]
    fact_url: Option<String>,

    /// Image endpoint URL
    #[arg(long, global = true)]
    image_url: Option<String>,

    /// Tally database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive fact / image / feedback loop
    Play {
        /// Write each revealed image into this directory
        #[arg(long)]
        image_dir: Option<PathBuf>,
    },
    /// Fetch and print a single fact
    Fact,
    /// Print the feedback tally
    Tally,
    /// Zero the feedback tally
    Reset,
    /// Print the effective configuration
    Config {
        /// Also write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing to stderr so the screen on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cat_facts=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

impl Cli {
    fn config(&self) -> AppConfig {
        let mut config = AppConfig::load();
        if let Some(url) = &self.fact_url {
            config.fact_url = url.clone();
        }
        if let Some(url) = &self.image_url {
            config.image_url = url.clone();
        }
        if let Some(path) = &self.db {
            config.database_path = Some(path.clone());
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = Some(secs);
        }
        config
    }
}

/// Open the tally database, counting in memory for this run if that fails.
fn open_store(config: &AppConfig) -> Arc<dyn CounterStore> {
    let opened = match &config.database_path {
        Some(path) => Database::open(path.clone()),
        None => Database::open_default(),
    }
    .and_then(|database| database.migrate().map(|_| database));

    match opened {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::warn!("Tally database unavailable, counting in memory: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.config();
    let recorder = || FeedbackRecorder::new(open_store(&config));

    match cli.command.unwrap_or(Commands::Play { image_dir: None }) {
        Commands::Play { image_dir } => {
            let http = build_http_client(config.request_timeout())?;
            let facts = Arc::new(FactClient::new(&config.fact_url, http.clone()));
            let images = Arc::new(ImageClient::new(&config.image_url, http));
            let controller = Arc::new(RevealController::new(facts, images, recorder()));

            terminal::run(
                controller,
                BufReader::new(tokio::io::stdin()),
                std::io::stdout(),
                image_dir,
            )
            .await?;
        }
        Commands::Fact => {
            let http = build_http_client(config.request_timeout())?;
            let facts = FactClient::new(&config.fact_url, http);
            match facts.fetch_fact().await {
                Ok(fact) => println!("{}", fact.text),
                Err(_) => println!("{}", FACT_ERROR_TEXT),
            }
        }
        Commands::Tally => {
            println!("{}", recorder().tally());
        }
        Commands::Reset => {
            println!("{}", recorder().reset());
        }
        Commands::Config { save } => {
            println!("{}", config.to_json()?);
            if save {
                let path = config.save()?;
                tracing::info!("Saved config to {}", path.display());
            }
        }
    }

    Ok(())
}
