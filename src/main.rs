use clap::Parser;
use clap::Subcommand;
use estaterag::config::AppConfig;
use estaterag::ingest::IngestService;
use estaterag::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "estaterag")]
#[command(about = "Natural-language property search over a listing warehouse")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Enable CORS for browser clients
        #[arg(long)]
        cors: bool,
    },
    /// Run the warehouse-to-store batch pipeline
    Ingest {
        /// Override the insert batch size
        #[arg(long)]
        batch_size: Option<usize>,
        /// Cap the number of source rows (useful for smoke runs)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show current configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    estaterag::logging::init_logging(Some(&config))?;
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let enable_cors = cors || config.server.enable_cors;
            estaterag::api::serve_api(&config, host, port, enable_cors).await?;
        }
        Commands::Ingest { batch_size, limit } => {
            if let Some(batch_size) = batch_size {
                config.ingest.batch_size = batch_size;
            }
            let service = IngestService::from_config(&config)?;
            let report = service.run(limit).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Config => {
            println!("{}", config.redacted_toml()?);
        }
    }

    Ok(())
}
