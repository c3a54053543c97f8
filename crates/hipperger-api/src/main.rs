//! Main entry point for the hipperger API

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use hipperger_api::{config::Config, server::Server};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "hipperger-api",
    about = "Auth0 login forwarder and JWT gatekeeper",
    version,
    author
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate example configuration file
    #[arg(long)]
    gen_config: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.gen_config {
        println!("{}", Config::generate_example()?);
        return Ok(());
    }

    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let config = Config::load(args.config.as_deref())?;

    let log_filter = format!("{}=info", env!("CARGO_BIN_NAME").replace('-', "_"));
    hipperger_common::logging::init_logging(&args.verbosity, &log_filter, config.server.log_json)?;

    info!("Starting hipperger API v{}", hipperger_api::VERSION);
    info!(
        "Configuration loaded, binding to {}",
        config.server.bind_address
    );

    let server = Server::new(config).await?;

    match server.run().await {
        Ok(()) => {
            info!("hipperger API shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("hipperger API error: {}", e);
            Err(e.into())
        }
    }
}
