use std::path::PathBuf;

use clap::Parser;
use fanquery::{FanOutRunner, RunnerConfig, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fanquery")]
#[command(about = "Run concurrent find-all queries over copies of one pooled session", long_about = None)]
struct Args {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of concurrent queries, overriding the configuration
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanquery=info,fanquery_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    let concurrency = config.concurrency;

    let runner = match FanOutRunner::<Session>::initialize(config).await {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!("CreateSession: {}", e);
            return Err(e.into());
        }
    };

    runner.run(concurrency).await;
    Ok(())
}
