use anyhow::{Context, Result};
use clap::Parser;
use loadtester::cli::Args;
use loadtester::{run_load_test, HttpClient};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter());
    let config = args
        .to_config()
        .context("Invalid load test configuration")?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = args.threads {
        builder.worker_threads(usize::from(threads));
    }
    let rt = builder.build().context("Failed to build tokio runtime")?;
    let _guard = rt.enter();
    let client = HttpClient::new().context("Failed to build http client")?;
    let report = rt.block_on(run_load_test(&config, client))?;
    print!("{report}");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
