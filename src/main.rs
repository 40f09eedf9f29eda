//! CLI entry point for pear-rs

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pear-rs")]
#[command(version)]
#[command(about = "Build a static blog from Markdown posts and a Tera theme", long_about = None)]
struct Cli {
    /// Configuration file (defaults to _config.yml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "pear_rs=debug,info"
    } else {
        "pear_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let pear = match cli.config {
        Some(path) => pear_rs::Pear::from_config_file(&path)?,
        None => {
            let base_dir = std::env::current_dir().context("Failed to read current directory")?;
            pear_rs::Pear::new(&base_dir)?
        }
    };

    tracing::info!("Building site from {:?}", pear.base_dir);
    let report = pear.build()?;
    println!(
        "Generated {} posts into {:?} in {:.2}s",
        report.posts,
        pear.output_dir,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}
