#[macro_use]
mod error;
mod report;
mod runner;
mod scenarios;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fresh_engine::config::{ConfigLoader, FreshConfig, LoadedConfig};
use fresh_engine::fixtures::Fixtures;
use runner::Runner;
use scenarios::{Selection, Suite, Tag, catalogue};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SuiteArg {
    Index,
    Login,
    Reviews,
    Search,
    All,
}

impl SuiteArg {
    fn suite(self) -> Option<Suite> {
        match self {
            SuiteArg::Index => Some(Suite::Index),
            SuiteArg::Login => Some(Suite::Login),
            SuiteArg::Reviews => Some(Suite::Reviews),
            SuiteArg::Search => Some(Suite::Search),
            SuiteArg::All => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fresh", version, about = "End-to-end scenarios for the Fresh Reviews site")]
struct Args {
    /// Application base URL (overrides config and BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Config file (defaults to ./fresh.yaml, then ~/.fresh/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suite to run
    #[arg(long, value_enum, default_value_t = SuiteArg::All)]
    suite: SuiteArg,

    /// Only scenarios carrying this tag
    #[arg(long, value_enum)]
    tag: Option<Tag>,

    /// Only scenarios whose name contains this text
    #[arg(long)]
    name: Option<String>,

    /// Launch browsers in visible mode
    #[arg(long)]
    headed: bool,

    /// Scenarios running at the same time
    #[arg(long, default_value_t = 2)]
    workers: usize,

    /// Write a JSON report to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// List the selected scenarios and exit
    #[arg(long)]
    list: bool,
}

const EXIT_SETUP: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the listing and summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_SETUP)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let selection = Selection {
        suite: args.suite.suite(),
        tag: args.tag,
        name: args.name.clone(),
    };
    let selected = selection.apply(catalogue());

    if args.list {
        for s in &selected {
            let tags: Vec<String> = s.tags.iter().map(|t| t.to_string()).collect();
            println!("{:<8} {} {}", s.suite, s.name, tags.join(" "));
        }
        return Ok(0);
    }

    if selected.is_empty() {
        anyhow::bail!("no scenario matches the selection");
    }

    let config = load_config(&args).await?;
    runner::preflight(&config.base_url).await;

    let workers = args.workers;
    let runner = Runner::new(config, Fixtures::from_env(), workers);
    let report = runner.run(selected).await;

    println!("{}", report.summary());
    if let Some(path) = &args.output {
        report
            .write_json(path)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(report.exit_code())
}

/// File (or defaults), then environment, then command line.
async fn load_config(args: &Args) -> anyhow::Result<FreshConfig> {
    let LoadedConfig { mut config, source } = ConfigLoader::load(args.config.as_deref()).await?;

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.headed {
        config.headless = false;
    }
    config.validate()?;

    info!(
        base_url = %config.base_url,
        headless = config.headless,
        file = ?source,
        "configuration loaded"
    );
    Ok(config)
}
