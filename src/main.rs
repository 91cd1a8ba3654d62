use anyhow::{bail, Result};
use clap::Parser;
use eiascraper::{
    config::{self, Config},
    fetch::{self, Source},
    pipeline,
};
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Download raw Henry Hub spot prices and EIA fundamentals tables"
)]
struct Args {
    /// Output directory; defaults to <project root>/data/raw
    #[arg(long, env = "EIASCRAPER_RAW_DIR")]
    raw_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Only fetch these sources (repeatable), e.g. `--source T01.11`
    #[arg(long = "source", value_name = "ID")]
    sources: Vec<String>,

    /// Print the configured sources and exit
    #[arg(long)]
    list: bool,

    /// Print the run summary as JSON when done
    #[arg(long)]
    json: bool,
}

fn select_sources(wanted: &[String]) -> Result<Vec<Source>> {
    let all = fetch::default_sources();
    if wanted.is_empty() {
        return Ok(all);
    }
    for id in wanted {
        if !all.iter().any(|s| &s.id == id) {
            let known: Vec<_> = all.iter().map(|s| s.id.as_str()).collect();
            bail!("unknown source {:?} (known: {})", id, known.join(", "));
        }
    }
    Ok(all.into_iter().filter(|s| wanted.contains(&s.id)).collect())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // keep stdout clean for the JSON summary
    let writer = if args.json {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(writer)
        .init();

    let sources = select_sources(&args.sources)?;

    if args.list {
        for s in &sources {
            println!("{:<18} {:<48} {}", s.id, s.filename, s.url);
        }
        return Ok(());
    }

    let raw_dir = match args.raw_dir {
        Some(dir) => dir,
        None => config::default_raw_dir()?,
    };
    let config = Config::new(raw_dir)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_user_agent(args.user_agent);

    info!("Saving data to: {}", config.raw_dir.display());
    let client = fetch::build_client(&config)?;
    let summary = pipeline::run(&client, &config, &sources);

    if summary.all_ok() {
        info!(sources = summary.succeeded.len(), "Download pipeline complete");
    } else {
        warn!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "Download pipeline complete with failures"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    // best effort: per-source failures are logged above and do not change the exit code
    Ok(())
}
