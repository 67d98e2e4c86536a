mod portal;

use anyhow::Context;
use backtrace::Backtrace;
use bcf_core::commands::CommandRegistry;
use bcf_core::EngineConfig;
use clap::Parser;
use itertools::Itertools;
use portal::Session;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Interactive console for the portal network commands.
///
/// Each line is run as a command. A line starting with `?` prints the
/// completions for the rest of the line instead.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// TOML file with engine settings, created with defaults if missing
    #[arg(long)]
    config: Option<PathBuf>,
    /// Name the session runs commands as
    #[arg(long, default_value = "console")]
    player: String,
    /// Players considered online
    #[arg(long, value_delimiter = ',', default_value = "Steve,Alex")]
    online: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup logging
    let logfile = tracing_appender::rolling::daily("./logs", "bcf.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("BCF_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::new();
        error!("{}\n{:?}", panic_info, backtrace);
    }));

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let mut registry = CommandRegistry::with_config(config);
    portal::register_commands(&mut registry);

    let mut online = args.online;
    if !args.player.eq_ignore_ascii_case("console") && !online.contains(&args.player) {
        online.push(args.player.clone());
    }
    let session = Session::new(args.player, online);
    let commands = registry.commands().map(|c| c.name()).join(", ");
    info!("Ready. Commands: {}", commands);

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;

        if let Some(partial) = line.strip_prefix('?') {
            println!("{}", registry.complete(&session, partial).join(" "));
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let label = line.split_whitespace().next().unwrap_or_default();
        if registry.get(label).is_none() {
            println!("Unknown command: {label}");
            continue;
        }
        registry.execute(&session, &line);
        for reply in session.take_replies() {
            println!("{reply}");
        }
    }

    Ok(())
}
