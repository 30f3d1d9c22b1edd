use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tl_ledger::{HashAlgorithm, Ledger, Record};
use tl_server::{ServerConfig, TracklineServer};

use crate::cli::*;
use crate::demo;
use crate::render;
use crate::track::TrackSession;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Track(args) => cmd_track(&config, args, cli.format),
        Command::Demo(args) => cmd_demo(&config, args, cli.format),
        Command::Verify(args) => cmd_verify(args, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(max) = args.max_sessions {
        config.max_sessions = max;
    }
    if let Some(algorithm) = args.algorithm {
        config.hash_algorithm = algorithm;
    }
    println!(
        "Trackline server on {} ({})",
        config.bind_addr.to_string().bold(),
        config.hash_algorithm
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(TracklineServer::new(config).serve())?;
    Ok(())
}

fn cmd_track(config: &ServerConfig, args: TrackArgs, format: OutputFormat) -> anyhow::Result<()> {
    let algorithm = args.algorithm.unwrap_or(config.hash_algorithm);
    let stdin = io::stdin();
    let mut session = TrackSession::new(Ledger::with_algorithm(algorithm), io::stdout(), format);
    session.run(stdin.lock())?;
    let ledger = session.ledger();
    tracing::info!(records = ledger.len(), valid = ledger.validate(), "tracking session ended");
    Ok(())
}

fn cmd_demo(config: &ServerConfig, args: DemoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let scenarios = demo::run_scenarios(&args.package_id, config.hash_algorithm)?;
    let failed = scenarios.iter().filter(|s| !s.passed()).count();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
    } else {
        for s in &scenarios {
            let mark = if s.passed() { "✓".green().bold() } else { "✗".red().bold() };
            let verdict = if s.valid { "valid".green() } else { "invalid".red() };
            println!(
                "{} {:<7} {} records, {}  {}",
                mark,
                s.name.bold(),
                s.record_count,
                verdict,
                s.description.dimmed()
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} demo scenario(s) did not behave as expected");
    }
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let ledger = parse_export(&text, args.algorithm)?;
    let report = ledger.report();

    let mut out = io::stdout().lock();
    render::render_report(&mut out, &report, format)?;
    out.flush()?;

    if !report.valid {
        anyhow::bail!("chain integrity check failed for {}", args.path.display());
    }
    Ok(())
}

/// Accepts a bare array of records or a rendered chain (`{"records": [...]}`).
fn parse_export(text: &str, algorithm: HashAlgorithm) -> anyhow::Result<Ledger> {
    let mut value: serde_json::Value = serde_json::from_str(text).context("parsing chain JSON")?;
    if let Some(records) = value.get_mut("records") {
        value = records.take();
    }
    let records: Vec<Record> = serde_json::from_value(value).context("decoding records")?;
    Ok(Ledger::from_records(records, algorithm)?)
}
