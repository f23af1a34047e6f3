//! Augur CLI - 命令行交互接口

mod config;
mod demo;

use std::io::{self, BufRead, Write};

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ag_consensus::{ConsensusValidator, SourceVariant};
use ag_core::{RandomSource, SeededGenerator};
use ag_engine::Orchestrator;
use ag_synthesis::ResultAggregator;

use crate::config::AppConfig;
use crate::demo::{CastingOutNines, ClosedForm, IterativeReduction, Profile};

/// 组装好的流水线组件
struct Session {
    config: AppConfig,
    orchestrator: Orchestrator,
    aggregator: ResultAggregator,
    validator: ConsensusValidator,
}

impl Session {
    fn new(config: AppConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(config.orchestrator.clone()),
            aggregator: ResultAggregator::new(config.aggregator.clone()),
            validator: ConsensusValidator::new(config.consensus.clone()),
            config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let session = Session::new(config);

    println!("Augur CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("augur> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let command = parts[0];
        let args = &parts[1..];

        let result = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "draw" => draw(args),
            "key" => key(&session, args),
            "run" => run(&session, args).await,
            "validate" => validate(&session, args),
            "config" => {
                println!("{}", serde_json::to_string_pretty(&session.config)?);
                Ok(())
            }
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type 'help' for available commands.");
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!(command, error = %err, "command failed");
            println!("Error: {err}");
        }
    }

    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  help                   - Show this help message");
    println!("  draw <seed> [n]        - Print n values from the seeded generator");
    println!("  key <ns> <fields..>    - Derive a cache key");
    println!("  run <name> [date]      - Run the demo engines and print the aggregated result");
    println!("  validate <number>      - Cross-check digit-root variants");
    println!("  config                 - Show the active configuration");
    println!("  quit / exit            - Exit the CLI");
}

fn draw(args: &[&str]) -> anyhow::Result<()> {
    let Some(seed) = args.first() else {
        anyhow::bail!("usage: draw <seed> [n]");
    };
    let count = match args.get(1) {
        Some(n) => n.parse::<usize>()?,
        None => 5,
    };

    let mut generator = SeededGenerator::new(*seed);
    println!("seed '{}' (state {})", generator.seed(), generator.state());
    for i in 0..count {
        println!("  {i}: {:.6}", generator.next_f64());
    }
    Ok(())
}

fn key(session: &Session, args: &[&str]) -> anyhow::Result<()> {
    let Some((namespace, fields)) = args.split_first() else {
        anyhow::bail!("usage: key <namespace> <fields..>");
    };
    println!("{}", session.config.cache.derive(namespace, fields));
    Ok(())
}

async fn run(session: &Session, args: &[&str]) -> anyhow::Result<()> {
    let Some(name) = args.first() else {
        anyhow::bail!("usage: run <name> [date]");
    };
    let profile = Profile {
        name: name.to_string(),
        birth_date: args.get(1).map(|d| d.to_string()),
    };
    let cache_key = session
        .config
        .cache
        .derive(&session.config.namespace, &profile.key_fields());

    let outcomes = session.orchestrator.run(profile, &demo::engines()).await?;
    let result = session
        .aggregator
        .aggregate(&outcomes, Some(chrono::Utc::now()))
        .with_cache_key(cache_key);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn validate(session: &Session, args: &[&str]) -> anyhow::Result<()> {
    let Some(raw) = args.first() else {
        anyhow::bail!("usage: validate <number>");
    };
    let number: u64 = raw.parse()?;
    let variants: [&dyn SourceVariant<u64, u64>; 3] =
        [&IterativeReduction, &ClosedForm, &CastingOutNines];

    let report = session.validator.validate_variants(&number, &variants)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
