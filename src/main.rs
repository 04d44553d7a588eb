//! Medir CLI - endpoint latency comparison harness
//!
//! # Commands
//!
//! - `budgets` - Compare thinking budgets over the financial questions
//! - `caching` - Compare uncached vs cache-write vs cache-read passes
//! - `combined` - Compare standard, thinking, caching, and combined profiles
//! - `agent` - Run one bounded tool-use conversation

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use medir::agent::{AgentLoop, Calculator};
use medir::config::{ProfileConfig, DEFAULT_MODEL};
use medir::error::{MedirError, Result};
use medir::fixtures::{document_qa_inputs, financial_question_inputs, SAMPLE_DOCUMENT};
use medir::harness::{Harness, HarnessConfig};
use medir::input::NamedInput;
use medir::{Adapter, MessageAdapter};

/// Environment variable holding the API key
const API_KEY_VAR: &str = "MEDIR_API_KEY";

/// Medir - measure endpoint configurations against each other
///
/// Compares named call configurations (thinking budgets, prompt caching) over
/// fixed input sets, reporting latency statistics per pair.
#[derive(Parser)]
#[command(name = "medir")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every comparison subcommand
#[derive(Args, Clone)]
struct RunArgs {
    /// Endpoint base URL
    #[arg(long, default_value = "https://api.anthropic.com")]
    base_url: String,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Repeats per (profile, input) pair
    #[arg(short, long, default_value = "1")]
    repeats: usize,

    /// Fixed pause between successive calls, in seconds (0 = none)
    #[arg(long, default_value = "0")]
    delay_secs: u64,

    /// Read timeout override in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Print per-call progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare thinking budgets over the financial questions
    ///
    /// Examples:
    ///   medir budgets --repeats 3
    ///   medir budgets --delay-secs 30 --format json
    Budgets {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Compare uncached vs cache-write vs cache-read over document Q&A
    ///
    /// The cache-write pass runs before the cache-read pass, so the second
    /// cached profile hits a warm prompt cache on the endpoint.
    Caching {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Compare standard, thinking-only, caching-only, and optimal profiles
    Combined {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Run one bounded tool-use conversation with the calculator tool
    ///
    /// Examples:
    ///   medir agent "What is 500000 * 0.045 / 12?"
    Agent {
        /// Question to answer
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Maximum loop iterations (each issues one outbound call)
        #[arg(long, default_value = "5")]
        max_iterations: usize,

        #[command(flatten)]
        args: RunArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Budgets { args } => {
            let profiles = vec![
                ProfileConfig::standard(),
                ProfileConfig::fast_thinking(),
                ProfileConfig::balanced_thinking(),
                ProfileConfig::deep_thinking(),
            ];
            run_comparison(profiles, &financial_question_inputs(), &args)?;
        },
        Commands::Caching { args } => {
            // Adapter order matters: cache-write warms the endpoint's prompt
            // cache before cache-read runs.
            let profiles = vec![
                ProfileConfig::standard().with_name("no-cache"),
                ProfileConfig::cached().with_name("cache-write"),
                ProfileConfig::cached().with_name("cache-read"),
            ];
            run_comparison(profiles, &document_qa_inputs(SAMPLE_DOCUMENT), &args)?;
        },
        Commands::Combined { args } => {
            let profiles = vec![
                ProfileConfig::standard(),
                ProfileConfig::balanced_thinking(),
                ProfileConfig::cached(),
                ProfileConfig::optimal(),
            ];
            run_comparison(profiles, &document_qa_inputs(SAMPLE_DOCUMENT), &args)?;
        },
        Commands::Agent {
            question,
            max_iterations,
            args,
        } => {
            run_agent(&question, max_iterations, &args)?;
        },
    }

    Ok(())
}

/// Resolve the API key; missing credentials abort before any invocation
fn api_key() -> Result<String> {
    std::env::var(API_KEY_VAR).map_err(|_| {
        MedirError::MissingCredentials(format!("set {API_KEY_VAR} to your API key"))
    })
}

/// Build one adapter, applying CLI overrides and surfacing config corrections
fn build_adapter(profile: ProfileConfig, args: &RunArgs, key: &str) -> Result<MessageAdapter> {
    let mut profile = profile.with_model(&args.model);
    if let Some(secs) = args.timeout_secs {
        profile = profile.with_timeout_secs(secs);
    }

    let adapter = MessageAdapter::new(profile, &args.base_url, key)?;
    for warning in adapter.warnings() {
        eprintln!("warning [{}]: {warning}", adapter.profile().name);
    }
    Ok(adapter)
}

fn run_comparison(
    profiles: Vec<ProfileConfig>,
    inputs: &[NamedInput],
    args: &RunArgs,
) -> Result<()> {
    let key = api_key()?;

    let mut adapters: Vec<Box<dyn Adapter>> = Vec::with_capacity(profiles.len());
    for profile in profiles {
        adapters.push(Box::new(build_adapter(profile, args, &key)?));
    }

    let mut config = HarnessConfig::default()
        .with_repeats(args.repeats)
        .with_verbose(args.verbose);
    if args.delay_secs > 0 {
        config = config.with_delay(Duration::from_secs(args.delay_secs));
    }

    let table = Harness::new(config).run(&adapters, inputs);

    match args.format.as_str() {
        "json" => println!("{}", table.to_json()?),
        _ => print!("{}", table.to_markdown_table()),
    }

    Ok(())
}

fn run_agent(question: &str, max_iterations: usize, args: &RunArgs) -> Result<()> {
    let key = api_key()?;
    let adapter = build_adapter(ProfileConfig::standard().with_max_tokens(2048), args, &key)?;

    let agent = AgentLoop::new(&adapter, vec![Box::new(Calculator)], max_iterations);
    let outcome = agent.run(question);

    println!("{}", outcome.final_text);
    println!(
        "\n({} iterations, {} tool calls, {:.2}s{}{})",
        outcome.iterations,
        outcome.tool_calls,
        outcome.total_secs,
        if outcome.hit_cap {
            ", iteration cap reached"
        } else {
            ""
        },
        if outcome.failed { ", call failed" } else { "" },
    );

    Ok(())
}
