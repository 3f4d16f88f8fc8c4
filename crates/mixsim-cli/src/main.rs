//! mixsim command-line interface.

mod circuit;
mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use mixsim_core::{Scalar, SparsePattern, ValueType, units};
use mixsim_model::{SetupConfig, setup_models};
use mixsim_parser::{Lexer, parse_value};

use crate::circuit::CircuitFile;
use crate::report::render_report;

#[derive(Parser)]
#[command(name = "mixsim")]
#[command(about = "Code-model setup for mixed-signal circuits", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Circuit description (JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Setup configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one parameter value and print its canonical form
    Value {
        /// Declared type, e.g. `real` or `int[]`
        #[arg(value_name = "TYPE")]
        ty: String,
        /// Value text as written on a model card
        text: String,
    },
    /// List the built-in event node types
    Types,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .format_timestamp(None)
        .init();

    match (&cli.command, &cli.input) {
        (Some(Command::Value { ty, text }), _) => run_value(ty, text),
        (Some(Command::Types), _) => run_types(),
        (None, Some(input)) => run_setup(input, cli.config.as_deref()),
        (None, None) => {
            println!("mixsim - mixed-signal code-model setup");
            println!();
            println!("Usage: mixsim <circuit.json> [options]");
            println!("       mixsim value <TYPE> <TEXT>");
            println!("       mixsim types");
            println!();
            println!("Options:");
            println!("  -c, --config <FILE>  Setup configuration (JSON)");
            println!("  -v, --verbose        Verbose output");
            println!("  -h, --help           Show help");
            println!("  -V, --version        Show version");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SetupConfig> {
    let Some(path) = path else {
        return Ok(SetupConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid setup config: {}", path.display()))
}

fn run_setup(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    log::debug!("setup config: {config:?}");

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read circuit: {}", input.display()))?;
    let mut circuit = CircuitFile::from_json(&content)?.build()?;

    let mut matrix = SparsePattern::new();
    let summary = setup_models(
        &mut circuit.models,
        &mut matrix,
        &mut circuit.equations,
        &config,
    )
    .context("Setup failed")?;

    print!("{}", render_report(&circuit, &summary, &matrix));
    Ok(())
}

fn run_value(ty: &str, text: &str) -> Result<()> {
    let ty: ValueType = ty.parse()?;
    let mut lexer = Lexer::new(text);
    let value = parse_value(&mut lexer, ty)
        .and_then(|value| lexer.finish().map(|()| value))
        .map_err(|e| anyhow!("{text}: {e}"))?;

    match value.elements() {
        [Scalar::Real(r)] if !ty.is_array => println!("{value}  ({})", units::format_value(*r)),
        _ => println!("{value}"),
    }
    Ok(())
}

fn run_types() -> Result<()> {
    let registry = mixsim_events::global();
    for (index, node_type) in registry.iter().enumerate() {
        println!("{index:>3}  {:<10} {}", node_type.name(), node_type.description());
    }
    Ok(())
}
