/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `layout-overrides`: apply JSONC override rules to a YAML layout.

use anyhow::{Context, Result};
use clap::Parser;
use layout_overrides::{DEFAULT_CHILD_KEY, OverrideEngine, OverrideOptions, RuleSet};
use layout_yaml::{dump_document, load_document, load_rules};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Rule file looked up in the working directory when `--overrides` is not given.
const DEFAULT_RULES_FILE: &str = "defaults.jsonc";

#[derive(Parser, Debug)]
#[command(name = "layout-overrides")]
#[command(version, about = "Apply override rules to a YAML layout document", long_about = None)]
struct Args {
    /// YAML layout to read (`-` or omitted for stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// JSONC rule file [default: defaults.jsonc if present]
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// Multiply `style.scale` of affected elements by this factor
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0, allow_negative_numbers = true)]
    scale: f64,

    /// Attribute that holds child elements
    #[arg(long, value_name = "KEY", default_value = DEFAULT_CHILD_KEY)]
    child_key: String,

    /// Where to write the result (`-` or omitted for stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "layout_overrides=info,layout_yaml=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let input = read_input(args.input.as_deref())?;
    if input.trim().is_empty() {
        tracing::info!("Empty input; nothing to do");
        return write_output(args.output.as_deref(), "");
    }

    let rules = read_rules(args.overrides.as_deref())?;

    let Some(mut document) = load_document(&input)? else {
        tracing::info!("Input has no YAML document; nothing to do");
        return write_output(args.output.as_deref(), "");
    };

    let options = OverrideOptions::default()
        .with_scale_factor(args.scale)
        .with_child_key(args.child_key);
    let engine = OverrideEngine::new(rules, options);
    let report = engine.apply(&mut document);

    tracing::info!(
        mode = ?report.mode,
        rules = engine.rules().len(),
        visited = report.elements_visited,
        matched = report.elements_matched,
        scaled = report.elements_scaled,
        "Overrides applied"
    );

    let text = dump_document(&document)?;
    write_output(args.output.as_deref(), &text)
}

/// `None` for stdin/stdout, which is also what `-` means.
fn file_arg(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.as_os_str() != "-")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match file_arg(path) {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            Ok(text)
        }
    }
}

/// Load the rule set.
///
/// A missing default rule file means no rules; a missing file named on the
/// command line is an error.
fn read_rules(path: Option<&Path>) -> Result<RuleSet> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read overrides file: {}", path.display()))?,
        None => match fs::read_to_string(DEFAULT_RULES_FILE) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    file = DEFAULT_RULES_FILE,
                    error = %err,
                    "Could not load default rules; no rules applied"
                );
                String::new()
            }
        },
    };
    Ok(load_rules(&text)?)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match file_arg(path) {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write standard output")
        }
    }
}
