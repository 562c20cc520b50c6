//! Stitchguard - screen marketplace text for off-platform payment details.
//!
//! Operator front end for the content filter:
//! - `check` classifies text and exits non-zero when it is blocked
//! - `mask` replaces card, account and phone numbers with a placeholder
//! - `rules` lists the active rule table

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stitchguard_core::{
    ClassificationResult, ContentFilter, FilterConfig, Preset, RuleSet,
};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Stitchguard - screen marketplace text for off-platform payment details
#[derive(Parser, Debug)]
#[command(name = "stitchguard", version, about)]
struct Args {
    /// Filter config file (JSON). Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Block every digit, as the strict chat policy does
    #[arg(long, global = true)]
    strict: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify text (argument or stdin); exit code 1 when blocked
    Check {
        /// Text to check. Read from stdin when omitted.
        text: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print text with sensitive numbers replaced
    Mask {
        /// Text to mask. Read from stdin when omitted.
        text: Option<String>,
    },
    /// List the active rules
    Rules {
        /// Print the rule set as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One row of `rules` output.
#[derive(Serialize)]
struct RuleRow<'a> {
    id: &'a str,
    category: &'a str,
    severity: &'a str,
    enabled: bool,
    skipped: Option<String>,
}

/// Initialize logging to stderr, plus an optional rolling file.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if args.debug { "debug" } else { &args.log_level };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stitchguard={level},stitchguard_core={level},warn",
            level = log_level
        ))
    });

    if let Some(log_dir) = &args.log_dir {
        if std::fs::create_dir_all(log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("stitchguard")
                .filename_suffix("log")
                .build(log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_writer(io::stderr))
                    .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                    .init();

                tracing::info!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .init();
        tracing::warn!("File logging unavailable in {:?}, using stderr only", log_dir);
        return None;
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
    None
}

/// Load the config and apply command-line overrides.
fn load_config(config: Option<&Path>, strict: bool) -> anyhow::Result<FilterConfig> {
    let mut config =
        FilterConfig::load_or_default(config).context("Failed to load filter config")?;
    if strict {
        config.preset = Preset::Strict;
    }
    Ok(config)
}

/// Use the argument if given, otherwise read all of stdin.
fn input_text(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        tracing::info!("Reading text from stdin (end with Ctrl-D)");
    }
    let mut buf = String::new();
    stdin
        .lock()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

fn print_verdict(result: &ClassificationResult) {
    match (&result.matched_category, &result.message) {
        (Some(category), Some(message)) => {
            println!("blocked ({})", category);
            println!("{}", message);
        }
        _ => println!("allowed"),
    }

    for warning in result.warnings() {
        println!(
            "warning: {} matched {:?} ({})",
            warning.rule_id, warning.matched_text, warning.category
        );
    }
}

/// Pair each rule with the reason the filter skipped it, if any.
///
/// `filter` must be compiled from `rules`.
fn rule_rows<'a>(rules: &'a RuleSet, filter: &ContentFilter) -> Vec<RuleRow<'a>> {
    rules
        .rules
        .iter()
        .enumerate()
        .map(|(position, rule)| RuleRow {
            id: &rule.id,
            category: rule.category.as_str(),
            severity: rule.severity.name(),
            enabled: rule.enabled,
            skipped: filter
                .compiled()
                .skipped_rule(position)
                .map(|e| e.to_string()),
        })
        .collect()
}

fn print_rules(rules: &RuleSet, filter: &ContentFilter, json: bool) -> anyhow::Result<()> {
    let rows = rule_rows(rules, filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in rows {
        let state = match (&row.skipped, row.enabled) {
            (Some(_), _) => "skipped",
            (None, true) => "on",
            (None, false) => "off",
        };
        println!(
            "{:<24} {:<20} {:<6} {}",
            row.id, row.category, row.severity, state
        );
        if let Some(reason) = row.skipped {
            println!("    {}", reason);
        }
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = load_config(args.config.as_deref(), args.strict)?;
    let filter = ContentFilter::from_config(&config);

    if !filter.compiled().errors().is_empty() {
        tracing::warn!(
            "{} rule(s) skipped; see `stitchguard rules`",
            filter.compiled().errors().len()
        );
    }

    match args.command {
        Command::Check { text, json } => {
            let text = input_text(text)?;
            let result = filter.classify(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_verdict(&result);
            }

            Ok(if result.is_allowed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Mask { text } => {
            let text = input_text(text)?;
            print!("{}", filter.filter_mask(&text));
            if !text.ends_with('\n') {
                println!();
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Rules { json } => {
            print_rules(&config.rule_set(), &filter, json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&args);

    tracing::debug!("Args: {:?}", args);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
