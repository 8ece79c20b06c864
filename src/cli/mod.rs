//! The thriftstub command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! library functions: parsing, rendering and consistency checks.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{Command, DocumentFormat, StubArgs};
use crate::config::Config;
use crate::render::compose;
use crate::syntax::parser::{parse_with, recognize_named};
use crate::syntax::build;

pub mod args;
pub mod output;

/// Whether a command found something the user has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    Findings,
}

/// The main entry point for the CLI.
pub fn run() {
    let args = StubArgs::parse();
    init_tracing(args.verbose);

    match execute(args) {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::Findings) => process::exit(1),
        Err(report) => {
            output::print_report(&report);
            process::exit(1);
        }
    }
}

/// Runs a parsed command line.
pub fn execute(args: StubArgs) -> miette::Result<Outcome> {
    let config = load_config(&args)?;
    if !config.color {
        let _ = miette::set_hook(Box::new(|_| {
            Box::new(miette::MietteHandlerOpts::new().color(false).build())
        }));
    }

    match args.command {
        Command::Parse { file, format } => handle_parse(&config, &file, format),
        Command::Format { path, check, write } => handle_format(&config, &path, check, write),
        Command::Check { path } => handle_check(&config, &path),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(args: &StubArgs) -> miette::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.strict {
        config.strict = true;
    }
    if args.no_color {
        config.color = false;
    }
    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Expands `path` into the stub files to process, in a stable order.
fn collect_files(config: &Config, path: &Path) -> miette::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        if entry.file_type().is_file() && config.matches_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    debug!(count = files.len(), root = %path.display(), "collected stub files");
    Ok(files)
}

fn read_source(path: &Path) -> miette::Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}

fn handle_parse(config: &Config, file: &Path, format: DocumentFormat) -> miette::Result<Outcome> {
    let text = read_source(file)?;
    let report = parse_with(&text, &config.parse_options(file))?;
    let rendered = match format {
        DocumentFormat::Json => serde_json::to_string_pretty(&report.document).into_diagnostic()?,
        DocumentFormat::Yaml => serde_yaml::to_string(&report.document).into_diagnostic()?,
    };
    println!("{}", rendered.trim_end());
    Ok(Outcome::Clean)
}

fn handle_format(
    config: &Config,
    path: &Path,
    check: bool,
    write: bool,
) -> miette::Result<Outcome> {
    let files = collect_files(config, path)?;
    let banner = files.len() > 1 && !check && !write;
    let mut outcome = Outcome::Clean;

    for file in &files {
        let text = read_source(file)?;
        let document = match parse_with(&text, &config.parse_options(file)) {
            Ok(report) => report.document,
            Err(err) => {
                output::print_report(&miette::Report::new(err));
                outcome = Outcome::Findings;
                continue;
            }
        };
        let canonical = compose(&document);

        if check {
            if canonical != text {
                output::print_file_diff(file, &text, &canonical, config.color);
                outcome = Outcome::Findings;
            }
        } else if write {
            if canonical != text {
                fs::write(file, &canonical)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to write {}", file.display()))?;
                info!(file = %file.display(), "rewrote file");
            }
        } else {
            if banner {
                output::print_header(file, config.color);
            }
            print!("{}", canonical);
        }
    }
    Ok(outcome)
}

fn handle_check(config: &Config, path: &Path) -> miette::Result<Outcome> {
    let files = collect_files(config, path)?;
    let mut total = 0;
    let mut failed = false;

    for file in &files {
        let text = read_source(file)?;
        let name = file.display().to_string();
        // recognize + build directly: every finding is listed, even in strict mode
        let built = recognize_named(&text, &name).and_then(build);
        let report = match built {
            Ok(report) => report,
            Err(err) => {
                output::print_report(&miette::Report::new(err));
                failed = true;
                continue;
            }
        };
        for finding in &report.inconsistencies {
            output::print_finding(file, &text, finding);
        }
        total += report.inconsistencies.len();
    }

    if total > 0 {
        eprintln!(
            "{} inconsistenc{} in {} file(s)",
            total,
            if total == 1 { "y" } else { "ies" },
            files.len()
        );
    }
    if total > 0 || failed {
        Ok(Outcome::Findings)
    } else {
        Ok(Outcome::Clean)
    }
}
