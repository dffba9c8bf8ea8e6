//! Calibration flag resolution CLI.
//!
//! Reads an exposure header snapshot, checks every requested step's reference
//! files, and exits with a code telling the calibration driver whether to
//! proceed, stop for missing files, or skip the exposure.

use std::path::PathBuf;

use anyhow::{Context, Result};
use calgate::check::{CheckRequest, check_from_paths, parse_override, requested_switches};
use calgate::core::types::Step;
use calgate::exit_codes;
use calgate::io::config::DEFAULT_CONFIG_FILE;
use calgate::io::report::{detector_label, write_report};
use calgate::logging;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "calgate",
    version,
    about = "Resolve calibration switches against reference files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate reference files for the requested steps and report the outcome.
    Check {
        /// Exposure header snapshot (JSON).
        header: PathBuf,
        /// Resolver configuration (TOML). Defaults apply when the file is missing.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Request these steps even when the header omits them.
        #[arg(long = "perform", value_name = "STEP")]
        perform: Vec<Step>,
        /// Only consider these steps (e.g. `biascorr`); others are omitted.
        #[arg(long = "only", value_name = "STEP")]
        only: Vec<Step>,
        /// Replace a header reference name, e.g. `BIASFILE=jref$x_bia.fits`.
        #[arg(long = "ref", value_name = "KEYWORD=NAME")]
        refs: Vec<String>,
        /// Print the report as JSON instead of summary lines.
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the detector and requested switches read from the header.
    Switches {
        /// Exposure header snapshot (JSON).
        header: PathBuf,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check {
            header,
            config,
            perform,
            only,
            refs,
            json,
            output,
        } => cmd_check(header, config, perform, only, &refs, json, output),
        Command::Switches { header } => cmd_switches(header),
    }
}

fn cmd_check(
    header_path: PathBuf,
    config_path: PathBuf,
    perform: Vec<Step>,
    only: Vec<Step>,
    refs: &[String],
    json: bool,
    output: Option<PathBuf>,
) -> Result<i32> {
    let overrides = refs
        .iter()
        .map(String::as_str)
        .map(parse_override)
        .collect::<Result<Vec<_>>>()?;
    let request = CheckRequest {
        header_path,
        config_path,
        perform,
        only,
        overrides,
    };
    let report = check_from_paths(&request)?;

    if let Some(path) = &output {
        write_report(path, &report)?;
    }
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        for line in report.summary_lines() {
            println!("{}", line);
        }
    }
    Ok(exit_codes::for_outcome(report.outcome))
}

fn cmd_switches(header_path: PathBuf) -> Result<i32> {
    let exposure = requested_switches(&header_path)?;
    println!("switches: detector={}", detector_label(exposure.detector));
    for (step, value) in exposure.switches.iter() {
        println!("switches: {}={}", step, value.label());
    }
    Ok(exit_codes::OK)
}
