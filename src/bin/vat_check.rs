//! # vat-check
//!
//! Looks up VAT numbers given as arguments, or prompts for them on stdin
//! until an empty line. Each result is printed as pretty JSON.
//!
//! Usage:
//!   cargo run --features cli --bin vat-check -- ATU12345678 "GB 999 9999 73"
//!   RUST_LOG=vat_checker=debug cargo run --features cli --bin vat-check

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use vat_checker::{CheckerConfig, LookupResult, RETURN_OK, VatChecker};

/// Validate European VAT numbers and look up the registered company.
#[derive(Parser, Debug)]
#[command(name = "vat-check", version, about)]
struct Cli {
    /// VAT numbers including the 2-letter country prefix; prompts when empty
    vat_numbers: Vec<String>,

    /// Skip the VIES availability probe
    #[arg(long)]
    no_probe: bool,
}

fn print(result: &LookupResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("serializing lookup result")?;
    println!("{json}");
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CheckerConfig::from_env().context("reading VAT_CHECKER_* settings")?;
    if cli.no_probe {
        config.probe_availability = false;
    }
    let checker = VatChecker::new(config).context("building the VAT checker")?;

    let mut all_ok = true;
    if cli.vat_numbers.is_empty() {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("VAT number (empty line to quit): ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else { break };
            let line = line?;
            if line.trim().is_empty() {
                break;
            }
            let result = checker.do_lookup(&line);
            all_ok &= result.return_code == RETURN_OK;
            print(&result)?;
        }
    } else {
        for raw in &cli.vat_numbers {
            let result = checker.do_lookup(raw);
            all_ok &= result.return_code == RETURN_OK;
            print(&result)?;
        }
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
