#![forbid(unsafe_code)]
//! Offline mining demo: notarizes content fingerprints into a fresh
//! in-memory ledger and prints the resulting chain.

use clap::Parser;
use colored::*;
use std::time::Instant;

use notarychain::ledger::{Ledger, Record};
use notarychain::miner::{mine_record, MineControl};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Author label stamped on every record
    #[arg(long, default_value = "anonymous")]
    author: String,

    /// Required number of leading zero characters in each block hash
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(0..=64))]
    difficulty: u32,

    /// Content fingerprints to notarize, one block each
    #[arg(required = true)]
    fingerprints: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut ledger = Ledger::bootstrap(cli.difficulty);
    println!("{}", "⛓️  Genesis block created".bright_cyan());
    println!("    hash: {}\n", ledger.tip().hash);

    let control = MineControl::new();
    for fingerprint in &cli.fingerprints {
        let record = Record {
            author: cli.author.clone(),
            fingerprint: fingerprint.clone(),
        };

        let started = Instant::now();
        let block = mine_record(ledger.tip(), record, cli.difficulty, &control)?;
        let elapsed = started.elapsed();

        ledger.append(block.clone())?;

        println!(
            "{}",
            format!("⛏️  Block {} mined", block.index).bright_green()
        );
        println!("    hash:  {}", block.hash);
        println!("    nonce: {}", block.nonce);
        println!("    took:  {:.3}s\n", elapsed.as_secs_f64());
    }

    println!("{}", "📜 Final chain".bright_cyan());
    println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);

    Ok(())
}
