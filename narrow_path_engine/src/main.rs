/// Narrow Path Engine — Replay Harness
///
/// Loads recorded event streams, replays each one twice through the
/// engine, and compares the canonical hash against the recorded one.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use narrow_path_engine::domain::Calibration;
use narrow_path_engine::engine::RiskEngine;
use narrow_path_engine::events::EventEnvelope;
use narrow_path_engine::hashing::{canonical_hash, canonical_serialize};

#[derive(Parser, Debug)]
#[command(name = "narrow-path-replay", about = "Replay recorded games and verify state hashes")]
struct Args {
    /// Fixture file: a JSON array of { name, events, expected_hash }.
    #[arg(default_value = "tests/golden/fixtures.json")]
    fixtures: PathBuf,

    /// Print the canonical JSON of every final state.
    #[arg(long)]
    show_state: bool,
}

#[derive(Deserialize)]
struct Fixture {
    name: String,
    #[serde(default)]
    calibration: Calibration,
    events: Vec<EventEnvelope>,
    expected_hash: String,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn replay_hash(fixture: &Fixture) -> Result<(String, Vec<u8>)> {
    let mut engine = RiskEngine::new(fixture.calibration.clone())
        .with_context(|| format!("fixture {:?}: bad calibration", fixture.name))?;
    let state = engine
        .replay(&fixture.events)
        .with_context(|| format!("fixture {:?}: replay rejected an event", fixture.name))?;
    Ok((canonical_hash(state), canonical_serialize(state)))
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let data = fs::read_to_string(&args.fixtures)
        .with_context(|| format!("failed to read {}", args.fixtures.display()))?;
    let fixtures: Vec<Fixture> =
        serde_json::from_str(&data).context("failed to parse fixture JSON")?;
    tracing::info!(path = %args.fixtures.display(), count = fixtures.len(), "loaded fixtures");

    let mut passed = 0;
    for fixture in &fixtures {
        // Run 1
        let (h1, json) = replay_hash(fixture)?;
        // Run 2 (determinism check)
        let (h2, _) = replay_hash(fixture)?;

        let hash_match = h1 == fixture.expected_hash;
        let determ_match = h1 == h2;

        if hash_match && determ_match {
            passed += 1;
            println!(
                "[PASS] {}: {} events, hash={}",
                fixture.name,
                fixture.events.len(),
                h1
            );
        } else {
            println!("[FAIL] {}:", fixture.name);
            if !hash_match {
                println!("  Hash mismatch: got={} expected={}", h1, fixture.expected_hash);
            }
            if !determ_match {
                println!("  Determinism fail: run1={} run2={}", h1, h2);
            }
        }

        if args.show_state {
            println!("  {}", String::from_utf8_lossy(&json));
        }
    }

    println!("\n===========================================");
    println!("Results: {}/{} passed", passed, fixtures.len());
    if passed == fixtures.len() {
        println!("[OK] All replay hash checks PASSED.");
        Ok(())
    } else {
        println!("[FAIL] Some checks failed.");
        std::process::exit(1);
    }
}
