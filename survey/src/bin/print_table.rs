//! Print the hostless shortlist as a fixed-width table.
//!
//! Lists candidate events whose nearest cross-matched group lies beyond
//! the reporting distance cut, with survey coverage flags and viewer
//! links. Events with a very close host candidate are omitted entirely.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

use crossmatch::RankingPolicy;
use survey::{load_candidate_events, render_report};

#[derive(Parser, Debug)]
#[command(
    name = "Table Printer",
    about = "List events with the nearest source beyond the reporting distance cut",
    long_about = None
)]
struct Args {
    /// Candidate event list
    #[arg(long, default_value = "candidate-events.json")]
    events: PathBuf,

    /// Nearest-host file produced by the host ranker
    #[arg(long, default_value = "nearest-host-candidates.json")]
    hosts: PathBuf,

    /// Survey coverage map (event name to covered surveys)
    #[arg(long, default_value = "survey-coverage.json")]
    coverage: PathBuf,

    /// Host-candidate distance cut in kpc
    #[arg(long, default_value_t = 30.0)]
    max_host_kpc: f64,

    /// Drop events with a host candidate closer than this (kpc)
    #[arg(long, default_value_t = 20.0)]
    near_kpc: f64,
}

fn load_map(path: &PathBuf) -> Result<serde_json::Map<String, Value>, Box<dyn Error>> {
    if !path.exists() {
        log::warn!("{} not found, continuing without it", path.display());
        return Ok(serde_json::Map::new());
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let events = load_candidate_events(&fs::read_to_string(&args.events)?)?;
    let hosts = load_map(&args.hosts)?;
    let coverage = load_map(&args.coverage)?;

    let policy = RankingPolicy {
        threshold_far_kpc: args.max_host_kpc,
        threshold_near_kpc: Some(args.near_kpc),
        stellar_sigma: 2.0,
    };

    for line in render_report(&events, &hosts, &coverage, &policy) {
        println!("{line}");
    }

    Ok(())
}
