//! Cross-match and rank nearby catalog sources for each candidate event.
//!
//! Reads the candidate event list plus the raw Vizier and DataLab host
//! tables, runs ingestion, clustering, and ranking per event in parallel,
//! and writes the nearest-host file: for every event an ordered list of
//! positional rows, each tagged with its cross-match group label.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use indicatif::ProgressBar;
use serde_json::Value;

use crossmatch::{ClusterConfig, Cosmology, HostSelection, RankingPolicy};
use survey::{load_candidate_events, nearest_host_map, process_batch, PipelineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "Host Ranker",
    about = "Sort nearby catalog sources by projected physical distance",
    long_about = None
)]
struct Args {
    /// Candidate event list
    #[arg(long, default_value = "candidate-events.json")]
    events: PathBuf,

    /// Vizier host tables per event
    #[arg(long, default_value = "candidate-hosts.json")]
    vizier_hosts: PathBuf,

    /// DataLab host tables per event
    #[arg(long, default_value = "candidate-hosts-dl.json")]
    datalab_hosts: PathBuf,

    /// Output nearest-host file
    #[arg(long, default_value = "nearest-host-candidates.json")]
    output: PathBuf,

    /// Cross-match linking radius in arcseconds
    #[arg(long, default_value_t = 2.0)]
    link_radius_arcsec: f64,

    /// Keep sources within this projected distance (kpc)
    #[arg(long, default_value_t = 50.0)]
    max_kpc: f64,
}

/// Load a name-to-tables JSON object, treating a missing file as empty.
fn load_table_map(path: &PathBuf) -> Result<serde_json::Map<String, Value>, Box<dyn Error>> {
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
    let vizier = load_table_map(&args.vizier_hosts)?;
    let datalab = load_table_map(&args.datalab_hosts)?;

    let config = PipelineConfig {
        cosmology: Cosmology::default(),
        cluster: ClusterConfig {
            link_radius_arcsec: args.link_radius_arcsec,
        },
        policy: RankingPolicy {
            threshold_far_kpc: args.max_kpc,
            threshold_near_kpc: None,
            stellar_sigma: 2.0,
        },
        ingest_max_kpc: Some(args.max_kpc),
    };

    let progress = ProgressBar::new(events.len() as u64);
    let outcomes = process_batch(&events, &vizier, &datalab, &config, Some(&progress));
    progress.finish();

    let mut hosts = 0usize;
    let mut hostless = 0usize;
    let mut ambiguous = 0usize;
    let mut skipped_records = 0usize;
    for outcome in &outcomes {
        match outcome.selection {
            HostSelection::Host { .. } => hosts += 1,
            HostSelection::Hostless => hostless += 1,
            HostSelection::Ambiguous => ambiguous += 1,
        }
        skipped_records += outcome.skipped_records;
    }
    log::info!(
        "{} events: {hosts} with hosts, {hostless} hostless, {ambiguous} ambiguous \
         ({skipped_records} unparsable records dropped)",
        outcomes.len()
    );

    let map = nearest_host_map(&outcomes);
    fs::write(&args.output, serde_json::to_string_pretty(&map)?)?;

    Ok(())
}
