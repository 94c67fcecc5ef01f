//! Scan a transient-catalog dump for hostless-survey candidates.
//!
//! Walks a directory tree of per-event JSON files, applies the candidate
//! cuts (usable coordinates, informative type, redshift within the
//! survey's range), prints the selected events, and writes the candidate
//! list consumed by the rest of the pipeline.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde_json::Value;

use catalogs::{select_candidate, CandidateFilter, TransientRecord};

#[derive(Parser, Debug)]
#[command(
    name = "Candidate Selector",
    about = "Select hostless-survey candidate events from a transient catalog dump",
    long_about = None
)]
struct Args {
    /// Directory tree of transient-catalog JSON files
    #[arg(long, default_value = "Transient-catalogs/supernovae")]
    catalog_dir: PathBuf,

    /// Output candidate event list
    #[arg(long, default_value = "candidate-events.json")]
    output: PathBuf,

    /// Keep events with |z| at or below this
    #[arg(long, default_value_t = 0.1)]
    max_redshift: f64,
}

/// Collect every .json file under `dir`, depth first.
fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let filter = CandidateFilter {
        max_redshift: args.max_redshift,
    };

    let mut files = Vec::new();
    collect_json_files(&args.catalog_dir, &mut files)?;
    files.sort();
    log::info!("scanning {} catalog files", files.len());

    let mut candidates = serde_json::Map::new();

    for file in &files {
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("skipping {}: {err}", file.display());
                continue;
            }
        };
        let entries: serde_json::Map<String, Value> = match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("skipping {}: {err}", file.display());
                continue;
            }
        };

        for (name, value) in entries {
            let record: TransientRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(err) => {
                    log::warn!("skipping {name}: {err}");
                    continue;
                }
            };
            if let Some(candidate) = select_candidate(&record, &filter) {
                println!(
                    "{:<32} {:<40} {:<24} {:<24} {:<16}",
                    name,
                    candidate.type_description,
                    candidate.ra,
                    candidate.dec,
                    candidate.redshift
                );
                candidates.insert(name, serde_json::to_value(&candidate)?);
            }
        }
    }

    println!("Number of candidates: {}", candidates.len());
    fs::write(&args.output, serde_json::to_string_pretty(&candidates)?)?;

    Ok(())
}
