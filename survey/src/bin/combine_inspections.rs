//! Merge independent visual-inspection passes and triage the events.
//!
//! Each inspector produces a `visual-inspection-NN.json` file mapping
//! event name to image source to a flag string. Per image, results that
//! agree (favorites aside) are kept; disagreements are dropped so the
//! image can be re-inspected. The combined judgements then triage every
//! event into visible / absent / ambiguous.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

use survey::{combine_consistent, triage, FlagSet, Triage};

#[derive(Parser, Debug)]
#[command(
    name = "Inspection Combiner",
    about = "Merge visual inspection results and triage events",
    long_about = None
)]
struct Args {
    /// Directory holding the per-inspector result files
    #[arg(long, default_value = ".")]
    inspection_dir: PathBuf,

    /// Annotated image index (event name to image source to file)
    #[arg(long, default_value = "annotated-images.json")]
    images: PathBuf,

    /// Combined output file
    #[arg(long, default_value = "visual-inspection-combined.json")]
    output: PathBuf,
}

/// Load every per-inspector result file in the directory, skipping the
/// combined output itself.
fn load_inspections(
    args: &Args,
) -> Result<Vec<serde_json::Map<String, Value>>, Box<dyn Error>> {
    let output_name = args.output.file_name();
    let mut results = Vec::new();

    let mut paths: Vec<PathBuf> = fs::read_dir(&args.inspection_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            name.starts_with("visual-inspection-")
                && name.ends_with(".json")
                && path.file_name() != output_name
        })
        .collect();
    paths.sort();

    for path in paths {
        match serde_json::from_str(&fs::read_to_string(&path)?) {
            Ok(map) => results.push(map),
            Err(err) => log::warn!("skipping {}: {err}", path.display()),
        }
    }
    Ok(results)
}

fn flag_set_at(map: &serde_json::Map<String, Value>, event: &str, source: &str) -> Option<FlagSet> {
    let text = map.get(event)?.get(source)?.as_str()?;
    match FlagSet::parse(text) {
        Ok(set) => Some(set),
        Err(err) => {
            log::warn!("{event}/{source}: {err}");
            None
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let images: serde_json::Map<String, Value> =
        serde_json::from_str(&fs::read_to_string(&args.images)?)?;
    let inspections = load_inspections(&args)?;
    log::info!("merging {} inspection sets", inspections.len());

    let mut combined = serde_json::Map::new();

    for (event, sources) in &images {
        let Some(sources) = sources.as_object() else {
            continue;
        };
        for (source, file) in sources {
            if file.is_null() {
                continue;
            }
            let results: Vec<FlagSet> = inspections
                .iter()
                .filter_map(|set| flag_set_at(set, event, source))
                .collect();
            if let Some(agreed) = combine_consistent(&results) {
                let entry = combined
                    .entry(event.clone())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Some(per_event) = entry.as_object_mut() {
                    per_event.insert(source.clone(), Value::String(agreed.to_string()));
                }
            }
        }
    }

    // triage each event from its combined judgements
    let mut visible = Vec::new();
    let mut absent = Vec::new();
    let mut ambiguous = Vec::new();
    for (event, sources) in &combined {
        let sets: Vec<FlagSet> = sources
            .as_object()
            .map(|map| {
                map.values()
                    .filter_map(|v| v.as_str())
                    .filter_map(|text| FlagSet::parse(text).ok())
                    .collect()
            })
            .unwrap_or_default();
        match triage(sets) {
            Triage::Visible => visible.push(event.as_str()),
            Triage::Absent => absent.push(event.as_str()),
            Triage::Ambiguous => ambiguous.push(event.as_str()),
        }
    }

    for (title, names) in [
        ("host visible", &visible),
        ("host absent", &absent),
        ("ambiguous", &ambiguous),
    ] {
        println!("{title} ({}):", names.len());
        for name in names {
            println!("  {name}");
        }
    }

    fs::write(&args.output, serde_json::to_string_pretty(&combined)?)?;

    Ok(())
}
