//! Batch processing of candidate events.
//!
//! One event is one unit of work: ingest its catalog tables, cluster the
//! detections, rank the groups, and emit the positional rows downstream
//! consumers index into. Events share nothing mutable, so the batch runs
//! on a rayon pool with a progress bar ticking per event. Every input
//! event produces an outcome; degraded events are marked, never dropped.

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use catalogs::{ingest_event_tables, to_event, CandidateEvent, JsonTableMap};
use crossmatch::{
    cluster_detections, select_host, ClusterConfig, Cosmology, Detection, DetectionGroup, Event,
    HostSelection, RankingPolicy,
};

/// Knobs for one batch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub cosmology: Cosmology,
    pub cluster: ClusterConfig,
    pub policy: RankingPolicy,
    /// Ingestion-side distance prefilter; detections beyond this never
    /// reach clustering.
    pub ingest_max_kpc: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cosmology: Cosmology::default(),
            cluster: ClusterConfig::default(),
            policy: RankingPolicy::ingestion(),
            ingest_max_kpc: Some(50.0),
        }
    }
}

/// One positional output row: catalog name, source id, RA, Dec, proper
/// motion and error (null for catalogs without), angular separation
/// (arcsec), physical separation (kpc), and the cross-match group label.
///
/// Downstream annotation and table scripts index these fields by
/// position, so this is a tuple struct and serializes as a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRow(
    pub String,
    pub String,
    pub f64,
    pub f64,
    pub Option<f64>,
    pub Option<f64>,
    pub f64,
    pub f64,
    pub usize,
);

impl HostRow {
    pub fn from_detection(detection: &Detection, group_id: usize) -> Self {
        Self(
            detection.catalog_name.clone(),
            detection.source_id.clone(),
            detection.position.ra_deg(),
            detection.position.dec_deg(),
            detection.proper_motion.map(|pm| pm.total_mas_yr),
            detection.proper_motion.map(|pm| pm.total_err_mas_yr),
            detection.angular_separation_arcsec,
            detection.physical_separation_kpc,
            group_id,
        )
    }

    pub fn catalog_name(&self) -> &str {
        &self.0
    }

    pub fn proper_motion_significance(&self) -> Option<f64> {
        match (self.4, self.5) {
            (Some(total), Some(err)) => Some(total / err),
            _ => None,
        }
    }

    pub fn physical_separation_kpc(&self) -> f64 {
        self.7
    }

    pub fn group_id(&self) -> usize {
        self.8
    }
}

/// Everything the batch learned about one event.
#[derive(Debug)]
pub struct EventOutcome {
    pub name: String,
    /// None when the wire record itself would not parse; the event is then
    /// carried as ambiguous rather than dropped.
    pub event: Option<Event>,
    pub selection: HostSelection,
    pub groups: Vec<DetectionGroup>,
    pub rows: Vec<HostRow>,
    pub skipped_records: usize,
}

/// Run the full chain for one event: ingest, cluster, rank.
pub fn process_event(
    name: &str,
    candidate: &CandidateEvent,
    vizier: Option<&JsonTableMap>,
    datalab: Option<&JsonTableMap>,
    config: &PipelineConfig,
) -> EventOutcome {
    let event = match to_event(name, candidate) {
        Ok(event) => event,
        Err(err) => {
            log::warn!("{err}");
            return EventOutcome {
                name: name.to_string(),
                event: None,
                selection: HostSelection::Ambiguous,
                groups: Vec::new(),
                rows: Vec::new(),
                skipped_records: 0,
            };
        }
    };

    let scale = config.cosmology.kpc_per_arcsec(event.redshift);
    let ingested = ingest_event_tables(
        &event.position,
        scale,
        vizier,
        datalab,
        config.ingest_max_kpc,
    );
    if ingested.skipped > 0 {
        log::debug!("{name}: dropped {} unparsable records", ingested.skipped);
    }

    let groups = cluster_detections(&event.position, ingested.detections, &config.cluster);
    let selection = select_host(&groups, scale, &config.policy);

    let mut rows: Vec<HostRow> = groups
        .iter()
        .flat_map(|g| g.members.iter().map(|m| HostRow::from_detection(m, g.group_id)))
        .collect();
    rows.sort_by(|a, b| {
        (a.7, a.6)
            .partial_cmp(&(b.7, b.6))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    EventOutcome {
        name: name.to_string(),
        event: Some(event),
        selection,
        groups,
        rows,
        skipped_records: ingested.skipped,
    }
}

/// Process every event in the batch, in parallel, preserving input order.
///
/// `vizier` and `datalab` map event names to their raw table objects;
/// events missing from either simply have fewer detections.
pub fn process_batch(
    events: &[(String, CandidateEvent)],
    vizier: &serde_json::Map<String, Value>,
    datalab: &serde_json::Map<String, Value>,
    config: &PipelineConfig,
    progress: Option<&ProgressBar>,
) -> Vec<EventOutcome> {
    events
        .par_iter()
        .map(|(name, candidate)| {
            let vizier_tables = vizier.get(name).and_then(Value::as_object);
            let datalab_tables = datalab.get(name).and_then(Value::as_object);
            let outcome = process_event(name, candidate, vizier_tables, datalab_tables, config);
            if let Some(bar) = progress {
                bar.inc(1);
            }
            outcome
        })
        .collect()
}

/// Deserialize the candidate event list, preserving file order.
pub fn load_candidate_events(json: &str) -> Result<Vec<(String, CandidateEvent)>, serde_json::Error> {
    let map: serde_json::Map<String, Value> = serde_json::from_str(json)?;
    map.into_iter()
        .map(|(name, value)| Ok((name, serde_json::from_value(value)?)))
        .collect()
}

/// Assemble the nearest-host output object: event name to ordered rows, an
/// entry for every event (empty where nothing was found).
pub fn nearest_host_map(outcomes: &[EventOutcome]) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    for outcome in outcomes {
        // serializing plain data cannot fail
        let rows = serde_json::to_value(&outcome.rows).unwrap_or(Value::Array(Vec::new()));
        map.insert(outcome.name.clone(), rows);
    }
    map
}
