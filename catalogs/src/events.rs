//! Transient-catalog event records and candidate selection.
//!
//! The event list comes from an Open-Supernova-Catalog-style JSON dump:
//! every quantity (RA, Dec, redshift, claimed type) is a list of reported
//! values, each tagged with the comma-separated ids of the references that
//! reported it. Candidate selection picks one coordinate pair per event by
//! reference count, formats the claimed types, and applies the survey's
//! redshift cut.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crossmatch::{CoordError, Event, SkyPosition};

/// Claimed types that carry no classification on their own.
const UNINFORMATIVE_TYPES: &[&str] = &["Candidate", "LGRB"];

#[derive(Error, Debug)]
pub enum EventError {
    #[error("bad coordinates for {name}: {source}")]
    Coordinates { name: String, source: CoordError },

    #[error("bad redshift for {name}: {value:?}")]
    Redshift { name: String, value: String },
}

/// One reported value of a transient quantity with its reference sources.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityRecord {
    #[serde(default)]
    pub value: Value,
    /// Comma-separated reference ids, e.g. "1,5,12".
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub probability: Option<Value>,
}

impl QuantityRecord {
    fn value_str(&self) -> Option<String> {
        match &self.value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn probability_f64(&self) -> Option<f64> {
        match self.probability.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn source_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.source
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
    }
}

/// The per-event quantities the candidate filter needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransientRecord {
    #[serde(default)]
    pub ra: Vec<QuantityRecord>,
    #[serde(default)]
    pub dec: Vec<QuantityRecord>,
    #[serde(default)]
    pub redshift: Vec<QuantityRecord>,
    #[serde(default)]
    pub claimedtype: Vec<QuantityRecord>,
}

/// A selected candidate event in wire form: coordinate strings are kept
/// verbatim (sexagesimal where the catalog reported sexagesimal) so the
/// output file round-trips what the references published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub ra: String,
    pub dec: String,
    #[serde(rename = "type")]
    pub type_description: String,
    pub redshift: String,
}

#[derive(Default)]
struct ReferenceTally {
    ra_count: usize,
    dec_count: usize,
    ra_value: Option<String>,
    dec_value: Option<String>,
}

/// Pick the most-referenced coordinate pair for an event.
///
/// Two-step policy: the primary rule considers only reference sources
/// whose RA and Dec counts agree (a source that reported a paired
/// position); if no source qualifies, the fallback ignores the pairing
/// requirement and picks by RA reference count alone. Within a rule the
/// highest count wins and ties go to the lowest reference id. The first
/// value seen per reference is kept.
///
/// Returns `None` when no source yields both an RA and a Dec value.
pub fn select_coord(
    ra_list: &[QuantityRecord],
    dec_list: &[QuantityRecord],
) -> Option<(String, String)> {
    let mut tallies: BTreeMap<i64, ReferenceTally> = BTreeMap::new();

    for rec in ra_list {
        for id in rec.source_ids() {
            let tally = tallies.entry(id).or_default();
            tally.ra_count += 1;
            if tally.ra_value.is_none() {
                tally.ra_value = rec.value_str();
            }
        }
    }
    for rec in dec_list {
        for id in rec.source_ids() {
            let tally = tallies.entry(id).or_default();
            tally.dec_count += 1;
            if tally.dec_value.is_none() {
                tally.dec_value = rec.value_str();
            }
        }
    }

    let best = |paired_only: bool| -> Option<i64> {
        let mut best: Option<(usize, i64)> = None;
        for (&id, tally) in &tallies {
            if paired_only && tally.ra_count != tally.dec_count {
                continue;
            }
            if best.map_or(true, |(count, _)| tally.ra_count > count) {
                best = Some((tally.ra_count, id));
            }
        }
        best.map(|(_, id)| id)
    };

    let selected = best(true).or_else(|| best(false))?;
    let tally = &tallies[&selected];
    match (&tally.ra_value, &tally.dec_value) {
        (Some(ra), Some(dec)) => Some((ra.clone(), dec.clone())),
        _ => None,
    }
}

/// Render the claimed types of an event in human-readable form.
///
/// Bare `Candidate`/`LGRB` entries are dropped; a kind qualifier is
/// truncated to five characters and a probability renders as `p=0.95`.
/// Entries join with "; ". An empty result means the event carries no
/// usable classification.
pub fn format_claimed_types(records: &[QuantityRecord]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for rec in records {
        let Some(value) = rec.value_str() else {
            continue;
        };
        if UNINFORMATIVE_TYPES.contains(&value.as_str()) {
            continue;
        }

        let mut qualifiers: Vec<String> = Vec::new();
        if let Some(kind) = rec.kind.as_deref() {
            if !kind.is_empty() {
                qualifiers.push(kind.chars().take(5).collect());
            }
        }
        if let Some(p) = rec.probability_f64() {
            qualifiers.push(format!("p={p:.2}"));
        }

        if qualifiers.is_empty() {
            parts.push(value);
        } else {
            parts.push(format!("{} ({})", value, qualifiers.join(", ")));
        }
    }

    parts.join("; ")
}

/// Selection cuts for the candidate list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateFilter {
    /// Keep events with |z| at or below this.
    pub max_redshift: f64,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self { max_redshift: 0.1 }
    }
}

/// Decide whether a transient record qualifies as a survey candidate.
///
/// Requires a parsable first redshift within the cut, a non-empty
/// formatted type, and a selectable coordinate pair. Anything else is
/// quietly not a candidate - the caller is iterating a whole catalog dump.
pub fn select_candidate(record: &TransientRecord, filter: &CandidateFilter) -> Option<CandidateEvent> {
    let redshift_str = record.redshift.first()?.value_str()?;
    let redshift: f64 = redshift_str.trim().parse().ok()?;
    if !redshift.is_finite() || redshift.abs() > filter.max_redshift {
        return None;
    }

    let type_description = format_claimed_types(&record.claimedtype);
    if type_description.is_empty() {
        return None;
    }

    let (ra, dec) = select_coord(&record.ra, &record.dec)?;

    Some(CandidateEvent {
        ra,
        dec,
        type_description,
        redshift: redshift_str,
    })
}

/// Resolve a wire-form candidate into a core [`Event`].
pub fn to_event(name: &str, candidate: &CandidateEvent) -> Result<Event, EventError> {
    let position =
        SkyPosition::parse_hour_deg(&candidate.ra, &candidate.dec).map_err(|source| {
            EventError::Coordinates {
                name: name.to_string(),
                source,
            }
        })?;

    let redshift: f64 = candidate
        .redshift
        .trim()
        .parse()
        .map_err(|_| EventError::Redshift {
            name: name.to_string(),
            value: candidate.redshift.clone(),
        })?;

    Ok(Event {
        name: name.to_string(),
        position,
        // reported redshifts are occasionally negative by sign convention
        redshift: redshift.abs(),
        type_description: candidate.type_description.clone(),
    })
}
