//! Batch pipeline and reporting for the hostless-candidate survey.
//!
//! Ties the catalog layer and the cross-matching engine into the file
//! formats the survey actually runs on: candidate event lists, per-event
//! host tables, nearest-host outputs, coverage maps, and the visual
//! inspection results. The binaries under `src/bin/` are thin CLI shells
//! over this crate.

pub mod inspection;
pub mod pipeline;
pub mod report;

pub use inspection::{combine_consistent, triage, FlagError, FlagSet, InspectionFlag, Triage};
pub use pipeline::{
    load_candidate_events, nearest_host_map, process_batch, process_event, EventOutcome, HostRow,
    PipelineConfig,
};
pub use report::{legacysurvey_link, osc_link, render_report, SURVEY_DATASETS};
