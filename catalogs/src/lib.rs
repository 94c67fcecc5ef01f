//! Source-catalog schemas and detection ingestion.
//!
//! This crate sits between the external catalog clients (Vizier and
//! DataLab query wrappers, transient-catalog dumps) and the cross-matching
//! engine: it knows the column layout of every searched catalog, converts
//! raw positional rows into normalized [`crossmatch::Detection`] records,
//! and selects survey candidates from the transient event list.

pub mod events;
pub mod records;
pub mod schema;

pub use events::{
    format_claimed_types, select_candidate, select_coord, to_event, CandidateEvent,
    CandidateFilter, EventError, QuantityRecord, TransientRecord,
};
pub use records::{
    ingest_datalab_tables, ingest_event_tables, ingest_vizier_tables, parse_datalab_csv,
    IngestOutcome, JsonTableMap,
};
pub use schema::{schema_for, CatalogSchema, ASTROMETRY_PREFERENCE, VIZIER_CATALOGS};
