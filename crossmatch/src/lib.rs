//! Cross-matching engine for transient host-galaxy identification.
//!
//! Given the catalog detections surrounding one supernova candidate, this
//! crate normalizes their coordinates, clusters sightings of the same
//! physical object, classifies each cluster as stellar or extended from
//! proper-motion significance, and ranks clusters by projected physical
//! distance to pick the nearest plausible host.
//!
//! The crate is pure computation: no I/O, no network, no shared mutable
//! state. Events are independent, so callers may process a batch in
//! parallel without coordination.

pub mod cluster;
pub mod coords;
pub mod cosmology;
pub mod detection;
pub mod rank;

pub use cluster::{cluster_detections, ClusterConfig};
pub use coords::{
    angular_separation_arcsec, parse_angle, tangent_plane_offset, AngleUnit, CoordError,
    SkyPosition,
};
pub use cosmology::{Cosmology, WMAP9};
pub use detection::{Detection, DetectionGroup, Event, ProperMotion};
pub use rank::{excluded_from_report, preferred_member, select_host, HostSelection, RankingPolicy};
