//! Normalized detection records and their physical-object groupings.

use serde::Serialize;

use crate::coords::{angular_separation_arcsec, SkyPosition};

/// Total proper motion of a source with its uncertainty, in mas/yr.
///
/// Only catalogs with astrometric time baselines (Gaia) report this; for
/// everything else the detection carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProperMotion {
    pub total_mas_yr: f64,
    pub total_err_mas_yr: f64,
}

impl ProperMotion {
    /// Significance of the motion as total / error.
    ///
    /// A zero error with non-zero motion yields +inf, which every finite
    /// threshold treats as significant; NaN never passes a threshold.
    pub fn significance(&self) -> f64 {
        self.total_mas_yr / self.total_err_mas_yr
    }
}

/// The transient event under study. Populated by the catalog layer; the
/// core treats it as an immutable input.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub name: String,
    pub position: SkyPosition,
    pub redshift: f64,
    pub type_description: String,
}

/// A single catalog sighting of a source near one event.
///
/// Both separations are fixed at construction: the physical separation is
/// always `angular * scale` for the event's distance scale, never set
/// independently.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Human-readable catalog name (e.g. "2MASS-XSC", "Gaia2").
    pub catalog_name: String,
    /// Catalog-native source identifier; unique only within its catalog.
    pub source_id: String,
    pub position: SkyPosition,
    pub proper_motion: Option<ProperMotion>,
    /// Great-circle distance from the event position, arcseconds.
    pub angular_separation_arcsec: f64,
    /// Projected proper distance from the event, kpc. Zero when the event's
    /// distance scale is undefined.
    pub physical_separation_kpc: f64,
}

impl Detection {
    /// Build a detection, deriving both separations from the event position
    /// and its distance scale.
    pub fn new(
        catalog_name: impl Into<String>,
        source_id: impl Into<String>,
        position: SkyPosition,
        proper_motion: Option<ProperMotion>,
        event_position: &SkyPosition,
        kpc_per_arcsec: f64,
    ) -> Self {
        let angular = angular_separation_arcsec(event_position, &position);
        Self {
            catalog_name: catalog_name.into(),
            source_id: source_id.into(),
            position,
            proper_motion,
            angular_separation_arcsec: angular,
            physical_separation_kpc: angular * kpc_per_arcsec,
        }
    }
}

/// A cluster of detections believed to be one physical object.
///
/// Produced only by the clustering engine; members are owned exclusively by
/// the group for the lifetime of one clustering run, and every input
/// detection lands in exactly one group.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionGroup {
    /// Component label, stable only within a single clustering run.
    pub group_id: usize,
    /// Non-empty; preserves the ingestion order of its members.
    pub members: Vec<Detection>,
}

impl DetectionGroup {
    /// True if any member's proper motion is significant beyond `sigma`
    /// (strict inequality) - a moving source is a foreground star, not a
    /// host galaxy.
    pub fn is_stellar(&self, sigma: f64) -> bool {
        self.members
            .iter()
            .filter_map(|d| d.proper_motion)
            .any(|pm| pm.significance() > sigma)
    }

    /// Mean projected physical distance of the members from the event, kpc.
    /// Averaging damps per-catalog astrometric scatter.
    pub fn representative_distance_kpc(&self) -> f64 {
        mean(self.members.iter().map(|d| d.physical_separation_kpc))
    }

    /// Mean angular distance of the members from the event, arcseconds.
    /// The fallback ordering when no physical scale is available.
    pub fn representative_angular_arcsec(&self) -> f64 {
        mean(self.members.iter().map(|d| d.angular_separation_arcsec))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
