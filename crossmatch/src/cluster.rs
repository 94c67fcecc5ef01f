//! Friend-of-friends clustering of detections around one event.
//!
//! Detections from different catalogs that sit within a small linking
//! radius of each other are almost certainly sightings of the same physical
//! object. Adjacency is tested in the local tangent plane of the event and
//! the connected components of the adjacency graph become the groups.
//!
//! The pair scan is O(N^2), which is fine at the tens of detections that
//! survive a single event's search radius; no spatial index is warranted.

use nalgebra::Vector2;

use crate::coords::{tangent_plane_offset, SkyPosition};
use crate::detection::{Detection, DetectionGroup};

/// Linking configuration for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    /// Maximum tangent-plane separation, in arcseconds, for two detections
    /// to be considered the same object (single-linkage radius).
    pub link_radius_arcsec: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            link_radius_arcsec: 2.0,
        }
    }
}

/// Disjoint-set forest with path compression.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // compress the walked path
        let mut cursor = i;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Partition `detections` into physical-object groups.
///
/// Two detections are linked iff their tangent-plane offsets from the event
/// differ by at most the linking radius on each axis (a cheap bounding-box
/// prefilter) and their Euclidean separation in that plane is within the
/// radius. Transitive links merge: this is single-linkage clustering with a
/// fixed radius.
///
/// Every input detection lands in exactly one group; groups own their
/// members and keep them in input order. Group ids number the components in
/// order of first appearance, so re-running on the same input reproduces
/// the same labels.
pub fn cluster_detections(
    event_position: &SkyPosition,
    detections: Vec<Detection>,
    config: &ClusterConfig,
) -> Vec<DetectionGroup> {
    if detections.is_empty() {
        return Vec::new();
    }

    let radius = config.link_radius_arcsec;
    let offsets: Vec<Vector2<f64>> = detections
        .iter()
        .map(|d| tangent_plane_offset(event_position, &d.position))
        .collect();

    let mut forest = UnionFind::new(detections.len());
    for i in 0..detections.len() {
        for j in (i + 1)..detections.len() {
            let delta = offsets[i] - offsets[j];
            if delta.x.abs() > radius || delta.y.abs() > radius {
                continue;
            }
            if delta.norm() <= radius {
                forest.union(i, j);
            }
        }
    }

    // Relabel roots in first-appearance order and hand each detection to
    // its group.
    let mut label_of_root: Vec<Option<usize>> = vec![None; detections.len()];
    let mut groups: Vec<DetectionGroup> = Vec::new();
    for (i, detection) in detections.into_iter().enumerate() {
        let root = forest.find(i);
        let label = match label_of_root[root] {
            Some(label) => label,
            None => {
                let label = groups.len();
                label_of_root[root] = Some(label);
                groups.push(DetectionGroup {
                    group_id: label,
                    members: Vec::new(),
                });
                label
            }
        };
        groups[label].members.push(detection);
    }

    groups
}
