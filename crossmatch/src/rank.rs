//! Host-candidate ranking and stellar/extended classification.
//!
//! Consumes the groups produced by the clustering engine and decides, per
//! event, whether a plausible host object sits nearby. Distance cuts are
//! policy constants: the survey has run with a 30 kpc reporting cut and a
//! 50 kpc ingestion-side cut, so both live in [`RankingPolicy`] rather
//! than in code.

use crate::detection::{Detection, DetectionGroup};

/// Distance and classification thresholds for host selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    /// Groups with a representative distance at or beyond this many kpc are
    /// not considered host candidates.
    pub threshold_far_kpc: f64,
    /// Events whose selected host lies closer than this are dropped from
    /// hostless reporting entirely (they plausibly do have a host).
    pub threshold_near_kpc: Option<f64>,
    /// Proper-motion significance (total / error) above which a group is
    /// classified stellar. Strict inequality.
    pub stellar_sigma: f64,
}

impl RankingPolicy {
    /// The reporting-side variant: 30 kpc candidate cut, 20 kpc very-close
    /// exclusion.
    pub const fn reporting() -> Self {
        Self {
            threshold_far_kpc: 30.0,
            threshold_near_kpc: Some(20.0),
            stellar_sigma: 2.0,
        }
    }

    /// The ingestion-side variant: 50 kpc cut, no very-close exclusion.
    pub const fn ingestion() -> Self {
        Self {
            threshold_far_kpc: 50.0,
            threshold_near_kpc: None,
            stellar_sigma: 2.0,
        }
    }
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::reporting()
    }
}

/// Outcome of host selection for one event.
///
/// `Ambiguous` is reserved for events whose physical distance scale could
/// not be computed; it is never collapsed into `Hostless`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostSelection {
    /// The nearest qualifying non-stellar group.
    Host {
        group_id: usize,
        distance_kpc: f64,
    },
    /// No qualifying group within the distance cut.
    Hostless,
    /// Physical distances are undefined for this event (bad redshift);
    /// ranking was skipped.
    Ambiguous,
}

/// Select the nearest non-stellar group within the policy's distance cut.
///
/// `scale_kpc_per_arcsec` is the event's distance scale; a non-positive or
/// non-finite value means physical distances are undefined and the event is
/// classified [`HostSelection::Ambiguous`] without ranking.
pub fn select_host(
    groups: &[DetectionGroup],
    scale_kpc_per_arcsec: f64,
    policy: &RankingPolicy,
) -> HostSelection {
    if !scale_kpc_per_arcsec.is_finite() || scale_kpc_per_arcsec <= 0.0 {
        return HostSelection::Ambiguous;
    }

    let nearest = groups
        .iter()
        .filter(|g| !g.is_stellar(policy.stellar_sigma))
        .map(|g| (g.group_id, g.representative_distance_kpc()))
        .filter(|(_, kpc)| *kpc < policy.threshold_far_kpc)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((group_id, distance_kpc)) => HostSelection::Host {
            group_id,
            distance_kpc,
        },
        None => HostSelection::Hostless,
    }
}

/// True if the event must be excluded from hostless reporting because its
/// selected host sits inside the very-close threshold.
pub fn excluded_from_report(selection: &HostSelection, policy: &RankingPolicy) -> bool {
    match (selection, policy.threshold_near_kpc) {
        (HostSelection::Host { distance_kpc, .. }, Some(near)) => *distance_kpc < near,
        _ => false,
    }
}

/// Pick the member to display for a selected group, by a fixed catalog
/// astrometry preference order (most trusted first). Catalogs absent from
/// the order rank last; ties keep the earlier member.
pub fn preferred_member<'a>(
    members: &'a [Detection],
    preference_order: &[&str],
) -> Option<&'a Detection> {
    members.iter().min_by_key(|d| {
        preference_order
            .iter()
            .position(|name| *name == d.catalog_name)
            .unwrap_or(preference_order.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{SkyPosition, ARCSEC_PER_DEG};
    use crate::detection::ProperMotion;
    use approx::assert_relative_eq;

    fn event() -> SkyPosition {
        SkyPosition::from_degrees(150.0, 20.0).unwrap()
    }

    fn detection(catalog: &str, offset_arcsec: f64, pm: Option<ProperMotion>) -> Detection {
        let position =
            SkyPosition::from_degrees(150.0, 20.0 + offset_arcsec / ARCSEC_PER_DEG).unwrap();
        Detection::new(catalog, "src", position, pm, &event(), 1.0)
    }

    fn group(id: usize, members: Vec<Detection>) -> DetectionGroup {
        DetectionGroup {
            group_id: id,
            members,
        }
    }

    #[test]
    fn test_nearest_qualifying_group_wins() {
        let groups = vec![
            group(0, vec![detection("SDSS", 25.0, None)]),
            group(1, vec![detection("PS1", 10.0, None)]),
        ];
        let selection = select_host(&groups, 1.0, &RankingPolicy::reporting());
        match selection {
            HostSelection::Host {
                group_id,
                distance_kpc,
            } => {
                assert_eq!(group_id, 1);
                assert_relative_eq!(distance_kpc, 10.0, epsilon = 1e-6);
            }
            other => panic!("expected a host, got {other:?}"),
        }
    }

    #[test]
    fn test_stellar_groups_are_skipped() {
        let moving = ProperMotion {
            total_mas_yr: 1.0,
            total_err_mas_yr: 0.1,
        };
        let groups = vec![
            group(0, vec![detection("Gaia2", 5.0, Some(moving))]),
            group(1, vec![detection("SDSS", 25.0, None)]),
        ];
        let selection = select_host(&groups, 1.0, &RankingPolicy::reporting());
        match selection {
            HostSelection::Host { group_id, .. } => assert_eq!(group_id, 1),
            other => panic!("expected a host, got {other:?}"),
        }
    }

    #[test]
    fn test_far_groups_do_not_qualify() {
        let groups = vec![group(0, vec![detection("SDSS", 35.0, None)])];
        assert_eq!(
            select_host(&groups, 1.0, &RankingPolicy::reporting()),
            HostSelection::Hostless
        );
        // the ingestion-side 50 kpc variant still accepts it
        match select_host(&groups, 1.0, &RankingPolicy::ingestion()) {
            HostSelection::Host { distance_kpc, .. } => {
                assert_relative_eq!(distance_kpc, 35.0, epsilon = 1e-6)
            }
            other => panic!("expected a host, got {other:?}"),
        }
    }

    #[test]
    fn test_no_groups_is_hostless() {
        assert_eq!(
            select_host(&[], 1.0, &RankingPolicy::reporting()),
            HostSelection::Hostless
        );
    }

    #[test]
    fn test_undefined_scale_is_ambiguous_not_hostless() {
        let groups = vec![group(0, vec![detection("SDSS", 5.0, None)])];
        assert_eq!(
            select_host(&groups, 0.0, &RankingPolicy::reporting()),
            HostSelection::Ambiguous
        );
        assert_eq!(
            select_host(&[], f64::NAN, &RankingPolicy::reporting()),
            HostSelection::Ambiguous
        );
    }

    #[test]
    fn test_very_close_host_excluded_from_report() {
        let policy = RankingPolicy::reporting();
        let close = HostSelection::Host {
            group_id: 0,
            distance_kpc: 12.0,
        };
        let mid = HostSelection::Host {
            group_id: 0,
            distance_kpc: 25.0,
        };
        assert!(excluded_from_report(&close, &policy));
        assert!(!excluded_from_report(&mid, &policy));
        assert!(!excluded_from_report(&HostSelection::Hostless, &policy));
        // ingestion policy has no very-close cut
        assert!(!excluded_from_report(&close, &RankingPolicy::ingestion()));
    }

    #[test]
    fn test_preferred_member_follows_catalog_order() {
        let order = ["HyperLEDA", "2MASS-XSC", "SDSS", "Gaia2"];
        let members = vec![
            detection("Gaia2", 5.0, None),
            detection("2MASS-XSC", 5.1, None),
            detection("Unknown-Survey", 4.0, None),
        ];
        let chosen = preferred_member(&members, &order).unwrap();
        assert_eq!(chosen.catalog_name, "2MASS-XSC");
    }

    #[test]
    fn test_preferred_member_empty() {
        assert!(preferred_member(&[], &["SDSS"]).is_none());
    }
}
