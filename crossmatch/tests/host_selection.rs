//! End-to-end run of the core: normalize an event's coordinates, build
//! detections around it, cluster, classify, and select a host candidate.

use approx::assert_relative_eq;
use crossmatch::{
    cluster_detections, select_host, ClusterConfig, Detection, HostSelection, ProperMotion,
    RankingPolicy, SkyPosition, WMAP9, coords::ARCSEC_PER_DEG,
};

/// Place a detection at a declination offset (arcsec) from the event.
fn detection_at(
    catalog: &str,
    id: &str,
    event: &SkyPosition,
    offset_arcsec: f64,
    pm: Option<ProperMotion>,
    scale: f64,
) -> Detection {
    let position = SkyPosition::from_degrees(
        event.ra_deg(),
        event.dec_deg() + offset_arcsec / ARCSEC_PER_DEG,
    )
    .unwrap();
    Detection::new(catalog, id, position, pm, event, scale)
}

#[test]
fn stellar_group_is_skipped_for_a_farther_extended_host() {
    // Event at 10h +20deg, z = 0.05: scale ~0.99 kpc/arcsec.
    let event = SkyPosition::parse_hour_deg("10 00 00.00", "+20 00 00.0").unwrap();
    let scale = WMAP9.kpc_per_arcsec(0.05);
    assert!(scale > 0.9 && scale < 1.1);

    // Three detections: an extended source and a Gaia source 0.2 arcsec
    // apart (one physical object, moving), plus an isolated source 40
    // arcsec out.
    let gaia_pm = ProperMotion {
        total_mas_yr: 1.0,
        total_err_mas_yr: 0.1,
    };
    let detections = vec![
        detection_at("2MASS-XSC", "x1", &event, 5.0, None, scale),
        detection_at("Gaia2", "g1", &event, 5.2, Some(gaia_pm), scale),
        detection_at("SDSS", "s1", &event, 40.0, None, scale),
    ];

    let groups = cluster_detections(&event, detections, &ClusterConfig::default());
    assert_eq!(groups.len(), 2);

    let near = groups
        .iter()
        .find(|g| g.members.iter().any(|m| m.source_id == "x1"))
        .unwrap();
    let far = groups
        .iter()
        .find(|g| g.members.iter().any(|m| m.source_id == "s1"))
        .unwrap();

    // The 2MASS and Gaia sightings merged; the Gaia proper motion marks
    // the whole group stellar. The SDSS source stands alone and extended.
    assert_eq!(near.members.len(), 2);
    assert!(near.is_stellar(2.0));
    assert_eq!(far.members.len(), 1);
    assert!(!far.is_stellar(2.0));

    // Under the 50 kpc ingestion policy the farther, non-stellar group is
    // the host candidate despite the closer (stellar) one.
    let selection = select_host(&groups, scale, &RankingPolicy::ingestion());
    match selection {
        HostSelection::Host {
            group_id,
            distance_kpc,
        } => {
            assert_eq!(group_id, far.group_id);
            assert_relative_eq!(distance_kpc, 40.0 * scale, epsilon = 1e-6);
        }
        other => panic!("expected the extended group, got {other:?}"),
    }

    // The reporting policy's tighter 30 kpc cut drops it: ~40 kpc is too
    // far, and the event counts as hostless.
    assert_eq!(
        select_host(&groups, scale, &RankingPolicy::reporting()),
        HostSelection::Hostless
    );
}

#[test]
fn bad_redshift_degrades_to_ambiguous() {
    let event = SkyPosition::parse_hour_deg("10 00 00.00", "+20 00 00.0").unwrap();
    let scale = WMAP9.kpc_per_arcsec(0.0);
    assert_eq!(scale, 0.0);

    let detections = vec![detection_at("SDSS", "s1", &event, 5.0, None, scale)];
    let groups = cluster_detections(&event, detections, &ClusterConfig::default());

    // Clustering still works in angular space; ranking refuses to guess.
    assert_eq!(groups.len(), 1);
    assert_eq!(
        select_host(&groups, scale, &RankingPolicy::reporting()),
        HostSelection::Ambiguous
    );
}
