//! Fixed-width event table for the survey's hostless shortlist.
//!
//! Works from the serialized nearest-host rows rather than live pipeline
//! structures, so the table can be regenerated from files long after the
//! batch ran. Per event it regroups rows by cross-match label, recomputes
//! the stellar flag and mean distance per group, applies the reporting
//! cuts, and renders one line per surviving event.

use serde_json::Value;

use catalogs::{CandidateEvent, ASTROMETRY_PREFERENCE};
use crossmatch::{RankingPolicy, SkyPosition};

use crate::pipeline::HostRow;

/// Imaging surveys whose footprint coverage is flagged in the table.
pub static SURVEY_DATASETS: &[&str] = &["SDSS", "PS1", "DES", "LS", "Gaia2"];

/// Sky viewer link centered on the event.
pub fn legacysurvey_link(position: &SkyPosition) -> String {
    format!(
        "http://legacysurvey.org/viewer?ra={:.7}&dec={:.7}&zoom=16",
        position.ra_deg(),
        position.dec_deg()
    )
}

/// Open Supernova Catalog page for the event.
pub fn osc_link(event_name: &str) -> String {
    format!("https://sne.space/sne/{event_name}/")
}

/// One cross-match group reconstructed from output rows.
#[derive(Debug)]
struct GroupSummary<'a> {
    label: usize,
    mean_kpc: f64,
    stellar: bool,
    rows: Vec<&'a HostRow>,
}

/// Regroup flat rows by their cross-match label, preserving label order of
/// first appearance.
fn summarize_groups(rows: &[HostRow], stellar_sigma: f64) -> Vec<GroupSummary<'_>> {
    let mut summaries: Vec<GroupSummary> = Vec::new();
    for row in rows {
        match summaries.iter_mut().find(|s| s.label == row.group_id()) {
            Some(summary) => summary.rows.push(row),
            None => summaries.push(GroupSummary {
                label: row.group_id(),
                mean_kpc: 0.0,
                stellar: false,
                rows: vec![row],
            }),
        }
    }

    for summary in &mut summaries {
        summary.mean_kpc = summary
            .rows
            .iter()
            .map(|r| r.physical_separation_kpc())
            .sum::<f64>()
            / summary.rows.len() as f64;
        summary.stellar = summary.rows.iter().any(|r| {
            r.proper_motion_significance()
                .map_or(false, |sig| sig > stellar_sigma)
        });
    }

    summaries
}

/// The row to display for a group: the member from the most trusted
/// catalog in the astrometry preference order.
fn preferred_row<'a>(rows: &[&'a HostRow]) -> Option<&'a HostRow> {
    rows.iter()
        .min_by_key(|r| {
            ASTROMETRY_PREFERENCE
                .iter()
                .position(|name| *name == r.catalog_name())
                .unwrap_or(ASTROMETRY_PREFERENCE.len())
        })
        .copied()
}

/// Coverage flags, one fixed-width column per imaging survey.
fn coverage_cells(covered: Option<&Value>) -> String {
    let covered: Vec<&str> = covered
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    SURVEY_DATASETS
        .iter()
        .map(|name| {
            let flag = if covered.contains(name) { "Y" } else { "" };
            format!("{flag:<6} ")
        })
        .collect()
}

/// Render the hostless shortlist, header first.
///
/// Events whose nearest qualifying group sits inside the policy's
/// very-close threshold are omitted: a host that close means the event is
/// not a hostless candidate at all.
pub fn render_report(
    events: &[(String, CandidateEvent)],
    hosts: &serde_json::Map<String, Value>,
    coverage: &serde_json::Map<String, Value>,
    policy: &RankingPolicy,
) -> Vec<String> {
    let mut lines = vec![header()];

    for (name, info) in events {
        let rows: Vec<HostRow> = hosts
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let summaries = summarize_groups(&rows, policy.stellar_sigma);
        let nearest = summaries
            .iter()
            .filter(|s| !s.stellar && s.mean_kpc < policy.threshold_far_kpc)
            .min_by(|a, b| a.mean_kpc.total_cmp(&b.mean_kpc));

        let display = nearest.and_then(|s| preferred_row(&s.rows).map(|row| (s, row)));

        if let (Some((summary, _)), Some(near_kpc)) = (&display, policy.threshold_near_kpc) {
            if summary.mean_kpc < near_kpc {
                continue;
            }
        }

        let event_cells = format!(
            "{:<32} {:<28} {:<16} {:<16} {:<16} ",
            name, info.type_description, info.ra, info.dec, info.redshift
        );

        let host_cells = match &display {
            Some((_, row)) => format!(
                "{:<16} {:<24} {:>10.5} {:>10.5} {:>10.5} {:>10.5} ",
                row.0, row.1, row.2, row.3, row.6, row.7
            ),
            None => format!("{:<16} {:<24} {:>10} {:>10} {:>10} {:>10} ", "", "", "", "", "", ""),
        };

        let links = match SkyPosition::parse_hour_deg(&info.ra, &info.dec) {
            Ok(position) => format!("{:<96} {:<96}", legacysurvey_link(&position), osc_link(name)),
            Err(_) => format!("{:<96} {:<96}", "", osc_link(name)),
        };

        lines.push(format!(
            "{event_cells}{}{host_cells}{links}",
            coverage_cells(coverage.get(name))
        ));
    }

    lines
}

fn header() -> String {
    let event_cells = format!(
        "{:<32} {:<28} {:<16} {:<16} {:<16} ",
        "Event", "Type", "RA", "Dec", "z"
    );
    let coverage_cells: String = SURVEY_DATASETS
        .iter()
        .map(|name| format!("{name:<6} "))
        .collect();
    let host_cells = format!(
        "{:<16} {:<24} {:>10} {:>10} {:>10} {:>10} ",
        "Src", "Id", "RA", "Dec", "Dist_asec", "Dist_kpc"
    );
    let links = format!("{:<96} {:<96}", "LS_Link", "OSC_Link");
    format!("{event_cells}{coverage_cells}{host_cells}{links}")
}
