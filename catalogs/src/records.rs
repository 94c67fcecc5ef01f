//! Ingestion of raw catalog rows into normalized detections.
//!
//! Catalog clients hand back heterogeneous positional rows: JSON arrays
//! whose cells may be numbers, strings (decimal or sexagesimal), or null,
//! plus DataLab's CSV blobs. Everything is funneled into [`Detection`]
//! records here; rows whose coordinates cannot be normalized are skipped
//! and counted, never fatal to the batch.

use serde_json::Value;

use crossmatch::{parse_angle, Detection, ProperMotion, SkyPosition};

use crate::schema::{schema_for, CatalogSchema};

/// JSON object mapping catalog/table names to their raw query results.
pub type JsonTableMap = serde_json::Map<String, Value>;

/// Detections accepted from one event's tables, plus the count of rows
/// dropped as unparsable.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub detections: Vec<Detection>,
    pub skipped: usize,
}

impl IngestOutcome {
    fn absorb(&mut self, other: IngestOutcome) {
        self.detections.extend(other.detections);
        self.skipped += other.skipped;
    }
}

/// Non-coordinate key stored alongside catalog tables in the host files.
const SEARCH_RADIUS_KEY: &str = "search_radius";

fn numeric_cell(row: &[Value], idx: usize) -> Option<f64> {
    match row.get(idx)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coordinate cell in the schema's unit space: numbers pass through,
/// strings may be decimal or sexagesimal.
fn angle_cell(row: &[Value], idx: usize) -> Option<f64> {
    match row.get(idx)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_angle(s).ok(),
        _ => None,
    }
}

fn id_cell(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn detection_from_row(
    schema: &CatalogSchema,
    row: &[Value],
    event_position: &SkyPosition,
    scale_kpc_per_arcsec: f64,
) -> Option<Detection> {
    let ra = angle_cell(row, schema.ra_col)?;
    let dec = angle_cell(row, schema.dec_col)?;
    let position = SkyPosition::new(ra, schema.ra_unit, dec, schema.dec_unit).ok()?;
    let source_id = id_cell(row, schema.source_id_col)?;

    let proper_motion = schema.pm_cols.and_then(|(total_col, err_col)| {
        Some(ProperMotion {
            total_mas_yr: numeric_cell(row, total_col)?,
            total_err_mas_yr: numeric_cell(row, err_col)?,
        })
    });

    Some(Detection::new(
        schema.name,
        source_id,
        position,
        proper_motion,
        event_position,
        scale_kpc_per_arcsec,
    ))
}

/// Ingest one event's Vizier result tables.
///
/// Unknown table ids are skipped with a warning; rows that fail coordinate
/// or id extraction are dropped and counted.
pub fn ingest_vizier_tables(
    event_position: &SkyPosition,
    scale_kpc_per_arcsec: f64,
    tables: &JsonTableMap,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    for (table_id, rows) in tables {
        if table_id == SEARCH_RADIUS_KEY {
            continue;
        }
        let Some(schema) = schema_for(table_id) else {
            log::warn!("no schema for catalog table {table_id}, skipping");
            continue;
        };
        let Some(rows) = rows.as_array() else {
            log::warn!("catalog table {table_id} is not an array, skipping");
            continue;
        };

        for row in rows {
            let Some(cells) = row.as_array() else {
                outcome.skipped += 1;
                continue;
            };
            match detection_from_row(schema, cells, event_position, scale_kpc_per_arcsec) {
                Some(detection) => outcome.detections.push(detection),
                None => {
                    log::debug!("dropping unparsable {} record", schema.name);
                    outcome.skipped += 1;
                }
            }
        }
    }

    outcome
}

/// Parse a DataLab CSV blob into (source_id, ra_deg, dec_deg) rows.
///
/// The first line is a header; lines without exactly three fields or with
/// non-numeric coordinates are dropped.
pub fn parse_datalab_csv(blob: &str) -> Vec<(String, f64, f64)> {
    blob.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 3 {
                return None;
            }
            let ra: f64 = fields[1].trim().parse().ok()?;
            let dec: f64 = fields[2].trim().parse().ok()?;
            Some((fields[0].trim().to_string(), ra, dec))
        })
        .collect()
}

/// Ingest one event's DataLab tables (survey name mapped to a CSV blob,
/// coordinates always in decimal degrees).
pub fn ingest_datalab_tables(
    event_position: &SkyPosition,
    scale_kpc_per_arcsec: f64,
    tables: &JsonTableMap,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    for (survey, blob) in tables {
        let Some(blob) = blob.as_str() else {
            log::warn!("DataLab table {survey} is not a CSV string, skipping");
            continue;
        };

        for (source_id, ra, dec) in parse_datalab_csv(blob) {
            match SkyPosition::from_degrees(ra, dec) {
                Ok(position) => outcome.detections.push(Detection::new(
                    survey.as_str(),
                    source_id,
                    position,
                    None,
                    event_position,
                    scale_kpc_per_arcsec,
                )),
                Err(err) => {
                    log::debug!("dropping {survey} record: {err}");
                    outcome.skipped += 1;
                }
            }
        }
    }

    outcome
}

/// Merge every table for one event into a single detection list, sorted by
/// projected distance.
///
/// When `max_kpc` is set and the distance scale is defined, detections at
/// or beyond the cut are dropped (the ingestion-side prefilter). With an
/// undefined scale the cut is skipped: physical distances are meaningless
/// and the ranking stage will mark the event ambiguous anyway.
pub fn ingest_event_tables(
    event_position: &SkyPosition,
    scale_kpc_per_arcsec: f64,
    vizier: Option<&JsonTableMap>,
    datalab: Option<&JsonTableMap>,
    max_kpc: Option<f64>,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    if let Some(tables) = vizier {
        outcome.absorb(ingest_vizier_tables(
            event_position,
            scale_kpc_per_arcsec,
            tables,
        ));
    }
    if let Some(tables) = datalab {
        outcome.absorb(ingest_datalab_tables(
            event_position,
            scale_kpc_per_arcsec,
            tables,
        ));
    }

    if let Some(max_kpc) = max_kpc {
        if scale_kpc_per_arcsec > 0.0 {
            outcome
                .detections
                .retain(|d| d.physical_separation_kpc < max_kpc);
        }
    }

    outcome.detections.sort_by(|a, b| {
        (a.physical_separation_kpc, a.angular_separation_arcsec)
            .partial_cmp(&(b.physical_separation_kpc, b.angular_separation_arcsec))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn event() -> SkyPosition {
        SkyPosition::from_degrees(150.0, 20.0).unwrap()
    }

    fn as_map(value: Value) -> JsonTableMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_vizier_rows_become_detections() {
        let tables = as_map(json!({
            "search_radius": 30.0,
            "VII/233/xsc": [
                ["host-1", 0, 150.001, 20.001],
            ],
            "I/345/gaia2": [
                [150.002, 0.1, 20.002, 0.1, 4444, 1.0, 5.5, 0.3],
            ],
        }));

        let outcome = ingest_vizier_tables(&event(), 1.0, &tables);
        assert_eq!(outcome.detections.len(), 2);
        assert_eq!(outcome.skipped, 0);

        let xsc = outcome
            .detections
            .iter()
            .find(|d| d.catalog_name == "2MASS-XSC")
            .unwrap();
        assert_eq!(xsc.source_id, "host-1");
        assert!(xsc.proper_motion.is_none());
        assert!(xsc.angular_separation_arcsec > 0.0);
        assert_relative_eq!(
            xsc.physical_separation_kpc,
            xsc.angular_separation_arcsec,
            epsilon = 1e-12
        );

        let gaia = outcome
            .detections
            .iter()
            .find(|d| d.catalog_name == "Gaia2")
            .unwrap();
        assert_eq!(gaia.source_id, "4444");
        let pm = gaia.proper_motion.unwrap();
        assert_relative_eq!(pm.total_mas_yr, 5.5);
        assert_relative_eq!(pm.total_err_mas_yr, 0.3);
    }

    #[test]
    fn test_sexagesimal_hour_catalog_rows() {
        // HyperLEDA stores RA as a sexagesimal hour string.
        let tables = as_map(json!({
            "VII/237/pgc": [
                ["PGC 12345", "10 00 00.24", "+20 00 03.6"],
            ],
        }));

        let outcome = ingest_vizier_tables(&event(), 1.0, &tables);
        assert_eq!(outcome.detections.len(), 1);
        let det = &outcome.detections[0];
        assert_relative_eq!(det.position.ra_deg(), 150.001, epsilon = 1e-9);
        assert_relative_eq!(det.position.dec_deg(), 20.001, epsilon = 1e-9);
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let tables = as_map(json!({
            "VII/233/xsc": [
                ["ok", 0, 150.001, 20.001],
                ["bad-coord", 0, "not a coordinate", 20.0],
                ["bad-dec", 0, 150.0, 95.0],
                [null, 0, 150.0, 20.0],
                "not even a row",
            ],
        }));

        let outcome = ingest_vizier_tables(&event(), 1.0, &tables);
        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].source_id, "ok");
        assert_eq!(outcome.skipped, 4);
    }

    #[test]
    fn test_unknown_table_is_ignored() {
        let tables = as_map(json!({
            "VII/999/unknown": [["x", 150.0, 20.0]],
        }));
        let outcome = ingest_vizier_tables(&event(), 1.0, &tables);
        assert!(outcome.detections.is_empty());
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_gaia_without_motion_columns_still_ingests() {
        // Short row: coordinates and id present, pm columns missing.
        let tables = as_map(json!({
            "I/345/gaia2": [
                [150.001, 0.1, 20.001, 0.1, 7777],
            ],
        }));
        let outcome = ingest_vizier_tables(&event(), 1.0, &tables);
        assert_eq!(outcome.detections.len(), 1);
        assert!(outcome.detections[0].proper_motion.is_none());
    }

    #[test]
    fn test_datalab_csv_parsing() {
        let blob = "objid,ra,dec\nDES-1,150.001,20.001\nmalformed line\nDES-2,150.002,not-a-number\nDES-3,149.999,19.999\n";
        let rows = parse_datalab_csv(blob);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "DES-1");
        assert_eq!(rows[1].0, "DES-3");
    }

    #[test]
    fn test_datalab_tables_use_survey_name() {
        let tables = as_map(json!({
            "DES": "objid,ra,dec\n101,150.001,20.001\n",
            "LS": "ref_id,ra,dec\n202,150.002,20.002\n",
        }));
        let outcome = ingest_datalab_tables(&event(), 1.0, &tables);
        assert_eq!(outcome.detections.len(), 2);
        let names: Vec<&str> = outcome
            .detections
            .iter()
            .map(|d| d.catalog_name.as_str())
            .collect();
        assert!(names.contains(&"DES"));
        assert!(names.contains(&"LS"));
    }

    #[test]
    fn test_merged_ingest_sorts_and_prefilters() {
        let vizier = as_map(json!({
            "VII/233/xsc": [
                ["far", 0, 150.0, 20.02],   // 72 arcsec out
                ["near", 0, 150.0, 20.001], // 3.6 arcsec out
            ],
        }));
        let datalab = as_map(json!({
            "DES": "objid,ra,dec\nmid,150.0,20.003\n", // 10.8 arcsec out
        }));

        let outcome = ingest_event_tables(&event(), 1.0, Some(&vizier), Some(&datalab), Some(50.0));

        let ids: Vec<&str> = outcome
            .detections
            .iter()
            .map(|d| d.source_id.as_str())
            .collect();
        // "far" (~72 kpc at 1 kpc/arcsec) dropped by the 50 kpc prefilter,
        // survivors ordered nearest first.
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[test]
    fn test_prefilter_skipped_when_scale_undefined() {
        let vizier = as_map(json!({
            "VII/233/xsc": [
                ["far", 0, 150.0, 20.02],
            ],
        }));
        let outcome = ingest_event_tables(&event(), 0.0, Some(&vizier), None, Some(50.0));
        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].physical_separation_kpc, 0.0);
    }
}
