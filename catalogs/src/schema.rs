//! Column layouts for the searched source catalogs.
//!
//! Each catalog query returns positional rows; the indices below say where
//! the coordinates, the source identifier, and (where available) the
//! proper motion live, and which angular unit the coordinates use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crossmatch::AngleUnit;

/// Column layout of one catalog's rows.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSchema {
    /// Vizier table identifier, e.g. "VII/233/xsc".
    pub table_id: &'static str,
    /// Human-readable catalog name used in downstream output.
    pub name: &'static str,
    pub ra_col: usize,
    pub dec_col: usize,
    pub ra_unit: AngleUnit,
    pub dec_unit: AngleUnit,
    pub source_id_col: usize,
    /// (total, error) proper-motion columns in mas/yr, for catalogs with
    /// astrometric baselines.
    pub pm_cols: Option<(usize, usize)>,
}

/// The catalogs searched around each event.
pub static VIZIER_CATALOGS: &[CatalogSchema] = &[
    CatalogSchema {
        table_id: "II/246/out",
        name: "2MASS-PSC",
        ra_col: 0,
        dec_col: 1,
        ra_unit: AngleUnit::Deg,
        dec_unit: AngleUnit::Deg,
        source_id_col: 2,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "VII/233/xsc",
        name: "2MASS-XSC",
        ra_col: 2,
        dec_col: 3,
        ra_unit: AngleUnit::Deg,
        dec_unit: AngleUnit::Deg,
        source_id_col: 0,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "II/349/ps1",
        name: "PS1",
        ra_col: 0,
        dec_col: 1,
        ra_unit: AngleUnit::Deg,
        dec_unit: AngleUnit::Deg,
        source_id_col: 2,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "VII/237/pgc",
        name: "HyperLEDA",
        ra_col: 1,
        dec_col: 2,
        ra_unit: AngleUnit::Hour,
        dec_unit: AngleUnit::Deg,
        source_id_col: 0,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "V/147/sdss12",
        name: "SDSS",
        ra_col: 0,
        dec_col: 1,
        ra_unit: AngleUnit::Deg,
        dec_unit: AngleUnit::Deg,
        source_id_col: 5,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "VII/259/6dfgs",
        name: "6dFGS",
        ra_col: 13,
        dec_col: 14,
        ra_unit: AngleUnit::Hour,
        dec_unit: AngleUnit::Deg,
        source_id_col: 0,
        pm_cols: None,
    },
    CatalogSchema {
        table_id: "I/345/gaia2",
        name: "Gaia2",
        ra_col: 0,
        dec_col: 2,
        ra_unit: AngleUnit::Deg,
        dec_unit: AngleUnit::Deg,
        source_id_col: 4,
        pm_cols: Some((6, 7)),
    },
];

/// Catalog display preference for a cross-matched group, most trusted
/// astrometry first. Includes the DataLab surveys, which have no Vizier
/// schema entry.
pub static ASTROMETRY_PREFERENCE: &[&str] = &[
    "HyperLEDA",
    "2MASS-XSC",
    "2MASS-PSC",
    "SDSS",
    "PS1",
    "DES",
    "LS",
    "6dFGS",
    "Gaia2",
];

static BY_TABLE_ID: Lazy<HashMap<&'static str, &'static CatalogSchema>> = Lazy::new(|| {
    VIZIER_CATALOGS
        .iter()
        .map(|schema| (schema.table_id, schema))
        .collect()
});

/// Look up a catalog layout by its Vizier table identifier.
pub fn schema_for(table_id: &str) -> Option<&'static CatalogSchema> {
    BY_TABLE_ID.get(table_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_table_id() {
        let schema = schema_for("VII/233/xsc").unwrap();
        assert_eq!(schema.name, "2MASS-XSC");
        assert_eq!((schema.ra_col, schema.dec_col), (2, 3));

        assert!(schema_for("VII/999/nope").is_none());
    }

    #[test]
    fn test_hour_unit_catalogs() {
        for table_id in ["VII/237/pgc", "VII/259/6dfgs"] {
            let schema = schema_for(table_id).unwrap();
            assert_eq!(schema.ra_unit, AngleUnit::Hour);
            assert_eq!(schema.dec_unit, AngleUnit::Deg);
        }
    }

    #[test]
    fn test_only_gaia_carries_proper_motion() {
        for schema in VIZIER_CATALOGS {
            if schema.name == "Gaia2" {
                assert!(schema.pm_cols.is_some());
            } else {
                assert!(schema.pm_cols.is_none());
            }
        }
    }

    #[test]
    fn test_preference_order_covers_every_catalog_name() {
        for schema in VIZIER_CATALOGS {
            assert!(
                ASTROMETRY_PREFERENCE.contains(&schema.name),
                "{} missing from preference order",
                schema.name
            );
        }
    }
}
