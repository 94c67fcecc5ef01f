//! Sky coordinate normalization and angular separation math.
//!
//! Every position entering the cross-matching engine passes through this
//! module: catalog records carry a mix of decimal degrees, decimal hours,
//! and sexagesimal strings, and all of them are canonicalized to a
//! [`SkyPosition`] in decimal degrees before any distance math runs.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arcseconds per degree.
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Degrees of right ascension per hour of hour angle.
const DEG_PER_HOUR: f64 = 15.0;

/// Errors raised while normalizing coordinate values.
///
/// All variants are fatal to the single record being parsed, never to the
/// surrounding batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    #[error("unrecognized angle unit tag: {0:?}")]
    InvalidUnit(String),

    #[error("unparsable angle value: {0:?}")]
    Unparsable(String),

    #[error("declination {0} out of range [-90, 90]")]
    DecOutOfRange(f64),
}

/// Angular unit of a raw catalog value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Hour angle, 24 hours to a full turn. Used for RA in several catalogs.
    Hour,
    /// Decimal degrees.
    Deg,
}

impl AngleUnit {
    /// Parse a textual unit tag as used by catalog schema tables.
    pub fn parse(tag: &str) -> Result<Self, CoordError> {
        match tag {
            "hour" => Ok(AngleUnit::Hour),
            "deg" => Ok(AngleUnit::Deg),
            other => Err(CoordError::InvalidUnit(other.to_string())),
        }
    }

    /// Convert a value expressed in this unit to decimal degrees.
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            AngleUnit::Hour => value * DEG_PER_HOUR,
            AngleUnit::Deg => value,
        }
    }
}

/// A sky position in canonical decimal degrees.
///
/// RA is wrapped to [0, 360) and Dec is validated to [-90, 90] at
/// construction; the fields are private so no raw-unit value can leak in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkyPosition {
    ra_deg: f64,
    dec_deg: f64,
}

impl SkyPosition {
    /// Build a position from raw (value, unit) pairs.
    pub fn new(
        ra: f64,
        ra_unit: AngleUnit,
        dec: f64,
        dec_unit: AngleUnit,
    ) -> Result<Self, CoordError> {
        if !ra.is_finite() {
            return Err(CoordError::Unparsable(format!("ra = {ra}")));
        }
        if !dec.is_finite() {
            return Err(CoordError::Unparsable(format!("dec = {dec}")));
        }

        let ra_deg = ra_unit.to_degrees(ra).rem_euclid(360.0);
        let dec_deg = dec_unit.to_degrees(dec);
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(CoordError::DecOutOfRange(dec_deg));
        }

        Ok(Self { ra_deg, dec_deg })
    }

    /// Build a position already expressed in decimal degrees.
    pub fn from_degrees(ra_deg: f64, dec_deg: f64) -> Result<Self, CoordError> {
        Self::new(ra_deg, AngleUnit::Deg, dec_deg, AngleUnit::Deg)
    }

    /// Parse an (RA, Dec) string pair as found in the candidate event list:
    /// RA in hours (sexagesimal or decimal), Dec in degrees.
    pub fn parse_hour_deg(ra: &str, dec: &str) -> Result<Self, CoordError> {
        let ra_hours = parse_angle(ra)?;
        let dec_deg = parse_angle(dec)?;
        Self::new(ra_hours, AngleUnit::Hour, dec_deg, AngleUnit::Deg)
    }

    /// Right ascension in decimal degrees, in [0, 360).
    pub fn ra_deg(&self) -> f64 {
        self.ra_deg
    }

    /// Declination in decimal degrees, in [-90, 90].
    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }
}

/// Parse a scalar angle from a catalog string.
///
/// Accepts plain decimals ("150.0208", "-2.5") and sexagesimal triples
/// separated by colons or whitespace ("10 00 00.5", "-20:30:00"). The sign
/// of the leading component applies to the whole value.
pub fn parse_angle(text: &str) -> Result<f64, CoordError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoordError::Unparsable(text.to_string()));
    }

    let parts: Vec<&str> = trimmed
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(CoordError::Unparsable(text.to_string()));
    }

    let lead: f64 = parts[0]
        .parse()
        .map_err(|_| CoordError::Unparsable(text.to_string()))?;
    let negative = parts[0].starts_with('-');

    let mut magnitude = lead.abs();
    let mut scale = 1.0 / 60.0;
    for part in &parts[1..] {
        let v: f64 = part
            .parse()
            .map_err(|_| CoordError::Unparsable(text.to_string()))?;
        if v < 0.0 {
            // only the leading component may carry a sign
            return Err(CoordError::Unparsable(text.to_string()));
        }
        magnitude += v * scale;
        scale /= 60.0;
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// Great-circle separation between two positions, in arcseconds.
///
/// Haversine form: symmetric, and well conditioned at the small separations
/// (arcseconds) the clustering engine cares about.
pub fn angular_separation_arcsec(a: &SkyPosition, b: &SkyPosition) -> f64 {
    let ra1 = a.ra_deg().to_radians();
    let dec1 = a.dec_deg().to_radians();
    let ra2 = b.ra_deg().to_radians();
    let dec2 = b.dec_deg().to_radians();

    let sin_ddec = ((dec2 - dec1) / 2.0).sin();
    let sin_dra = ((ra2 - ra1) / 2.0).sin();
    let h = sin_ddec * sin_ddec + dec1.cos() * dec2.cos() * sin_dra * sin_dra;

    2.0 * h.sqrt().asin().to_degrees() * ARCSEC_PER_DEG
}

/// Local tangent-plane offset of `p` from `center`, in arcseconds.
///
/// Returns (dRA * cos(dec_center), dDec). The RA difference is wrapped to
/// [-180, 180] degrees so detections straddling RA = 0 project correctly.
pub fn tangent_plane_offset(center: &SkyPosition, p: &SkyPosition) -> Vector2<f64> {
    let mut dra = p.ra_deg() - center.ra_deg();
    if dra > 180.0 {
        dra -= 360.0;
    } else if dra < -180.0 {
        dra += 360.0;
    }

    let cos_dec = center.dec_deg().to_radians().cos();
    Vector2::new(
        dra * cos_dec * ARCSEC_PER_DEG,
        (p.dec_deg() - center.dec_deg()) * ARCSEC_PER_DEG,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_unit_tag_parsing() {
        assert_eq!(AngleUnit::parse("hour").unwrap(), AngleUnit::Hour);
        assert_eq!(AngleUnit::parse("deg").unwrap(), AngleUnit::Deg);
        assert!(matches!(
            AngleUnit::parse("rad"),
            Err(CoordError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_hour_angle_conversion() {
        // 10h RA is 150 degrees
        let pos = SkyPosition::new(10.0, AngleUnit::Hour, 20.0, AngleUnit::Deg).unwrap();
        assert_relative_eq!(pos.ra_deg(), 150.0);
        assert_relative_eq!(pos.dec_deg(), 20.0);
    }

    #[test]
    fn test_ra_wraps_to_positive_range() {
        let pos = SkyPosition::from_degrees(-10.0, 0.0).unwrap();
        assert_relative_eq!(pos.ra_deg(), 350.0);

        let pos = SkyPosition::from_degrees(370.0, 0.0).unwrap();
        assert_relative_eq!(pos.ra_deg(), 10.0);
    }

    #[test]
    fn test_dec_out_of_range_rejected() {
        assert!(matches!(
            SkyPosition::from_degrees(10.0, 91.0),
            Err(CoordError::DecOutOfRange(_))
        ));
        assert!(matches!(
            SkyPosition::from_degrees(10.0, -90.5),
            Err(CoordError::DecOutOfRange(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(SkyPosition::from_degrees(f64::NAN, 0.0).is_err());
        assert!(SkyPosition::from_degrees(0.0, f64::INFINITY).is_err());
    }

    #[rstest]
    #[case("150.0208", 150.0208)]
    #[case("10 00 00", 10.0)]
    #[case("10:30:00", 10.5)]
    #[case("-20 30 00", -20.5)]
    #[case("+05 15 00.0", 5.25)]
    #[case("12 30", 12.5)]
    fn test_parse_angle(#[case] text: &str, #[case] expected: f64) {
        assert_relative_eq!(parse_angle(text).unwrap(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case("")]
    #[case("ten hours")]
    #[case("10 00 00 00")]
    #[case("10 -30 00")]
    fn test_parse_angle_rejects(#[case] text: &str) {
        assert!(matches!(parse_angle(text), Err(CoordError::Unparsable(_))));
    }

    #[test]
    fn test_parse_hour_deg_event_coordinates() {
        let pos = SkyPosition::parse_hour_deg("10 00 00.00", "+20 00 00.0").unwrap();
        assert_relative_eq!(pos.ra_deg(), 150.0, epsilon = 1e-9);
        assert_relative_eq!(pos.dec_deg(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_separation_symmetric_and_zero_at_identity() {
        let a = SkyPosition::from_degrees(150.0, 20.0).unwrap();
        let b = SkyPosition::from_degrees(150.01, 20.005).unwrap();

        let ab = angular_separation_arcsec(&a, &b);
        let ba = angular_separation_arcsec(&b, &a);
        assert_relative_eq!(ab, ba, epsilon = 1e-9);
        assert!(ab > 0.0);

        assert_relative_eq!(angular_separation_arcsec(&a, &a), 0.0);
    }

    #[test]
    fn test_separation_small_angle_value() {
        // 10 arcsec offset in pure declination
        let a = SkyPosition::from_degrees(150.0, 20.0).unwrap();
        let b = SkyPosition::from_degrees(150.0, 20.0 + 10.0 / ARCSEC_PER_DEG).unwrap();
        assert_relative_eq!(angular_separation_arcsec(&a, &b), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_separation_includes_cos_dec_compression() {
        // 1 degree of RA at dec 60 spans ~0.5 degrees on the sky
        let a = SkyPosition::from_degrees(100.0, 60.0).unwrap();
        let b = SkyPosition::from_degrees(101.0, 60.0).unwrap();
        let sep_deg = angular_separation_arcsec(&a, &b) / ARCSEC_PER_DEG;
        assert_relative_eq!(sep_deg, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_tangent_plane_offset_components() {
        let center = SkyPosition::from_degrees(150.0, 60.0).unwrap();
        let p = SkyPosition::from_degrees(150.0 + 2.0 / ARCSEC_PER_DEG, 60.0 + 3.0 / ARCSEC_PER_DEG)
            .unwrap();

        let off = tangent_plane_offset(&center, &p);
        assert_relative_eq!(off.x, 2.0 * 60f64.to_radians().cos(), epsilon = 1e-6);
        assert_relative_eq!(off.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tangent_plane_offset_wraps_ra_zero() {
        let center = SkyPosition::from_degrees(359.999, 0.0).unwrap();
        let p = SkyPosition::from_degrees(0.001, 0.0).unwrap();

        let off = tangent_plane_offset(&center, &p);
        // 0.002 degrees eastward, not ~360 degrees westward
        assert_relative_eq!(off.x, 0.002 * ARCSEC_PER_DEG, epsilon = 1e-6);
    }
}
