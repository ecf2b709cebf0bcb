//! GEO-belt loiter scoring
//!
//! Flags adversarial satellites holding station in the geosynchronous belt
//! with a coverage footprint over a protected longitude sector. Runs per
//! object, not per pair: the footprint threatens the sector itself, no
//! single asset is the counterpart.
//!
//! The orbit model's ground tracks do not co-rotate with the Earth, so a
//! geostationary object's assigned station longitude is read from its
//! ascending node rather than sampled off the track.

use chrono::Utc;
use orbit_propagation::wrap_longitude;
use uuid::Uuid;

use crate::bayes;
use crate::{AnomalyKind, AnomalyThreat, Severity, TrackedObject};

// Base scores by regime and footprint, carried into both the confidence
// and the deviation fields of the emitted record.
const GEOSTATIONARY_IN_SECTOR_SCORE: f64 = 0.85;
const GEOSTATIONARY_OUT_SECTOR_SCORE: f64 = 0.2;
const GEOSYNC_IN_SECTOR_SCORE: f64 = 0.6;
const GEOSYNC_OUT_SECTOR_SCORE: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct GeoLoiterConfig {
    /// Altitude band that counts as the geosynchronous belt (km)
    pub belt_min_altitude_km: f64,
    pub belt_max_altitude_km: f64,
    /// Inclination at or below which the orbit reads as geostationary (deg)
    pub geostationary_max_inclination_deg: f64,
    /// Protected longitude sector, west to east (deg)
    pub sector_lon_min_deg: f64,
    pub sector_lon_max_deg: f64,
    /// Latitude band used for the inclined-orbit dwell count (deg)
    pub sector_lat_min_deg: f64,
    pub sector_lat_max_deg: f64,
    /// Track fraction over the sector that flags an inclined geosync orbit
    pub dwell_fraction_cutoff: f64,
    /// Score at or above which severity is threatened
    pub threatened_score: f64,
    /// Score at or above which severity is watched
    pub watched_score: f64,
}

impl Default for GeoLoiterConfig {
    fn default() -> Self {
        Self {
            belt_min_altitude_km: 35_500.0,
            belt_max_altitude_km: 36_200.0,
            geostationary_max_inclination_deg: 8.0,
            // Americas belt arc whose footprint covers the continental US
            sector_lon_min_deg: -130.0,
            sector_lon_max_deg: -60.0,
            sector_lat_min_deg: 24.0,
            sector_lat_max_deg: 55.0,
            dwell_fraction_cutoff: 0.25,
            threatened_score: 0.6,
            watched_score: 0.3,
        }
    }
}

/// Assess one object for GEO-belt loitering. Returns `None` for objects
/// outside the threat model's country set or outside the belt.
pub fn score_geo_loiter(object: &TrackedObject, cfg: &GeoLoiterConfig) -> Option<AnomalyThreat> {
    if !bayes::adversarial(object.country_code.as_deref()) {
        return None;
    }
    let altitude = object.elements.altitude_km;
    if altitude < cfg.belt_min_altitude_km || altitude > cfg.belt_max_altitude_km {
        return None;
    }

    let station_lon = wrap_longitude(object.elements.raan_deg);
    let in_sector = lon_in_sector(station_lon, cfg);
    let geostationary =
        object.elements.inclination_deg.abs() <= cfg.geostationary_max_inclination_deg;
    let dwell = dwell_fraction(object, cfg);

    let (score, description) = if geostationary {
        if in_sector {
            (
                GEOSTATIONARY_IN_SECTOR_SCORE,
                format!(
                    "{} is geostationary at {:.1} deg longitude with a coverage \
                     footprint over the protected sector.",
                    object.name, station_lon
                ),
            )
        } else {
            (
                GEOSTATIONARY_OUT_SECTOR_SCORE,
                format!(
                    "{} is an adversarial geostationary asset stationed at {:.1} deg, \
                     outside the protected sector.",
                    object.name, station_lon
                ),
            )
        }
    } else if dwell > cfg.dwell_fraction_cutoff || in_sector {
        (
            GEOSYNC_IN_SECTOR_SCORE,
            format!(
                "{} is in an inclined geosynchronous orbit dwelling over protected \
                 longitudes ({:.0}% of track).",
                object.name,
                dwell * 100.0
            ),
        )
    } else {
        (
            GEOSYNC_OUT_SECTOR_SCORE,
            format!(
                "{} is in an inclined geosynchronous orbit clear of the protected sector.",
                object.name
            ),
        )
    };

    let severity = if score >= cfg.threatened_score {
        Severity::Threatened
    } else if score >= cfg.watched_score {
        Severity::Watched
    } else {
        Severity::Nominal
    };

    Some(AnomalyThreat {
        id: format!("geo-{}", Uuid::new_v4()),
        subject_id: object.id.clone(),
        severity,
        confidence: score,
        kind: AnomalyKind::GeoLoiter,
        deviation: score,
        description,
        detected_at: Utc::now(),
    })
}

fn lon_in_sector(lon: f64, cfg: &GeoLoiterConfig) -> bool {
    (cfg.sector_lon_min_deg..=cfg.sector_lon_max_deg).contains(&lon)
}

/// Fraction of stored track samples whose subsatellite point falls inside
/// the protected latitude/longitude box.
fn dwell_fraction(object: &TrackedObject, cfg: &GeoLoiterConfig) -> f64 {
    let points = object.trajectory.points();
    let over = points
        .iter()
        .filter(|p| {
            (cfg.sector_lat_min_deg..=cfg.sector_lat_max_deg).contains(&p.latitude_deg)
                && lon_in_sector(wrap_longitude(p.longitude_deg), cfg)
        })
        .count();
    over as f64 / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classification;
    use orbit_propagation::{generate_trajectory, OrbitalElements};

    fn object(inc: f64, alt: f64, raan: f64, country: &str) -> TrackedObject {
        let elements = OrbitalElements::new(inc, alt, raan, 0.0).unwrap();
        TrackedObject {
            id: "sat-31".into(),
            name: "LUCH (OLYMP-K)".into(),
            classification: Classification::Foreign,
            country_code: Some(country.into()),
            rcs_size: Some("LARGE".into()),
            trajectory: generate_trajectory(&elements),
            elements,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_leo_object_out_of_regime() {
        let cfg = GeoLoiterConfig::default();
        assert!(score_geo_loiter(&object(63.4, 500.0, 142.0, "RUS"), &cfg).is_none());
    }

    #[test]
    fn test_allied_geo_object_not_assessed() {
        let cfg = GeoLoiterConfig::default();
        assert!(score_geo_loiter(&object(0.05, 35_786.0, 285.0, "USA"), &cfg).is_none());
    }

    #[test]
    fn test_geostationary_over_sector_is_threatened() {
        let cfg = GeoLoiterConfig::default();
        // RAAN 285 wraps to a -75 deg station slot, inside the Americas arc
        let rec = score_geo_loiter(&object(0.1, 35_786.0, 285.0, "RUS"), &cfg).unwrap();
        assert_eq!(rec.severity, Severity::Threatened);
        assert_eq!(rec.kind, AnomalyKind::GeoLoiter);
        assert!((rec.confidence - 0.85).abs() < 1e-9);
        assert_eq!(rec.subject_id, "sat-31");
    }

    #[test]
    fn test_geostationary_outside_sector_is_nominal() {
        let cfg = GeoLoiterConfig::default();
        // Station slot at 75 deg east, far from the protected arc
        let rec = score_geo_loiter(&object(0.1, 35_786.0, 75.0, "RUS"), &cfg).unwrap();
        assert_eq!(rec.severity, Severity::Nominal);
        assert!((rec.confidence - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_inclined_geosync_over_sector_is_threatened() {
        let cfg = GeoLoiterConfig::default();
        let rec = score_geo_loiter(&object(12.0, 35_790.0, 290.0, "PRC"), &cfg).unwrap();
        assert_eq!(rec.severity, Severity::Threatened);
        assert!((rec.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_inclined_geosync_clear_of_sector_is_nominal() {
        let cfg = GeoLoiterConfig::default();
        let rec = score_geo_loiter(&object(12.0, 35_790.0, 160.0, "PRC"), &cfg).unwrap();
        assert_eq!(rec.severity, Severity::Nominal);
        assert!((rec.confidence - 0.25).abs() < 1e-9);
    }
}
