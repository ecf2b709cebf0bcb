//! Orbital-similarity scoring
//!
//! Detects co-orbital shadowing: a foreign satellite deliberately mirroring
//! the orbital plane of an allied asset. Lower divergence means more
//! similar orbits and therefore higher suspicion.

use uuid::Uuid;

use crate::bayes;
use crate::{Severity, SimilarityPattern, SimilarityThreat, TrackedObject};

#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    /// Inclination delta normalizer (deg)
    pub inclination_scale_deg: f64,
    /// Altitude delta normalizer (km)
    pub altitude_scale_km: f64,
    /// Divergence below which severity is threatened
    pub threatened_divergence: f64,
    /// Divergence below which severity is watched
    pub watched_divergence: f64,
    /// Pattern cutoffs
    pub coplanar_max_inc_deg: f64,
    pub coplanar_max_alt_km: f64,
    pub coaltitude_max_alt_km: f64,
    pub coinclination_max_inc_deg: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            inclination_scale_deg: 10.0,
            altitude_scale_km: 100.0,
            threatened_divergence: 0.05,
            watched_divergence: 0.15,
            coplanar_max_inc_deg: 2.0,
            coplanar_max_alt_km: 20.0,
            coaltitude_max_alt_km: 30.0,
            coinclination_max_inc_deg: 5.0,
        }
    }
}

/// Normalized divergence metric in [0, 1]; zero means the orbits coincide.
pub fn orbital_divergence(d_inc_deg: f64, d_alt_km: f64, cfg: &SimilarityConfig) -> f64 {
    let di = d_inc_deg / cfg.inclination_scale_deg;
    let da = d_alt_km / cfg.altitude_scale_km;
    (di * di + da * da).sqrt().min(1.0)
}

/// Score how closely `subject`'s orbit matches `counterpart`'s.
pub fn score_similarity(
    subject: &TrackedObject,
    counterpart: &TrackedObject,
    cfg: &SimilarityConfig,
) -> SimilarityThreat {
    let d_inc = (subject.elements.inclination_deg - counterpart.elements.inclination_deg).abs();
    let d_alt = (subject.elements.altitude_km - counterpart.elements.altitude_km).abs();
    let divergence = orbital_divergence(d_inc, d_alt, cfg);

    let pattern = if d_inc < cfg.coplanar_max_inc_deg && d_alt < cfg.coplanar_max_alt_km {
        SimilarityPattern::CoPlanar
    } else if d_alt < cfg.coaltitude_max_alt_km {
        SimilarityPattern::CoAltitude
    } else if d_inc < cfg.coinclination_max_inc_deg {
        SimilarityPattern::CoInclination
    } else {
        SimilarityPattern::Shadowing
    };

    let severity = if divergence < cfg.threatened_divergence {
        Severity::Threatened
    } else if divergence < cfg.watched_divergence {
        Severity::Watched
    } else {
        Severity::Nominal
    };

    let prior = bayes::prior(subject.country_code.as_deref(), subject.rcs_size.as_deref());
    let lr = bayes::likelihood_ratio(divergence, &bayes::DIVERGENCE_THREAT, &bayes::DIVERGENCE_BENIGN);
    let confidence = bayes::posterior(prior, lr);

    SimilarityThreat {
        id: format!("osim-{}", Uuid::new_v4()),
        subject_id: subject.id.clone(),
        counterpart_id: counterpart.id.clone(),
        severity,
        confidence,
        inclination_diff_deg: d_inc,
        altitude_diff_km: d_alt,
        divergence,
        pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classification;
    use orbit_propagation::{generate_trajectory, OrbitalElements};

    fn object(id: &str, inc: f64, alt: f64, raan: f64, country: &str) -> TrackedObject {
        let elements = OrbitalElements::new(inc, alt, raan, 0.0).unwrap();
        TrackedObject {
            id: id.into(),
            name: id.to_uppercase(),
            classification: Classification::Foreign,
            country_code: Some(country.into()),
            rcs_size: None,
            trajectory: generate_trajectory(&elements),
            elements,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_near_identical_orbits_are_coplanar_threat() {
        // 500 km both, inclination delta 0.2 deg, RAAN delta 1 deg
        let cfg = SimilarityConfig::default();
        let foreign = object("sat-25", 63.6, 500.0, 143.0, "PRC");
        let asset = object("sat-6", 63.4, 500.0, 142.0, "USA");

        let rec = score_similarity(&foreign, &asset, &cfg);
        assert!(rec.divergence < 0.05, "divergence {}", rec.divergence);
        assert_eq!(rec.severity, Severity::Threatened);
        assert_eq!(rec.pattern, SimilarityPattern::CoPlanar);
        assert!(rec.confidence > 0.5, "confidence {}", rec.confidence);
    }

    #[test]
    fn test_identical_orbits_clamp_confidence() {
        let cfg = SimilarityConfig::default();
        let foreign = object("sat-25", 63.4, 500.0, 0.0, "RUS");
        let asset = object("sat-6", 63.4, 500.0, 142.0, "USA");

        let rec = score_similarity(&foreign, &asset, &cfg);
        assert_eq!(rec.divergence, 0.0);
        assert_eq!(rec.confidence, 1.0);
    }

    #[test]
    fn test_divergent_orbits_are_nominal() {
        let cfg = SimilarityConfig::default();
        let foreign = object("sat-25", 97.5, 780.0, 10.0, "PRC");
        let asset = object("sat-6", 51.6, 420.0, 142.0, "USA");

        let rec = score_similarity(&foreign, &asset, &cfg);
        assert_eq!(rec.divergence, 1.0);
        assert_eq!(rec.severity, Severity::Nominal);
        assert_eq!(rec.pattern, SimilarityPattern::Shadowing);
        assert!(rec.confidence < 0.05, "confidence {}", rec.confidence);
    }

    #[test]
    fn test_pattern_rules() {
        let cfg = SimilarityConfig::default();
        // altitude matched, plane not
        let rec = score_similarity(
            &object("a", 80.0, 500.0, 0.0, "PRC"),
            &object("b", 63.4, 510.0, 0.0, "USA"),
            &cfg,
        );
        assert_eq!(rec.pattern, SimilarityPattern::CoAltitude);

        // inclination matched, altitude not
        let rec = score_similarity(
            &object("a", 63.5, 900.0, 0.0, "PRC"),
            &object("b", 63.4, 500.0, 0.0, "USA"),
            &cfg,
        );
        assert_eq!(rec.pattern, SimilarityPattern::CoInclination);
    }
}
