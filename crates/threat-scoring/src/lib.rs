//! Threat Scoring Library
//!
//! Per-pair threat scorers for the Orbital Shield engine: conjunction/
//! proximity, signal interception, orbital similarity, and behavioral
//! anomaly, plus max-pooling risk aggregation.
//!
//! Scorers are pure functions over the current tick's object snapshot.
//! Records are recomputed wholesale each evaluation tick; stale records are
//! discarded, never updated in place.

use chrono::{DateTime, Utc};
use orbit_propagation::{OrbitalElements, Trajectory};
use serde::{Deserialize, Serialize};

pub mod anomaly;
pub mod bayes;
pub mod geo;
pub mod proximity;
pub mod risk;
pub mod signal;
pub mod similarity;

pub use anomaly::{score_anomaly, AnomalyConfig, Baseline, ObservedEvent};
pub use geo::{score_geo_loiter, GeoLoiterConfig};
pub use proximity::{score_proximity, ProximityConfig};
pub use risk::aggregate;
pub use signal::{score_signal_intercept, GroundStation, SignalConfig};
pub use similarity::{score_similarity, SimilarityConfig};

/// Ownership classification of a tracked object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Asset we own and defend
    Asset,
    /// Foreign catalog object
    Foreign,
    /// Uncatalogued / unattributed
    Unknown,
}

/// A catalogued object under evaluation: identity, current elements and
/// ground track, and opaque health/capability metadata the engine only
/// relays to downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    pub id: String,
    pub name: String,
    pub classification: Classification,
    pub country_code: Option<String>,
    pub rcs_size: Option<String>,
    pub elements: OrbitalElements,
    pub trajectory: Trajectory,
    /// Opaque relay fields (health subsystems, maneuver budget, notes)
    pub metadata: serde_json::Value,
}

/// Severity tier, ordered nominal < watched < threatened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Nominal,
    Watched,
    Threatened,
}

/// Proximity approach-pattern classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ApproachPattern {
    CoOrbital,
    Drift,
    Direct,
    SunHiding,
}

/// Orbital-similarity pattern classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityPattern {
    CoPlanar,
    CoAltitude,
    CoInclination,
    Shadowing,
}

/// Observed anomaly kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    UnexpectedManeuver,
    OrientationChange,
    PointingChange,
    OrbitRaise,
    OrbitLower,
    RfEmission,
    GeoLoiter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityThreat {
    pub id: String,
    /// The approaching foreign object
    pub subject_id: String,
    /// The asset being approached
    pub counterpart_id: String,
    pub severity: Severity,
    pub confidence: f64,
    pub miss_distance_km: f64,
    pub tca_minutes: f64,
    pub approach_velocity_kms: f64,
    pub pattern: ApproachPattern,
    pub sun_hiding_detected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalThreat {
    pub id: String,
    pub interceptor_id: String,
    pub asset_id: String,
    pub ground_station: String,
    pub severity: Severity,
    pub confidence: f64,
    pub interception_probability: f64,
    pub signal_path_angle_deg: f64,
    pub windows_at_risk: usize,
    pub total_windows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityThreat {
    pub id: String,
    pub subject_id: String,
    pub counterpart_id: String,
    pub severity: Severity,
    pub confidence: f64,
    pub inclination_diff_deg: f64,
    pub altitude_diff_km: f64,
    pub divergence: f64,
    pub pattern: SimilarityPattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyThreat {
    pub id: String,
    pub subject_id: String,
    pub severity: Severity,
    pub confidence: f64,
    pub kind: AnomalyKind,
    pub deviation: f64,
    pub description: String,
    pub detected_at: DateTime<Utc>,
}

/// One threat signal. Variants have disjoint metrics; the aggregator only
/// needs the uniform projection below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ThreatRecord {
    Proximity(ProximityThreat),
    SignalIntercept(SignalThreat),
    OrbitalSimilarity(SimilarityThreat),
    Anomaly(AnomalyThreat),
}

impl ThreatRecord {
    /// The object this record is about (the suspicious actor).
    pub fn subject_id(&self) -> &str {
        match self {
            Self::Proximity(t) => &t.subject_id,
            Self::SignalIntercept(t) => &t.interceptor_id,
            Self::OrbitalSimilarity(t) => &t.subject_id,
            Self::Anomaly(t) => &t.subject_id,
        }
    }

    /// The asset on the receiving end, when the variant has one.
    pub fn counterpart_id(&self) -> Option<&str> {
        match self {
            Self::Proximity(t) => Some(&t.counterpart_id),
            Self::SignalIntercept(t) => Some(&t.asset_id),
            Self::OrbitalSimilarity(t) => Some(&t.counterpart_id),
            Self::Anomaly(_) => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Proximity(t) => t.severity,
            Self::SignalIntercept(t) => t.severity,
            Self::OrbitalSimilarity(t) => t.severity,
            Self::Anomaly(t) => t.severity,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Self::Proximity(t) => t.confidence,
            Self::SignalIntercept(t) => t.confidence,
            Self::OrbitalSimilarity(t) => t.confidence,
            Self::Anomaly(t) => t.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Nominal < Severity::Watched);
        assert!(Severity::Watched < Severity::Threatened);
    }

    #[test]
    fn test_record_projection() {
        let rec = ThreatRecord::OrbitalSimilarity(SimilarityThreat {
            id: "osim-1".into(),
            subject_id: "sat-25".into(),
            counterpart_id: "sat-6".into(),
            severity: Severity::Threatened,
            confidence: 0.9,
            inclination_diff_deg: 0.2,
            altitude_diff_km: 0.0,
            divergence: 0.02,
            pattern: SimilarityPattern::CoPlanar,
        });
        assert_eq!(rec.subject_id(), "sat-25");
        assert_eq!(rec.counterpart_id(), Some("sat-6"));
        assert_eq!(rec.severity(), Severity::Threatened);
    }
}
