//! Behavioral anomaly scoring
//!
//! Scores a discrete observed event (maneuver, pointing change, orbit
//! shift, RF emission) against the object's stored baseline envelope.
//! Events inside the envelope produce no record: a filter, not an error.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AnomalyKind, AnomalyThreat, Severity, TrackedObject};

/// A discrete observation attributed to one object.
#[derive(Debug, Clone)]
pub struct ObservedEvent {
    pub kind: AnomalyKind,
    /// Maneuver magnitude (m/s), for maneuver/orbit-shift kinds
    pub delta_v_ms: f64,
    /// Attitude/pointing excursion (deg)
    pub pointing_change_deg: f64,
    /// Apogee/perigee shift (km)
    pub altitude_shift_km: f64,
    pub detected_at: DateTime<Utc>,
}

/// Expected behavior envelope for one object.
#[derive(Debug, Clone)]
pub struct Baseline {
    /// Station-keeping delta-v envelope (m/s)
    pub max_delta_v_ms: f64,
    /// Nominal pointing excursion (deg)
    pub max_pointing_change_deg: f64,
    /// Nominal altitude drift (km)
    pub max_altitude_shift_km: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            max_delta_v_ms: 0.5,
            max_pointing_change_deg: 10.0,
            max_altitude_shift_km: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    /// Deviations below this produce no record
    pub min_deviation: f64,
    pub threatened_deviation: f64,
    pub watched_deviation: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_deviation: 0.15,
            threatened_deviation: 0.7,
            watched_deviation: 0.4,
        }
    }
}

/// Score one observed event against the object's baseline. Returns `None`
/// when the deviation stays under the reporting threshold.
pub fn score_anomaly(
    object: &TrackedObject,
    event: &ObservedEvent,
    baseline: &Baseline,
    cfg: &AnomalyConfig,
) -> Option<AnomalyThreat> {
    let deviation = deviation_for(event, baseline);
    if deviation < cfg.min_deviation {
        return None;
    }

    let severity = if deviation > cfg.threatened_deviation {
        Severity::Threatened
    } else if deviation > cfg.watched_deviation {
        Severity::Watched
    } else {
        Severity::Nominal
    };

    Some(AnomalyThreat {
        id: format!("anom-{}", Uuid::new_v4()),
        subject_id: object.id.clone(),
        severity,
        confidence: (0.5 + 0.45 * deviation).clamp(0.0, 1.0),
        kind: event.kind,
        deviation,
        description: describe(&object.name, event),
        detected_at: event.detected_at,
    })
}

/// Normalized deviation in [0, 1]: how far the event exceeds the baseline
/// envelope, saturating at twice the envelope.
pub(crate) fn deviation_for(event: &ObservedEvent, baseline: &Baseline) -> f64 {
    let ratio = |value: f64, limit: f64| {
        if limit <= 0.0 {
            return 1.0;
        }
        ((value - limit) / limit).clamp(0.0, 1.0)
    };

    match event.kind {
        AnomalyKind::UnexpectedManeuver => ratio(event.delta_v_ms, baseline.max_delta_v_ms),
        AnomalyKind::OrientationChange | AnomalyKind::PointingChange => {
            ratio(event.pointing_change_deg, baseline.max_pointing_change_deg)
        }
        AnomalyKind::OrbitRaise | AnomalyKind::OrbitLower => {
            ratio(event.altitude_shift_km, baseline.max_altitude_shift_km)
        }
        // No physical baseline for these; any detection is fully anomalous
        AnomalyKind::RfEmission | AnomalyKind::GeoLoiter => 1.0,
    }
}

fn describe(name: &str, event: &ObservedEvent) -> String {
    match event.kind {
        AnomalyKind::UnexpectedManeuver => format!(
            "{name} executed an unscheduled orbit-change burn. Delta-V {:.1} m/s detected.",
            event.delta_v_ms
        ),
        AnomalyKind::OrientationChange => format!(
            "{name} rotated {:.0} deg off nominal attitude. Possible sensor or antenna reorientation.",
            event.pointing_change_deg
        ),
        AnomalyKind::PointingChange => format!(
            "{name} slewed primary payload antenna {:.0} deg from nominal boresight.",
            event.pointing_change_deg
        ),
        AnomalyKind::OrbitRaise => format!(
            "{name} raised perigee by {:.1} km toward the allied constellation shell.",
            event.altitude_shift_km
        ),
        AnomalyKind::OrbitLower => format!(
            "{name} lowered apogee by {:.1} km. Deorbit or rendezvous maneuver.",
            event.altitude_shift_km
        ),
        AnomalyKind::RfEmission => format!(
            "{name} began transmitting on non-standard frequency bands, inconsistent with its declared mission profile."
        ),
        // GEO loiter records normally come from the belt scorer with its own
        // description; this covers an externally reported sighting.
        AnomalyKind::GeoLoiter => format!(
            "{name} observed holding station in the geosynchronous belt over a protected longitude sector."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classification;
    use orbit_propagation::{generate_trajectory, OrbitalElements};

    fn object(id: &str) -> TrackedObject {
        let elements = OrbitalElements::new(63.4, 500.0, 142.0, 0.0).unwrap();
        TrackedObject {
            id: id.into(),
            name: "SJ-26 (SHIJIAN-26)".into(),
            classification: Classification::Foreign,
            country_code: Some("PRC".into()),
            rcs_size: None,
            trajectory: generate_trajectory(&elements),
            elements,
            metadata: serde_json::Value::Null,
        }
    }

    fn event(kind: AnomalyKind, dv: f64, pointing: f64, shift: f64) -> ObservedEvent {
        ObservedEvent {
            kind,
            delta_v_ms: dv,
            pointing_change_deg: pointing,
            altitude_shift_km: shift,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_in_envelope_event_is_filtered() {
        let obj = object("sat-25");
        let ev = event(AnomalyKind::UnexpectedManeuver, 0.4, 0.0, 0.0);
        assert!(score_anomaly(&obj, &ev, &Baseline::default(), &AnomalyConfig::default()).is_none());
    }

    #[test]
    fn test_large_maneuver_is_threatened() {
        let obj = object("sat-25");
        // 1.8 m/s against a 0.5 m/s envelope saturates deviation
        let ev = event(AnomalyKind::UnexpectedManeuver, 1.8, 0.0, 0.0);
        let rec = score_anomaly(&obj, &ev, &Baseline::default(), &AnomalyConfig::default()).unwrap();
        assert_eq!(rec.deviation, 1.0);
        assert_eq!(rec.severity, Severity::Threatened);
        assert!((rec.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_moderate_pointing_change_is_watched() {
        let obj = object("sat-25");
        // 16 deg against a 10 deg envelope: deviation 0.6
        let ev = event(AnomalyKind::PointingChange, 0.0, 16.0, 0.0);
        let rec = score_anomaly(&obj, &ev, &Baseline::default(), &AnomalyConfig::default()).unwrap();
        assert!((rec.deviation - 0.6).abs() < 1e-9);
        assert_eq!(rec.severity, Severity::Watched);
    }

    #[test]
    fn test_rf_emission_always_maximal() {
        let obj = object("sat-25");
        let ev = event(AnomalyKind::RfEmission, 0.0, 0.0, 0.0);
        let rec = score_anomaly(&obj, &ev, &Baseline::default(), &AnomalyConfig::default()).unwrap();
        assert_eq!(rec.deviation, 1.0);
        assert_eq!(rec.severity, Severity::Threatened);
    }
}
