//! Risk aggregation
//!
//! Fuses the tick's threat records into one bounded risk score per object.
//! Max-pooling across records: a single severe threat dominates regardless
//! of how many minor threats also exist, so threat count never dilutes the
//! urgency signal.

use std::collections::HashMap;

use tracing::debug;

use crate::ThreatRecord;

/// Discount applied to the suspicious actor's own contribution: being the
/// source of a threat is itself a flag, at half weight.
const SOURCE_DISCOUNT: f64 = 0.5;

/// Aggregate all records into per-object risk scores in [0, 100].
pub fn aggregate(records: &[ThreatRecord]) -> HashMap<String, f64> {
    let mut scores: HashMap<String, f64> = HashMap::new();

    let bump = |scores: &mut HashMap<String, f64>, id: &str, points: f64| {
        let points = points.clamp(0.0, 100.0);
        let entry = scores.entry(id.to_string()).or_insert(0.0);
        if points > *entry {
            *entry = points;
        }
    };

    for record in records {
        let points = match record {
            ThreatRecord::Proximity(t) => (t.confidence * 100.0).round(),
            ThreatRecord::SignalIntercept(t) => (t.interception_probability * 100.0).round(),
            ThreatRecord::OrbitalSimilarity(t) => (t.confidence * 100.0).round(),
            ThreatRecord::Anomaly(t) => (t.confidence * 100.0).round(),
        };

        if let Some(target) = record.counterpart_id() {
            bump(&mut scores, target, points);
            bump(&mut scores, record.subject_id(), points * SOURCE_DISCOUNT);
        } else {
            bump(&mut scores, record.subject_id(), points);
        }
    }

    debug!(objects = scores.len(), records = records.len(), "risk aggregated");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AnomalyKind, AnomalyThreat, ApproachPattern, ProximityThreat, Severity, SimilarityPattern,
        SimilarityThreat,
    };
    use chrono::Utc;

    fn prox(subject: &str, target: &str, confidence: f64) -> ThreatRecord {
        ThreatRecord::Proximity(ProximityThreat {
            id: "prox-test".into(),
            subject_id: subject.into(),
            counterpart_id: target.into(),
            severity: Severity::Watched,
            confidence,
            miss_distance_km: 12.0,
            tca_minutes: 20.0,
            approach_velocity_kms: 0.4,
            pattern: ApproachPattern::Drift,
            sun_hiding_detected: false,
        })
    }

    fn osim(subject: &str, target: &str, confidence: f64) -> ThreatRecord {
        ThreatRecord::OrbitalSimilarity(SimilarityThreat {
            id: "osim-test".into(),
            subject_id: subject.into(),
            counterpart_id: target.into(),
            severity: Severity::Watched,
            confidence,
            inclination_diff_deg: 1.0,
            altitude_diff_km: 10.0,
            divergence: 0.1,
            pattern: SimilarityPattern::CoPlanar,
        })
    }

    fn anom(subject: &str, confidence: f64) -> ThreatRecord {
        ThreatRecord::Anomaly(AnomalyThreat {
            id: "anom-test".into(),
            subject_id: subject.into(),
            severity: Severity::Watched,
            confidence,
            kind: AnomalyKind::RfEmission,
            deviation: 0.8,
            description: String::new(),
            detected_at: Utc::now(),
        })
    }

    #[test]
    fn test_max_pooling_not_sum() {
        let records = vec![
            prox("sat-25", "sat-6", 0.9),
            osim("sat-25", "sat-6", 0.6),
            anom("sat-25", 0.7),
        ];
        let scores = aggregate(&records);
        // Three medium threats do not stack past the single largest one
        assert_eq!(scores["sat-6"], 90.0);
    }

    #[test]
    fn test_source_gets_discounted_contribution() {
        let scores = aggregate(&[prox("sat-25", "sat-6", 0.8)]);
        assert_eq!(scores["sat-6"], 80.0);
        assert_eq!(scores["sat-25"], 40.0);
    }

    #[test]
    fn test_score_never_below_max_contribution_nor_above_100() {
        let records = vec![
            prox("sat-25", "sat-6", 1.0),
            osim("sat-9", "sat-6", 0.95),
            anom("sat-6", 0.3),
        ];
        let scores = aggregate(&records);
        assert_eq!(scores["sat-6"], 100.0);
        for score in scores.values() {
            assert!((0.0..=100.0).contains(score));
        }
    }

    #[test]
    fn test_anomaly_applies_to_subject_only() {
        let scores = aggregate(&[anom("sat-25", 0.7)]);
        assert_eq!(scores["sat-25"], 70.0);
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn test_empty_records_empty_map() {
        assert!(aggregate(&[]).is_empty());
    }
}
