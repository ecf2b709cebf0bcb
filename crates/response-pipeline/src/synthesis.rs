//! Phase content synthesis
//!
//! Deterministic narrative and analytic output for each pipeline phase,
//! derived entirely from the trigger snapshot. No external calls: the same
//! snapshot always yields the same research lines, assessment, and options,
//! which keeps the pipeline replayable in tests and demos.

use crate::{
    AssessmentResult, IntentClass, ResponseOption, ResponseTier, TriggerSnapshot, UrgencyTier,
};
use threat_scoring::{AnomalyKind, ApproachPattern, Severity, ThreatRecord};

/// Log lines for the threshold-breach phase.
pub fn breach_summary(snapshot: &TriggerSnapshot) -> Vec<String> {
    let mut lines = vec![format!(
        "Risk score {:.0}/100 for {} crossed the autonomous-response threshold.",
        snapshot.risk_score, snapshot.object_name
    )];
    lines.push(format!(
        "{} active threat record(s) contributed; highest severity: {:?}.",
        snapshot.records.len(),
        snapshot.top_severity
    ));
    for record in &snapshot.records {
        lines.push(record_summary(record));
    }
    lines
}

fn record_summary(record: &ThreatRecord) -> String {
    match record {
        ThreatRecord::Proximity(t) => format!(
            "Proximity: {} closing on {}, miss distance {:.1} km, TCA in {:.0} min, pattern {:?}.",
            t.subject_id, t.counterpart_id, t.miss_distance_km, t.tca_minutes, t.pattern
        ),
        ThreatRecord::SignalIntercept(t) => format!(
            "Signal intercept: {} positioned on the {} downlink path, interception probability {:.0}%, {}/{} upcoming windows at risk.",
            t.interceptor_id,
            t.ground_station,
            t.interception_probability * 100.0,
            t.windows_at_risk,
            t.total_windows
        ),
        ThreatRecord::OrbitalSimilarity(t) => format!(
            "Orbital similarity: {} shadowing {}, divergence {:.3}, pattern {:?}.",
            t.subject_id, t.counterpart_id, t.divergence, t.pattern
        ),
        ThreatRecord::Anomaly(t) => format!("Anomaly: {}", t.description),
    }
}

/// Deep research on the protected asset: mission role and health posture,
/// read from the object's catalog metadata when present.
pub fn research_target(snapshot: &TriggerSnapshot, metadata: &serde_json::Value) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: reviewing mission profile, dependencies, and current health.",
        snapshot.object_name
    )];

    if let Some(mission) = metadata.get("mission").and_then(|v| v.as_str()) {
        lines.push(format!("Mission role: {mission}."));
    }
    if let Some(health) = metadata.get("health") {
        let field = |key: &str| health.get(key).and_then(|v| v.as_f64()).unwrap_or(100.0);
        lines.push(format!(
            "Subsystem health: power {:.0}%, comms {:.0}%, propellant {:.0}%.",
            field("power"),
            field("comms"),
            field("propellant")
        ));
        if field("propellant") < 30.0 {
            lines.push(
                "Low propellant margin constrains evasive options; prefer minimal-impulse responses."
                    .to_string(),
            );
        }
    }
    lines.push("Asset is operational and tasked; loss of service would degrade coverage.".to_string());
    lines
}

/// Deep research on the threat object: attribution, capability profile,
/// and behavioral history inferred from the threat records.
pub fn research_threat(snapshot: &TriggerSnapshot, country_code: Option<&str>) -> Vec<String> {
    let threat_id = snapshot
        .records
        .iter()
        .map(|r| r.subject_id().to_string())
        .next()
        .unwrap_or_else(|| "unknown object".to_string());

    let mut lines = vec![format!("Profiling threat object {threat_id}.")];
    match country_code {
        Some(code) => lines.push(format!("Registered operator country: {code}.")),
        None => lines.push("No registered operator; object is uncatalogued or obscured.".to_string()),
    }

    let maneuvers = snapshot
        .records
        .iter()
        .filter(|r| {
            matches!(
                r,
                ThreatRecord::Anomaly(t) if matches!(
                    t.kind,
                    AnomalyKind::UnexpectedManeuver | AnomalyKind::OrbitRaise | AnomalyKind::OrbitLower
                )
            )
        })
        .count();
    if maneuvers > 0 {
        lines.push(format!(
            "{maneuvers} propulsive event(s) on record; object is actively maneuvering, not debris."
        ));
    } else {
        lines.push("No propulsive events on record; trajectory shaping may predate tracking.".to_string());
    }

    if snapshot
        .records
        .iter()
        .any(|r| matches!(r, ThreatRecord::SignalIntercept(_)))
    {
        lines.push("Geometry consistent with a signals-collection payload.".to_string());
    }
    if snapshot.records.iter().any(
        |r| matches!(r, ThreatRecord::Proximity(t) if t.sun_hiding_detected),
    ) {
        lines.push(
            "Approach uses a sun-aligned bearing, degrading optical tracking, a trained tactic."
                .to_string(),
        );
    }
    lines
}

/// Geopolitical context lines for the attributed operator.
pub fn geopolitical_context(country_code: Option<&str>) -> Vec<String> {
    match country_code {
        Some("PRC") => vec![
            "Operator attributed to the PRC space program.".to_string(),
            "PRC has demonstrated co-orbital inspection and RPO capability (SJ-series, TJS-series)."
                .to_string(),
            "Direct-ascent ASAT precedent: 2007 FY-1C intercept.".to_string(),
            "Current posture: persistent close-approach operations against allied assets."
                .to_string(),
        ],
        Some("RUS") | Some("CIS") => vec![
            "Operator attributed to Russian military space forces.".to_string(),
            "Demonstrated nesting-doll inspector deployments (Kosmos-2542/2543).".to_string(),
            "Direct-ascent ASAT precedent: 2021 Kosmos-1408 intercept.".to_string(),
        ],
        Some(code) => vec![format!(
            "Operator attributed to {code}; no hostile counter-space precedent on record."
        )],
        None => vec![
            "No attribution available; treating as unflagged non-cooperative object.".to_string(),
        ],
    }
}

/// Threat assessment: fuse the record confidences into a posterior, infer
/// intent from the dominant record kind, and map posterior to urgency.
pub fn assess(snapshot: &TriggerSnapshot) -> AssessmentResult {
    let posterior = snapshot
        .records
        .iter()
        .map(record_confidence)
        .fold(0.0_f64, f64::max)
        .clamp(0.0, 1.0);

    let intent = infer_intent(&snapshot.records);

    let urgency = if posterior > 0.9 && snapshot.top_severity == Severity::Threatened {
        UrgencyTier::Critical
    } else if posterior > 0.7 {
        UrgencyTier::High
    } else if posterior > 0.4 {
        UrgencyTier::Elevated
    } else {
        UrgencyTier::Low
    };

    AssessmentResult { posterior, intent, urgency }
}

fn record_confidence(record: &ThreatRecord) -> f64 {
    match record {
        ThreatRecord::SignalIntercept(t) => t.interception_probability,
        other => other.confidence(),
    }
}

fn infer_intent(records: &[ThreatRecord]) -> IntentClass {
    // Direct approach outranks everything; then signal geometry; then
    // close-range inspection; shadowing alone reads as reconnaissance.
    if records.iter().any(|r| {
        matches!(r, ThreatRecord::Proximity(t) if t.pattern == ApproachPattern::Direct)
    }) {
        return IntentClass::Interception;
    }
    if records
        .iter()
        .any(|r| matches!(r, ThreatRecord::SignalIntercept(t) if t.interception_probability > 0.2))
    {
        return IntentClass::SignalCollection;
    }
    if records
        .iter()
        .any(|r| matches!(r, ThreatRecord::Proximity(t) if t.miss_distance_km < 5.0))
    {
        return IntentClass::Inspection;
    }
    IntentClass::Reconnaissance
}

/// Build the four response options for the assessed urgency. The tier whose
/// rank matches the urgency rank is recommended; Destroy is only ever
/// recommended at critical urgency and always requires authorization.
pub fn select_options(assessment: &AssessmentResult) -> Vec<ResponseOption> {
    let target_rank = assessment.urgency.rank();

    ResponseTier::ORDERED
        .iter()
        .map(|tier| {
            let distance = tier.rank().abs_diff(target_rank);
            let confidence = (0.9 - 0.15 * f64::from(distance)).max(0.1);
            ResponseOption {
                tier: *tier,
                description: describe_tier(*tier),
                confidence,
                recommended: tier.rank() == target_rank,
                requires_authorization: *tier == ResponseTier::Destroy,
            }
        })
        .collect()
}

fn describe_tier(tier: ResponseTier) -> String {
    match tier {
        ResponseTier::Manoeuvre => {
            "Execute a defensive orbit adjustment to open separation from the threat.".to_string()
        }
        ResponseTier::SarcasticManoeuvre => {
            "Mirror the threat's maneuvers to signal awareness without ceding position.".to_string()
        }
        ResponseTier::Decoy => {
            "Deploy decoy targets to dilute the threat's tracking and targeting solution.".to_string()
        }
        ResponseTier::Destroy => {
            "Neutralize the threat object kinetically. Requires explicit command authorization."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use threat_scoring::{ProximityThreat, SignalThreat};

    fn prox_record(pattern: ApproachPattern, miss: f64, confidence: f64, sun: bool) -> ThreatRecord {
        ThreatRecord::Proximity(ProximityThreat {
            id: "prox-test".into(),
            subject_id: "sat-25".into(),
            counterpart_id: "sat-6".into(),
            severity: Severity::Threatened,
            confidence,
            miss_distance_km: miss,
            tca_minutes: 12.0,
            approach_velocity_kms: 0.03,
            pattern,
            sun_hiding_detected: sun,
        })
    }

    fn snapshot(records: Vec<ThreatRecord>, risk: f64, top: Severity) -> TriggerSnapshot {
        TriggerSnapshot {
            object_id: "sat-6".into(),
            object_name: "USA-245".into(),
            risk_score: risk,
            top_severity: top,
            records,
            triggered_at: Utc::now(),
        }
    }

    #[test]
    fn test_assessment_critical_at_high_posterior() {
        let snap = snapshot(
            vec![prox_record(ApproachPattern::Direct, 2.0, 0.95, false)],
            95.0,
            Severity::Threatened,
        );
        let result = assess(&snap);
        assert_eq!(result.urgency, UrgencyTier::Critical);
        assert_eq!(result.intent, IntentClass::Interception);
    }

    #[test]
    fn test_signal_geometry_reads_as_collection() {
        let snap = snapshot(
            vec![ThreatRecord::SignalIntercept(SignalThreat {
                id: "sig-test".into(),
                interceptor_id: "sat-25".into(),
                asset_id: "sat-6".into(),
                ground_station: "Pine Gap".into(),
                severity: Severity::Watched,
                confidence: 0.45,
                interception_probability: 0.45,
                signal_path_angle_deg: 12.0,
                windows_at_risk: 3,
                total_windows: 8,
            })],
            45.0,
            Severity::Watched,
        );
        let result = assess(&snap);
        assert_eq!(result.intent, IntentClass::SignalCollection);
        assert_eq!(result.urgency, UrgencyTier::Elevated);
    }

    #[test]
    fn test_options_recommend_matching_tier() {
        let critical = AssessmentResult {
            posterior: 0.95,
            intent: IntentClass::Interception,
            urgency: UrgencyTier::Critical,
        };
        let options = select_options(&critical);
        assert_eq!(options.len(), 4);
        let recommended: Vec<_> = options.iter().filter(|o| o.recommended).collect();
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].tier, ResponseTier::Destroy);
        assert!(recommended[0].requires_authorization);
    }

    #[test]
    fn test_destroy_never_recommended_below_critical() {
        for urgency in [UrgencyTier::Low, UrgencyTier::Elevated, UrgencyTier::High] {
            let options = select_options(&AssessmentResult {
                posterior: 0.6,
                intent: IntentClass::Reconnaissance,
                urgency,
            });
            let destroy = options.iter().find(|o| o.tier == ResponseTier::Destroy).unwrap();
            assert!(!destroy.recommended);
            assert!(destroy.requires_authorization);
        }
    }

    #[test]
    fn test_option_confidence_decays_with_rank_distance() {
        let options = select_options(&AssessmentResult {
            posterior: 0.5,
            intent: IntentClass::Reconnaissance,
            urgency: UrgencyTier::Low,
        });
        assert!((options[0].confidence - 0.9).abs() < 1e-9);
        assert!((options[3].confidence - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_geopolitical_context_names_precedent() {
        let lines = geopolitical_context(Some("PRC"));
        assert!(lines.iter().any(|l| l.contains("ASAT")));
        let lines = geopolitical_context(None);
        assert!(lines[0].contains("No attribution"));
    }

    #[test]
    fn test_breach_summary_lists_records() {
        let snap = snapshot(
            vec![prox_record(ApproachPattern::CoOrbital, 3.0, 0.8, true)],
            86.0,
            Severity::Threatened,
        );
        let lines = breach_summary(&snap);
        assert!(lines[0].contains("86"));
        assert!(lines.iter().any(|l| l.contains("miss distance")));
    }
}
