//! Response Pipeline Library
//!
//! Six-phase autonomous response state machine for the Orbital Shield
//! engine. Once an object's risk score crosses the trigger threshold, a
//! session walks a fixed linear pipeline (threshold breach, target
//! research, threat research, geopolitical analysis, threat assessment,
//! response selection) and recommends one of four response tiers.
//!
//! Transitions are strictly sequential with no backtracking; the phase
//! table is an explicit enum so "one active phase" and "no backward
//! transitions" are structurally enforced rather than promised.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use threat_scoring::{Severity, ThreatRecord};

pub mod manager;
pub mod session;
pub mod synthesis;

pub use manager::{PipelineConfig, SessionManager};
pub use session::{ResponseSession, SessionError};

/// Pipeline phases, in the only order they may run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseId {
    ThresholdBreach,
    DeepResearchTarget,
    DeepResearchThreat,
    GeopoliticalAnalysis,
    ThreatAssessment,
    ResponseSelection,
}

impl PhaseId {
    pub const ORDERED: [PhaseId; 6] = [
        PhaseId::ThresholdBreach,
        PhaseId::DeepResearchTarget,
        PhaseId::DeepResearchThreat,
        PhaseId::GeopoliticalAnalysis,
        PhaseId::ThreatAssessment,
        PhaseId::ResponseSelection,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::ThresholdBreach => "Threshold breach",
            Self::DeepResearchTarget => "Deep research: target asset",
            Self::DeepResearchThreat => "Deep research: threat object",
            Self::GeopoliticalAnalysis => "Geopolitical analysis",
            Self::ThreatAssessment => "Threat assessment",
            Self::ResponseSelection => "Response selection",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Pending,
    Active,
    Complete,
    Error,
}

/// One phase's record inside a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePhase {
    pub id: PhaseId,
    pub status: PhaseStatus,
    pub log: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PipelinePhase {
    fn pending(id: PhaseId) -> Self {
        Self {
            id,
            status: PhaseStatus::Pending,
            log: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }
}

/// Urgency tier computed by the threat-assessment phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Low,
    Elevated,
    High,
    Critical,
}

impl UrgencyTier {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Elevated => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

/// The four fixed response tiers, lowest to highest severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseTier {
    /// Defensive orbit adjustment
    Manoeuvre,
    /// Mirror the threat's movement to signal awareness
    SarcasticManoeuvre,
    /// Deploy false targets
    Decoy,
    /// Kinetic response; requires explicit authorization
    Destroy,
}

impl ResponseTier {
    pub const ORDERED: [ResponseTier; 4] = [
        ResponseTier::Manoeuvre,
        ResponseTier::SarcasticManoeuvre,
        ResponseTier::Decoy,
        ResponseTier::Destroy,
    ];

    pub fn rank(&self) -> u8 {
        match self {
            Self::Manoeuvre => 0,
            Self::SarcasticManoeuvre => 1,
            Self::Decoy => 2,
            Self::Destroy => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOption {
    pub tier: ResponseTier,
    pub description: String,
    pub confidence: f64,
    pub recommended: bool,
    pub requires_authorization: bool,
}

/// Assessed intent of the threat object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IntentClass {
    Reconnaissance,
    SignalCollection,
    Inspection,
    Interception,
}

/// Output of the threat-assessment phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub posterior: f64,
    pub intent: IntentClass,
    pub urgency: UrgencyTier,
}

/// Snapshot captured when the trigger fires; immutable for the session's
/// lifetime so concurrent scoring ticks cannot bleed into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    pub object_id: String,
    pub object_name: String,
    pub risk_score: f64,
    pub top_severity: Severity,
    pub records: Vec<ThreatRecord>,
    pub triggered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Complete,
    Dismissed,
    Error,
}

/// Actuation command emitted on session completion under full autonomy,
/// or on explicit operator approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManeuverCommand {
    pub object_id: String,
    pub tier: ResponseTier,
    pub issued_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_fixed() {
        assert_eq!(PhaseId::ORDERED.len(), 6);
        assert_eq!(PhaseId::ORDERED[0], PhaseId::ThresholdBreach);
        assert_eq!(PhaseId::ORDERED[5], PhaseId::ResponseSelection);
    }

    #[test]
    fn test_tier_ranks_monotonic() {
        for pair in ResponseTier::ORDERED.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert!(UrgencyTier::Low < UrgencyTier::Critical);
    }
}
