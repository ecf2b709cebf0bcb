//! Session manager
//!
//! Owns the live response sessions, one per triggered object, and drives
//! each through the pipeline on a background task. Triggering is
//! deduplicated: an object with an active session cannot spawn a second
//! one until the first completes or is dismissed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::session::ResponseSession;
use crate::synthesis;
use crate::{ManeuverCommand, PhaseId, SessionStatus, TriggerSnapshot};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base wall-clock dwell per phase before scaling
    pub phase_delay: Duration,
    /// Demo time compression; 2.0 halves every dwell
    pub speed_multiplier: f64,
    /// When set, completed sessions actuate the recommended response
    /// without operator approval (never for tiers requiring authorization)
    pub full_autonomy: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            phase_delay: Duration::from_secs(4),
            speed_multiplier: 1.0,
            full_autonomy: false,
        }
    }
}

impl PipelineConfig {
    fn scaled_delay(&self) -> Duration {
        if self.speed_multiplier <= 0.0 {
            return self.phase_delay;
        }
        self.phase_delay.div_f64(self.speed_multiplier)
    }
}

struct SessionSlot {
    session: Arc<RwLock<ResponseSession>>,
    task: Option<JoinHandle<()>>,
}

/// Registry of response sessions keyed by the threatened object's id.
pub struct SessionManager {
    config: PipelineConfig,
    slots: Arc<RwLock<HashMap<String, SessionSlot>>>,
    commands: mpsc::Sender<ManeuverCommand>,
}

impl SessionManager {
    /// Returns the manager and the receiving end of the actuation channel.
    pub fn new(config: PipelineConfig) -> (Self, mpsc::Receiver<ManeuverCommand>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Self {
                config,
                slots: Arc::new(RwLock::new(HashMap::new())),
                commands: tx,
            },
            rx,
        )
    }

    /// Start a session for the snapshot's object. Returns `false` without
    /// side effects when that object already has an active session.
    pub async fn trigger(
        &self,
        snapshot: TriggerSnapshot,
        target_metadata: serde_json::Value,
        threat_country: Option<String>,
    ) -> bool {
        let mut slots = self.slots.write().await;
        if let Some(slot) = slots.get(&snapshot.object_id) {
            if slot.session.read().await.status == SessionStatus::Active {
                info!(object = %snapshot.object_id, "trigger ignored; session already active");
                return false;
            }
        }

        let object_id = snapshot.object_id.clone();
        info!(object = %object_id, risk = snapshot.risk_score, "response session triggered");

        let session = Arc::new(RwLock::new(ResponseSession::new(snapshot)));
        let task = tokio::spawn(run_pipeline(
            Arc::clone(&session),
            self.config.clone(),
            self.commands.clone(),
            target_metadata,
            threat_country,
        ));
        slots.insert(object_id, SessionSlot { session, task: Some(task) });
        true
    }

    /// Dismiss the object's session, aborting its pipeline task. Returns
    /// `false` when no active session exists.
    pub async fn dismiss(&self, object_id: &str) -> bool {
        let mut slots = self.slots.write().await;
        let Some(slot) = slots.get_mut(object_id) else {
            return false;
        };
        if let Some(task) = slot.task.take() {
            task.abort();
        }
        let mut session = slot.session.write().await;
        session.dismiss().is_ok()
    }

    /// Approve a session's recommended response by hand, emitting the
    /// actuation command. Intended for tiers gated behind authorization.
    pub async fn authorize(&self, object_id: &str) -> Option<ManeuverCommand> {
        let slots = self.slots.read().await;
        let slot = slots.get(object_id)?;
        let session = slot.session.read().await;
        if session.status != SessionStatus::Complete {
            return None;
        }
        let tier = session.recommended_option()?.tier;
        let command = ManeuverCommand {
            object_id: object_id.to_string(),
            tier,
            issued_at: Utc::now(),
        };
        if self.commands.send(command.clone()).await.is_err() {
            warn!(object = %object_id, "actuation channel closed");
            return None;
        }
        Some(command)
    }

    /// Point-in-time clone of the object's session, if one exists.
    pub async fn snapshot(&self, object_id: &str) -> Option<ResponseSession> {
        let slots = self.slots.read().await;
        let slot = slots.get(object_id)?;
        let session = slot.session.read().await.clone();
        Some(session)
    }

    pub async fn active_count(&self) -> usize {
        let slots = self.slots.read().await;
        let mut count = 0;
        for slot in slots.values() {
            if slot.session.read().await.status == SessionStatus::Active {
                count += 1;
            }
        }
        count
    }

    /// Await the object's pipeline task. Used by the engine's shutdown
    /// path and by tests.
    pub async fn wait_for(&self, object_id: &str) {
        let task = {
            let mut slots = self.slots.write().await;
            slots.get_mut(object_id).and_then(|slot| slot.task.take())
        };
        if let Some(task) = task {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!(object = %object_id, error = %err, "pipeline task failed");
                }
            }
        }
    }
}

/// Drive one session through all six phases. Bails out quietly if the
/// session is dismissed underneath it.
async fn run_pipeline(
    session: Arc<RwLock<ResponseSession>>,
    config: PipelineConfig,
    commands: mpsc::Sender<ManeuverCommand>,
    target_metadata: serde_json::Value,
    threat_country: Option<String>,
) {
    let delay = config.scaled_delay();

    for phase in PhaseId::ORDERED {
        if session.write().await.begin_phase(phase).is_err() {
            return;
        }
        tokio::time::sleep(delay).await;

        let mut guard = session.write().await;
        let lines = match phase {
            PhaseId::ThresholdBreach => synthesis::breach_summary(&guard.snapshot),
            PhaseId::DeepResearchTarget => {
                synthesis::research_target(&guard.snapshot, &target_metadata)
            }
            PhaseId::DeepResearchThreat => {
                synthesis::research_threat(&guard.snapshot, threat_country.as_deref())
            }
            PhaseId::GeopoliticalAnalysis => synthesis::geopolitical_context(threat_country.as_deref()),
            PhaseId::ThreatAssessment => {
                let assessment = synthesis::assess(&guard.snapshot);
                let lines = vec![
                    format!("Adversarial posterior: {:.2}.", assessment.posterior),
                    format!("Inferred intent: {:?}.", assessment.intent),
                    format!("Urgency: {:?}.", assessment.urgency),
                ];
                guard.assessment = Some(assessment);
                lines
            }
            PhaseId::ResponseSelection => {
                let Some(assessment) = guard.assessment.clone() else {
                    warn!(session = %guard.id, "assessment missing at selection");
                    return;
                };
                let options = synthesis::select_options(&assessment);
                let mut lines: Vec<String> = options
                    .iter()
                    .map(|o| {
                        format!(
                            "{:?} (confidence {:.0}%){}{}",
                            o.tier,
                            o.confidence * 100.0,
                            if o.recommended { " [RECOMMENDED]" } else { "" },
                            if o.requires_authorization {
                                " [authorization required]"
                            } else {
                                ""
                            }
                        )
                    })
                    .collect();
                lines.insert(0, "Evaluating response options:".to_string());
                guard.options = options;
                lines
            }
        };

        for line in lines {
            if guard.log(phase, line).is_err() {
                return;
            }
        }
        if guard.complete_phase(phase).is_err() {
            return;
        }
        drop(guard);
    }

    if config.full_autonomy {
        let guard = session.read().await;
        if let Some(option) = guard.recommended_option() {
            if option.requires_authorization {
                info!(
                    session = %guard.id,
                    tier = ?option.tier,
                    "recommended response withheld pending authorization"
                );
            } else {
                let command = ManeuverCommand {
                    object_id: guard.snapshot.object_id.clone(),
                    tier: option.tier,
                    issued_at: Utc::now(),
                };
                if commands.send(command).await.is_err() {
                    warn!(session = %guard.id, "actuation channel closed");
                }
            }
        }
    }
}
