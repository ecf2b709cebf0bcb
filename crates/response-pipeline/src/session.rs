//! Response session state
//!
//! A `ResponseSession` owns the six phase records for one triggered object
//! and enforces the legal transitions: phases begin in order, exactly one
//! phase is active at a time, and a completed phase never reopens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    AssessmentResult, PhaseId, PhaseStatus, PipelinePhase, ResponseOption, SessionStatus,
    TriggerSnapshot,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("phase {attempted:?} cannot begin while {expected:?} is next in sequence")]
    OutOfOrder { attempted: PhaseId, expected: PhaseId },
    #[error("phase {0:?} is not active")]
    PhaseNotActive(PhaseId),
    #[error("session is {0:?} and accepts no further transitions")]
    SessionClosed(SessionStatus),
    #[error("all phases already ran")]
    PipelineExhausted,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// One triggered object's walk through the response pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSession {
    pub id: String,
    pub snapshot: TriggerSnapshot,
    pub status: SessionStatus,
    pub phases: Vec<PipelinePhase>,
    pub assessment: Option<AssessmentResult>,
    pub options: Vec<ResponseOption>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl ResponseSession {
    pub fn new(snapshot: TriggerSnapshot) -> Self {
        Self {
            id: format!("session-{}", Uuid::new_v4()),
            snapshot,
            status: SessionStatus::Active,
            phases: PhaseId::ORDERED.iter().map(|id| PipelinePhase::pending(*id)).collect(),
            assessment: None,
            options: Vec::new(),
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    /// The next phase that has not yet started, if any.
    pub fn next_pending(&self) -> Option<PhaseId> {
        self.phases
            .iter()
            .find(|p| p.status == PhaseStatus::Pending)
            .map(|p| p.id)
    }

    pub fn active_phase(&self) -> Option<PhaseId> {
        self.phases
            .iter()
            .find(|p| p.status == PhaseStatus::Active)
            .map(|p| p.id)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::SessionClosed(self.status));
        }
        Ok(())
    }

    /// Activate `phase`. Fails unless it is the next pending phase and no
    /// other phase is currently active.
    pub fn begin_phase(&mut self, phase: PhaseId) -> Result<()> {
        self.ensure_open()?;
        if let Some(active) = self.active_phase() {
            return Err(SessionError::OutOfOrder { attempted: phase, expected: active });
        }
        let expected = self.next_pending().ok_or(SessionError::PipelineExhausted)?;
        if phase != expected {
            return Err(SessionError::OutOfOrder { attempted: phase, expected });
        }
        let record = self.phase_mut(phase);
        record.status = PhaseStatus::Active;
        record.started_at = Some(Utc::now());
        info!(session = %self.id, phase = ?phase, "phase started");
        Ok(())
    }

    /// Append a log line to the active phase.
    pub fn log(&mut self, phase: PhaseId, line: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        let record = self.phase_mut(phase);
        if record.status != PhaseStatus::Active {
            return Err(SessionError::PhaseNotActive(phase));
        }
        record.log.push(line.into());
        Ok(())
    }

    /// Mark the active phase complete. Completing the final phase closes
    /// the session.
    pub fn complete_phase(&mut self, phase: PhaseId) -> Result<()> {
        self.ensure_open()?;
        let record = self.phase_mut(phase);
        if record.status != PhaseStatus::Active {
            return Err(SessionError::PhaseNotActive(phase));
        }
        record.status = PhaseStatus::Complete;
        record.ended_at = Some(Utc::now());
        info!(session = %self.id, phase = ?phase, "phase complete");
        if self.next_pending().is_none() {
            self.status = SessionStatus::Complete;
            self.closed_at = Some(Utc::now());
            info!(session = %self.id, object = %self.snapshot.object_id, "session complete");
        }
        Ok(())
    }

    /// Abort the session. Legal from any active state; a closed session
    /// stays as it ended.
    pub fn dismiss(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(active) = self.active_phase() {
            let record = self.phase_mut(active);
            record.status = PhaseStatus::Error;
            record.ended_at = Some(Utc::now());
        }
        self.status = SessionStatus::Dismissed;
        self.closed_at = Some(Utc::now());
        info!(session = %self.id, "session dismissed");
        Ok(())
    }

    /// The option flagged as recommended, once response selection ran.
    pub fn recommended_option(&self) -> Option<&ResponseOption> {
        self.options.iter().find(|o| o.recommended)
    }

    fn phase_mut(&mut self, id: PhaseId) -> &mut PipelinePhase {
        // Constructor seeds exactly one record per PhaseId variant
        self.phases
            .iter_mut()
            .find(|p| p.id == id)
            .unwrap_or_else(|| unreachable!("phase table missing {id:?}"))
    }
}
