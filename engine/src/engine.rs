//! Evaluation engine
//!
//! Single-threaded tick loop: snapshot the fleet, run every scorer over the
//! Foreign × Asset pairs, aggregate risk, and trigger response sessions for
//! assets whose score crosses the threshold. All threat records are
//! re-derived fresh each tick; nothing is updated in place.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context};
use response_pipeline::{ManeuverCommand, PipelineConfig, ResponseTier, SessionManager, TriggerSnapshot};
use threat_scoring::{
    aggregate, score_anomaly, score_geo_loiter, score_proximity, score_signal_intercept,
    score_similarity, AnomalyConfig, Baseline, Classification, GeoLoiterConfig, GroundStation,
    ObservedEvent, ProximityConfig, Severity, SignalConfig, SimilarityConfig, ThreatRecord,
    TrackedObject,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use orbit_propagation::{generate_trajectory, OrbitalElements, Trajectory};

/// Altitude gap beyond which a pair cannot produce a meaningful proximity
/// or similarity record this tick.
const PAIR_GATE_KM: f64 = 1500.0;

/// Evasion offsets applied when a maneuver command actuates.
const EVASION_ALTITUDE_KM: f64 = 50.0;
const EVASION_RAAN_DEG: f64 = 30.0;
const EVASION_INCLINATION_DEG: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Risk fraction (0-1] above which a session triggers
    pub trigger_threshold: f64,
    pub full_autonomy: bool,
    /// Sim time compression, > 0
    pub speed_multiplier: f64,
    /// Wall-clock pause between ticks
    pub tick_interval: Duration,
    /// Observations older than this (sim seconds) are marked stale
    pub stale_after_s: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 0.70,
            full_autonomy: false,
            speed_multiplier: 1.0,
            tick_interval: Duration::from_secs(5),
            stale_after_s: 600.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.trigger_threshold) || self.trigger_threshold == 0.0 {
            bail!("trigger threshold must be in (0, 1], got {}", self.trigger_threshold);
        }
        if self.speed_multiplier <= 0.0 || !self.speed_multiplier.is_finite() {
            bail!("speed multiplier must be positive, got {}", self.speed_multiplier);
        }
        if self.stale_after_s <= 0.0 {
            bail!("stale-after must be positive, got {}", self.stale_after_s);
        }
        Ok(())
    }

    /// Apply environment overrides on top of the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("SHIELD_TRIGGER_THRESHOLD") {
            config.trigger_threshold =
                v.parse().context("SHIELD_TRIGGER_THRESHOLD must be a number")?;
        }
        if let Ok(v) = std::env::var("SHIELD_FULL_AUTONOMY") {
            config.full_autonomy = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("SHIELD_SPEED_MULTIPLIER") {
            config.speed_multiplier =
                v.parse().context("SHIELD_SPEED_MULTIPLIER must be a number")?;
        }
        if let Ok(v) = std::env::var("SHIELD_TICK_SECONDS") {
            let secs: u64 = v.parse().context("SHIELD_TICK_SECONDS must be an integer")?;
            config.tick_interval = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Outcome of one evaluation tick.
#[derive(Debug)]
pub struct TickReport {
    pub records: Vec<ThreatRecord>,
    pub risk: HashMap<String, f64>,
    /// Asset ids that started a response session this tick
    pub triggered: Vec<String>,
    /// Object ids whose feed went stale
    pub stale: Vec<String>,
}

pub struct ShieldEngine {
    config: EngineConfig,
    fleet: HashMap<String, TrackedObject>,
    last_update_s: HashMap<String, f64>,
    stations: Vec<GroundStation>,
    proximity_cfg: ProximityConfig,
    signal_cfg: SignalConfig,
    similarity_cfg: SimilarityConfig,
    anomaly_cfg: AnomalyConfig,
    geo_cfg: GeoLoiterConfig,
    baseline: Baseline,
    sessions: SessionManager,
}

impl ShieldEngine {
    /// Returns the engine plus the receiving end of the actuation channel.
    pub fn new(
        config: EngineConfig,
        fleet: Vec<TrackedObject>,
        stations: Vec<GroundStation>,
    ) -> (Self, mpsc::Receiver<ManeuverCommand>) {
        let pipeline = PipelineConfig {
            speed_multiplier: config.speed_multiplier,
            full_autonomy: config.full_autonomy,
            ..PipelineConfig::default()
        };
        let (sessions, commands) = SessionManager::new(pipeline);

        let last_update_s = fleet.iter().map(|o| (o.id.clone(), 0.0)).collect();
        let fleet = fleet.into_iter().map(|o| (o.id.clone(), o)).collect();

        (
            Self {
                config,
                fleet,
                last_update_s,
                stations,
                proximity_cfg: ProximityConfig::default(),
                signal_cfg: SignalConfig::default(),
                similarity_cfg: SimilarityConfig::default(),
                anomaly_cfg: AnomalyConfig::default(),
                geo_cfg: GeoLoiterConfig::default(),
                baseline: Baseline::default(),
                sessions,
            },
            commands,
        )
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn object(&self, id: &str) -> Option<&TrackedObject> {
        self.fleet.get(id)
    }

    /// Ingest a fresh element set for one object and regenerate its track.
    pub fn observe(&mut self, id: &str, elements: OrbitalElements, now_s: f64) -> bool {
        self.observe_track(id, elements, generate_trajectory(&elements), now_s)
    }

    /// Ingest elements together with an already shaped ground track, as the
    /// scenario's intercept phases supply.
    pub fn observe_track(
        &mut self,
        id: &str,
        elements: OrbitalElements,
        trajectory: Trajectory,
        now_s: f64,
    ) -> bool {
        let Some(object) = self.fleet.get_mut(id) else {
            warn!(object = %id, "observation for unknown object dropped");
            return false;
        };
        object.trajectory = trajectory;
        object.elements = elements;
        self.last_update_s.insert(id.to_string(), now_s);
        true
    }

    /// Run one evaluation tick at sim time `now_s` with this tick's
    /// observed anomaly events.
    pub async fn tick(&mut self, now_s: f64, events: &[(String, ObservedEvent)]) -> TickReport {
        let stale = self.mark_stale(now_s);

        let mut records = Vec::new();

        let suspects: Vec<&TrackedObject> = self
            .fleet
            .values()
            .filter(|o| o.classification != Classification::Asset)
            .collect();
        let assets: Vec<&TrackedObject> = self
            .fleet
            .values()
            .filter(|o| o.classification == Classification::Asset)
            .collect();

        for suspect in &suspects {
            // Per-object: the belt scorer has no asset counterpart and must
            // run even for objects the altitude gate keeps out of every pair
            if let Some(loiter) = score_geo_loiter(suspect, &self.geo_cfg) {
                if loiter.severity > Severity::Nominal {
                    records.push(ThreatRecord::Anomaly(loiter));
                }
            }

            for asset in &assets {
                if (suspect.elements.altitude_km - asset.elements.altitude_km).abs() > PAIR_GATE_KM
                {
                    continue;
                }

                let prox = score_proximity(suspect, asset, now_s, &self.proximity_cfg);
                if prox.severity > Severity::Nominal {
                    records.push(ThreatRecord::Proximity(prox));
                }

                let sim = score_similarity(suspect, asset, &self.similarity_cfg);
                if sim.severity > Severity::Nominal {
                    records.push(ThreatRecord::OrbitalSimilarity(sim));
                }

                for station in &self.stations {
                    let sig =
                        score_signal_intercept(station, asset, suspect, now_s, &self.signal_cfg);
                    if sig.severity > Severity::Nominal {
                        records.push(ThreatRecord::SignalIntercept(sig));
                    }
                }
            }
        }

        for (object_id, event) in events {
            let Some(object) = self.fleet.get(object_id) else {
                continue;
            };
            if let Some(anomaly) =
                score_anomaly(object, event, &self.baseline, &self.anomaly_cfg)
            {
                records.push(ThreatRecord::Anomaly(anomaly));
            }
        }

        let risk = aggregate(&records);
        let triggered = self.trigger_sessions(&records, &risk).await;

        info!(
            now_s,
            records = records.len(),
            scored = risk.len(),
            triggered = triggered.len(),
            "tick complete"
        );
        TickReport { records, risk, triggered, stale }
    }

    fn mark_stale(&self, now_s: f64) -> Vec<String> {
        let mut stale = Vec::new();
        for (id, last) in &self.last_update_s {
            if now_s - last > self.config.stale_after_s {
                stale.push(id.clone());
            }
        }
        if !stale.is_empty() {
            warn!(count = stale.len(), "feeds stale; scoring last-known elements");
        }
        stale
    }

    async fn trigger_sessions(
        &self,
        records: &[ThreatRecord],
        risk: &HashMap<String, f64>,
    ) -> Vec<String> {
        let mut triggered = Vec::new();

        for (id, score) in risk {
            if score / 100.0 <= self.config.trigger_threshold {
                continue;
            }
            let Some(object) = self.fleet.get(id) else {
                continue;
            };
            if object.classification != Classification::Asset {
                continue;
            }

            let involved: Vec<ThreatRecord> = records
                .iter()
                .filter(|r| r.subject_id() == id.as_str() || r.counterpart_id() == Some(id.as_str()))
                .cloned()
                .collect();
            let top_severity = involved
                .iter()
                .map(ThreatRecord::severity)
                .max()
                .unwrap_or(Severity::Nominal);
            let threat_country = involved
                .iter()
                .filter(|r| r.counterpart_id() == Some(id.as_str()))
                .find_map(|r| {
                    self.fleet
                        .get(r.subject_id())
                        .and_then(|o| o.country_code.clone())
                });

            let snapshot = TriggerSnapshot {
                object_id: object.id.clone(),
                object_name: object.name.clone(),
                risk_score: *score,
                top_severity,
                records: involved,
                triggered_at: chrono::Utc::now(),
            };
            if self
                .sessions
                .trigger(snapshot, object.metadata.clone(), threat_country)
                .await
            {
                triggered.push(id.clone());
            }
        }

        triggered.sort_unstable();
        triggered
    }

    /// Actuate a maneuver command: evasive element change for the maneuver
    /// tiers, log-only for the tiers actuated outside the orbit model.
    pub fn apply_command(&mut self, command: &ManeuverCommand, now_s: f64) -> anyhow::Result<()> {
        match command.tier {
            ResponseTier::Manoeuvre | ResponseTier::SarcasticManoeuvre => {
                let object = self
                    .fleet
                    .get(&command.object_id)
                    .with_context(|| format!("unknown object {}", command.object_id))?;
                let elements = object.elements.with_maneuver(
                    EVASION_ALTITUDE_KM,
                    EVASION_RAAN_DEG,
                    EVASION_INCLINATION_DEG,
                    now_s,
                )?;
                self.observe(&command.object_id, elements, now_s);
                info!(
                    object = %command.object_id,
                    tier = ?command.tier,
                    altitude_km = elements.altitude_km,
                    "evasive maneuver executed"
                );
            }
            ResponseTier::Decoy | ResponseTier::Destroy => {
                info!(
                    object = %command.object_id,
                    tier = ?command.tier,
                    "response delegated to external effectors"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, SJ_26_ID, USA_245_ID};

    fn engine_with(
        config: EngineConfig,
        ids: &[&str],
    ) -> (ShieldEngine, mpsc::Receiver<ManeuverCommand>) {
        let fleet = catalog::demo_fleet()
            .unwrap()
            .into_iter()
            .filter(|o| ids.contains(&o.id.as_str()))
            .collect();
        ShieldEngine::new(config, fleet, catalog::ground_stations())
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        let bad = EngineConfig { trigger_threshold: 0.0, ..EngineConfig::default() };
        assert!(bad.validate().is_err());
        let bad = EngineConfig { speed_multiplier: -2.0, ..EngineConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[tokio::test]
    async fn test_distant_pair_produces_nothing() {
        // The unknown object rides 140 km above the ISS in a foreign plane;
        // every scorer stays nominal and the pair cannot trigger
        let (mut engine, _commands) = engine_with(EngineConfig::default(), &["sat-1", "sat-40"]);
        let report = engine.tick(0.0, &[]).await;
        assert!(report.records.is_empty(), "records {:?}", report.records);
        assert!(report.risk.is_empty());
        assert!(report.triggered.is_empty());
    }

    #[tokio::test]
    async fn test_parked_threat_triggers_asset_session() {
        let (mut engine, _commands) = engine_with(EngineConfig::default(), &[USA_245_ID, SJ_26_ID]);
        // Park SJ-26 on USA-245's plane, as the scenario's final phase does
        let parked = OrbitalElements::new(63.42, 500.1, 142.1, 0.0).unwrap();
        engine.observe(SJ_26_ID, parked, 0.0);

        let report = engine.tick(0.0, &[]).await;
        assert!(report.risk[USA_245_ID] > 70.0, "risk {}", report.risk[USA_245_ID]);
        assert_eq!(report.triggered, vec![USA_245_ID.to_string()]);
        assert!(engine.sessions().snapshot(USA_245_ID).await.is_some());

        // second tick while the session is active does not re-trigger
        let report = engine.tick(30.0, &[]).await;
        assert!(report.triggered.is_empty());
    }

    #[tokio::test]
    async fn test_geo_listener_scored_despite_altitude_gate() {
        // LUCH sits 35k km above every asset, so no pair survives the gate;
        // the belt scorer must still flag its station slot over the
        // protected sector and put it on the risk board
        let (mut engine, _commands) = engine_with(EngineConfig::default(), &["sat-1", "sat-31"]);
        let report = engine.tick(0.0, &[]).await;

        let loiter = report
            .records
            .iter()
            .find(|r| r.subject_id() == "sat-31")
            .expect("geo listener record");
        assert_eq!(loiter.severity(), Severity::Threatened);
        assert!(report.risk.contains_key("sat-31"));
        // no asset is the counterpart, so nothing triggers
        assert!(report.triggered.is_empty());
    }

    #[tokio::test]
    async fn test_staleness_marked_never_fatal() {
        let (mut engine, _commands) = engine_with(
            EngineConfig { stale_after_s: 100.0, ..EngineConfig::default() },
            &["sat-2", SJ_26_ID],
        );
        let report = engine.tick(500.0, &[]).await;
        assert_eq!(report.stale.len(), 2);

        engine.observe(SJ_26_ID, OrbitalElements::new(71.4, 520.0, 167.0, 500.0).unwrap(), 500.0);
        let report = engine.tick(550.0, &[]).await;
        assert!(!report.stale.contains(&SJ_26_ID.to_string()));
    }

    #[tokio::test]
    async fn test_apply_command_changes_elements() {
        let (mut engine, _commands) = engine_with(EngineConfig::default(), &[USA_245_ID]);
        let before = engine.object(USA_245_ID).unwrap().elements;
        let command = ManeuverCommand {
            object_id: USA_245_ID.to_string(),
            tier: ResponseTier::Manoeuvre,
            issued_at: chrono::Utc::now(),
        };
        engine.apply_command(&command, 600.0).unwrap();

        let after = engine.object(USA_245_ID).unwrap().elements;
        assert!((after.altitude_km - before.altitude_km - 50.0).abs() < 1e-9);
        assert!((after.raan_deg - (before.raan_deg + 30.0).rem_euclid(360.0)).abs() < 1e-9);
        assert!((after.inclination_deg - before.inclination_deg - 8.0).abs() < 1e-9);
    }
}
