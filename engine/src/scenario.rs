//! Demo escalation scenario
//!
//! Scripted four-phase approach of SJ-26 onto USA-245's orbit. Each phase
//! smoothly morphs SJ-26's elements toward the target plane and fires the
//! anomaly observations an operator would see at that stage. The script is
//! a pure function of scenario time, so ticks can replay or fast-forward.

use chrono::Utc;
use orbit_propagation::{
    generate_intercept_trajectory, generate_trajectory, OrbitalElements, Result, Trajectory,
};
use threat_scoring::{AnomalyKind, ObservedEvent};
use tracing::info;

/// Phase boundaries in scenario seconds.
const PHASE_BOUNDS: [f64; 4] = [0.0, 90.0, 180.0, 300.0];

/// First phase whose track gets the intercept-arc shaping.
const INTERCEPT_PHASE: usize = 2;

/// Element offsets from the target orbit at each phase boundary:
/// (altitude above target km, inclination offset deg, raan offset deg).
/// The final waypoint parks SJ-26 0.1 km above the target plane.
const WAYPOINTS: [(f64, f64, f64); 5] = [
    (20.0, 8.0, 25.0),
    (15.0, 5.0, 15.0),
    (8.0, 2.0, 5.0),
    (0.1, 0.02, 0.1),
    (0.1, 0.02, 0.1),
];

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// The SJ-26 escalation script, anchored on the threatened asset's orbit.
pub struct Escalation {
    threat_id: String,
    target: OrbitalElements,
    target_track: Trajectory,
}

impl Escalation {
    pub fn new(threat_id: impl Into<String>, target: OrbitalElements) -> Self {
        Self {
            threat_id: threat_id.into(),
            target_track: generate_trajectory(&target),
            target,
        }
    }

    pub fn threat_id(&self) -> &str {
        &self.threat_id
    }

    /// Phase index 0-3 for scenario time `t_s`.
    pub fn phase_at(&self, t_s: f64) -> usize {
        match PHASE_BOUNDS.iter().rposition(|b| t_s >= *b) {
            Some(i) => i,
            None => 0,
        }
    }

    /// SJ-26's elements at scenario time `t_s`: waypoint offsets blended
    /// with smoothstep inside the current phase, held after the last.
    pub fn elements_at(&self, t_s: f64) -> Result<OrbitalElements> {
        let phase = self.phase_at(t_s);
        let start = PHASE_BOUNDS[phase];
        let end = if phase + 1 < PHASE_BOUNDS.len() {
            PHASE_BOUNDS[phase + 1]
        } else {
            start + 1.0
        };
        let s = if phase + 1 < PHASE_BOUNDS.len() {
            smoothstep((t_s - start) / (end - start))
        } else {
            1.0
        };

        let (alt0, inc0, raan0) = WAYPOINTS[phase];
        let (alt1, inc1, raan1) = WAYPOINTS[phase + 1];

        OrbitalElements::new(
            self.target.inclination_deg + lerp(inc0, inc1, s),
            self.target.altitude_km + lerp(alt0, alt1, s),
            (self.target.raan_deg + lerp(raan0, raan1, s)).rem_euclid(360.0),
            t_s,
        )
    }

    /// SJ-26's elements and shaped ground track at scenario time `t_s`.
    /// In the terminal phases the back half of the track bends onto the
    /// target's orbit along an intercept transfer arc.
    pub fn track_at(&self, t_s: f64) -> Result<(OrbitalElements, Trajectory)> {
        let elements = self.elements_at(t_s)?;
        let base = generate_trajectory(&elements);
        let track = if self.phase_at(t_s) >= INTERCEPT_PHASE {
            generate_intercept_trajectory(&base, &self.target_track)
        } else {
            base
        };
        Ok((elements, track))
    }

    /// Anomaly observations whose scripted time falls in `(t0, t1]`.
    pub fn events_between(&self, t0: f64, t1: f64) -> Vec<(String, ObservedEvent)> {
        let script: [(f64, AnomalyKind, f64, f64, f64); 4] = [
            (90.0, AnomalyKind::UnexpectedManeuver, 1.2, 0.0, 0.0),
            (180.0, AnomalyKind::PointingChange, 0.0, 18.0, 0.0),
            (240.0, AnomalyKind::OrbitLower, 0.0, 0.0, 8.0),
            (300.0, AnomalyKind::RfEmission, 0.0, 0.0, 0.0),
        ];

        script
            .iter()
            .filter(|(at, ..)| *at > t0 && *at <= t1)
            .map(|(at, kind, dv, pointing, shift)| {
                info!(object = %self.threat_id, at_s = at, kind = ?kind, "scripted anomaly");
                (
                    self.threat_id.clone(),
                    ObservedEvent {
                        kind: *kind,
                        delta_v_ms: *dv,
                        pointing_change_deg: *pointing,
                        altitude_shift_km: *shift,
                        detected_at: Utc::now(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escalation() -> Escalation {
        let target = OrbitalElements::new(63.4, 500.0, 142.0, 0.0).unwrap();
        Escalation::new("sat-25", target)
    }

    #[test]
    fn test_phase_indexing() {
        let esc = escalation();
        assert_eq!(esc.phase_at(0.0), 0);
        assert_eq!(esc.phase_at(89.9), 0);
        assert_eq!(esc.phase_at(90.0), 1);
        assert_eq!(esc.phase_at(180.0), 2);
        assert_eq!(esc.phase_at(300.0), 3);
        assert_eq!(esc.phase_at(10_000.0), 3);
    }

    #[test]
    fn test_elements_converge_on_target() {
        let esc = escalation();
        let start = esc.elements_at(0.0).unwrap();
        assert!((start.altitude_km - 520.0).abs() < 1e-9);
        assert!((start.inclination_deg - 71.4).abs() < 1e-9);

        let parked = esc.elements_at(400.0).unwrap();
        assert!((parked.altitude_km - 500.1).abs() < 1e-9);
        assert!((parked.inclination_deg - 63.42).abs() < 1e-9);
        assert!((parked.raan_deg - 142.1).abs() < 1e-9);
    }

    #[test]
    fn test_offsets_monotonically_shrink() {
        let esc = escalation();
        let mut prev = f64::INFINITY;
        for t in (0..=300).step_by(10) {
            let e = esc.elements_at(t as f64).unwrap();
            let offset = (e.altitude_km - 500.0).abs()
                + (e.inclination_deg - 63.4).abs()
                + (e.raan_deg - 142.0).abs();
            assert!(offset <= prev + 1e-9, "offset grew at t={t}");
            prev = offset;
        }
    }

    #[test]
    fn test_track_bends_onto_target_in_terminal_phases() {
        let esc = escalation();

        // Early phases fly the unmodified track for the morphed elements
        let (elements, track) = esc.track_at(30.0).unwrap();
        let base = generate_trajectory(&elements);
        assert_eq!(track.points(), base.points());

        // Terminal phase: front half still the base orbit, back half on the
        // transfer arc ending at the target shell
        let (elements, track) = esc.track_at(200.0).unwrap();
        let base = generate_trajectory(&elements);
        assert_eq!(track.points()[10], base.points()[10]);
        let last = track.points().last().unwrap();
        let base_last = base.points().last().unwrap();
        assert!(
            (last.altitude_km - 500.0).abs() <= (base_last.altitude_km - 500.0).abs() + 1e-9,
            "terminal track did not close on the target shell"
        );
        assert!((last.altitude_km - 500.0).abs() < 5.0);
    }

    #[test]
    fn test_events_fire_once_per_window() {
        let esc = escalation();
        let events = esc.events_between(0.0, 100.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.kind, AnomalyKind::UnexpectedManeuver);

        // already-delivered events do not repeat
        assert!(esc.events_between(100.0, 170.0).is_empty());

        let late = esc.events_between(170.0, 400.0);
        assert_eq!(late.len(), 3);
        assert_eq!(late[2].1.kind, AnomalyKind::RfEmission);
    }
}
