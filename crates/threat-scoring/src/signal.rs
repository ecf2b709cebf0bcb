//! Signal-interception scoring
//!
//! Models the communication beam as the segment from the asset to a fixed
//! ground station and scores how close an interceptor sits to that beam.
//! The exponential lateral falloff is a deliberate proxy for antenna/
//! beamwidth geometry, not an RF link budget.

use nalgebra::Vector3;
use orbit_propagation::{eci_position, ground_position};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Severity, SignalThreat, TrackedObject};

/// A fixed downlink ground station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundStation {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Exponential decay constant for lateral offset (km)
    pub decay_km: f64,
    /// Probability floor; an interceptor is never fully invisible
    pub probability_floor: f64,
    /// Offset inside which a comm window counts as at risk (km)
    pub detection_radius_km: f64,
    /// Scheduled comm windows evaluated per record
    pub window_count: usize,
    /// Spacing between scheduled windows (minutes)
    pub window_spacing_minutes: f64,
    /// Probability above which severity is threatened
    pub threatened_probability: f64,
    /// Probability above which severity is watched
    pub watched_probability: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            decay_km: 50.0,
            probability_floor: 0.02,
            detection_radius_km: 200.0,
            window_count: 8,
            window_spacing_minutes: 45.0,
            threatened_probability: 0.5,
            watched_probability: 0.2,
        }
    }
}

/// Score the interception risk on the `asset` → `station` link posed by
/// `interceptor` at evaluation time `now_s`.
pub fn score_signal_intercept(
    station: &GroundStation,
    asset: &TrackedObject,
    interceptor: &TrackedObject,
    now_s: f64,
    cfg: &SignalConfig,
) -> SignalThreat {
    let gs = ground_position(station.latitude_deg, station.longitude_deg);
    let asset_pos = eci_position(&asset.trajectory.sample_at(now_s));
    let intercept_pos = eci_position(&interceptor.trajectory.sample_at(now_s));

    let offset = beam_offset_km(&gs, &asset_pos, &intercept_pos);
    let probability = (-offset / cfg.decay_km)
        .exp()
        .clamp(cfg.probability_floor, 1.0);

    // Bearing offset at the asset between the downlink and the interceptor
    let to_station = (gs - asset_pos).normalize();
    let to_interceptor = intercept_pos - asset_pos;
    let signal_path_angle_deg = if to_interceptor.norm() > 1e-6 {
        to_station
            .dot(&to_interceptor.normalize())
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees()
    } else {
        0.0
    };

    // Count scheduled windows whose geometry falls inside the detection
    // radius, sampling both trajectories at each window time
    let mut windows_at_risk = 0;
    for w in 0..cfg.window_count {
        let t = now_s + w as f64 * cfg.window_spacing_minutes * 60.0;
        let a = eci_position(&asset.trajectory.sample_at(t));
        let i = eci_position(&interceptor.trajectory.sample_at(t));
        if beam_offset_km(&gs, &a, &i) < cfg.detection_radius_km {
            windows_at_risk += 1;
        }
    }

    let severity = if probability > cfg.threatened_probability {
        Severity::Threatened
    } else if probability > cfg.watched_probability {
        Severity::Watched
    } else {
        Severity::Nominal
    };

    SignalThreat {
        id: format!("sig-{}", Uuid::new_v4()),
        interceptor_id: interceptor.id.clone(),
        asset_id: asset.id.clone(),
        ground_station: station.name.clone(),
        severity,
        confidence: probability,
        interception_probability: probability,
        signal_path_angle_deg,
        windows_at_risk,
        total_windows: cfg.window_count,
    }
}

/// Perpendicular distance from `point` to the segment `a`→`b` (km). Falls
/// back to the nearer endpoint when the projection leaves the segment.
fn beam_offset_km(a: &Vector3<f64>, b: &Vector3<f64>, point: &Vector3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-12 {
        return (point - a).norm();
    }
    let t = (point - a).dot(&ab) / len_sq;
    let closest = a + ab * t.clamp(0.0, 1.0);
    (point - closest).norm()
}
