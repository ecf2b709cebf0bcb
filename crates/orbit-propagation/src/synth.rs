//! Demo trajectory synthesizers
//!
//! Deterministic generators that morph a baseline orbit into an intercept or
//! loiter path for scripted scenarios. Pure functions over [`Trajectory`];
//! output keeps the generator invariants (180 cyclic points, one period).

use crate::{wrap_longitude, Trajectory, TrajectoryPoint};

/// Linear interpolation.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smooth Hermite easing, clamped to [0, 1].
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Signed shortest angular difference from `from` to `to` (degrees).
fn angular_delta(from: f64, to: f64) -> f64 {
    let mut d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

fn lerp_longitude(a: f64, b: f64, t: f64) -> f64 {
    wrap_longitude(a + angular_delta(a, b) * t)
}

/// Blend the threat's baseline orbit into a quadratic-Bezier transfer arc
/// toward the target's track over the back half of the period. The front
/// half is the unmodified baseline, so the loop stays closed at the wrap.
pub fn generate_intercept_trajectory(threat: &Trajectory, target: &Trajectory) -> Trajectory {
    let n = threat.points().len();
    let half = n / 2;
    let mut points = Vec::with_capacity(n);

    for (i, base) in threat.points().iter().enumerate() {
        if i < half {
            points.push(*base);
            continue;
        }

        let goal = &target.points()[i.min(target.points().len() - 1)];
        let s = smoothstep((i - half) as f64 / (n - half) as f64);

        // Control point: halfway track at the threat's own altitude, so the
        // arc departs tangentially before diving toward the target shell.
        let ctrl_lat = lerp(base.latitude_deg, goal.latitude_deg, 0.5);
        let ctrl_lon = lerp_longitude(base.longitude_deg, goal.longitude_deg, 0.5);
        let ctrl_alt = base.altitude_km;

        let inv = 1.0 - s;
        let w_base = inv * inv;
        let w_ctrl = 2.0 * inv * s;
        let w_goal = s * s;

        let lat = w_base * base.latitude_deg + w_ctrl * ctrl_lat + w_goal * goal.latitude_deg;
        // Longitude blends via offsets from the baseline to stay on the short arc
        let lon = wrap_longitude(
            base.longitude_deg
                + w_ctrl * angular_delta(base.longitude_deg, ctrl_lon)
                + w_goal * angular_delta(base.longitude_deg, goal.longitude_deg),
        );
        let alt = w_base * base.altitude_km + w_ctrl * ctrl_alt + w_goal * goal.altitude_km;

        points.push(TrajectoryPoint {
            time_s: base.time_s,
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_km: alt,
        });
    }

    Trajectory::from_points(points, threat.period_s(), threat.epoch_s())
}

/// Morph a LEO ground track so it loiters near a fixed geographic point.
///
/// The morph weight rises and falls over the period (zero at both ends), so
/// the track detours to the loiter point mid-period and still closes at the
/// wrap. A small figure-eight wiggle keeps the loiter visually alive.
pub fn generate_geo_loiter_trajectory(
    base: &Trajectory,
    target_lat: f64,
    target_lon: f64,
) -> Trajectory {
    let n = base.points().len();
    let mut points = Vec::with_capacity(n);

    for (i, p) in base.points().iter().enumerate() {
        let phase = i as f64 / n as f64;
        let w = smoothstep((std::f64::consts::PI * phase).sin());

        let wiggle = 4.0 * std::f64::consts::PI * phase;
        let loiter_lat = target_lat + 2.0 * wiggle.sin();
        let loiter_lon = target_lon + 3.0 * (wiggle * 0.5).cos();

        points.push(TrajectoryPoint {
            time_s: p.time_s,
            latitude_deg: lerp(p.latitude_deg, loiter_lat, w).clamp(-90.0, 90.0),
            longitude_deg: lerp_longitude(p.longitude_deg, loiter_lon, w),
            altitude_km: p.altitude_km,
        });
    }

    Trajectory::from_points(points, base.period_s(), base.epoch_s())
}
