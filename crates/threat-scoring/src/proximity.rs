//! Conjunction/proximity scoring
//!
//! Nearest-sample separation now, bounded look-ahead walk for minimum
//! separation and TCA, and geometry-based approach-pattern classification.
//! Numeric cutoffs here are configurable policy, not physics.

use nalgebra::Vector3;
use orbit_propagation::{eci_position, EARTH_RADIUS_KM};
use uuid::Uuid;

use crate::bayes;
use crate::{ApproachPattern, ProximityThreat, Severity, TrackedObject};

#[derive(Debug, Clone)]
pub struct ProximityConfig {
    /// Look-ahead window for the TCA search (minutes)
    pub lookahead_minutes: f64,
    /// Walk step inside the window (seconds)
    pub step_s: f64,
    /// Separation rate below which a flat approach reads as co-orbital (km/s)
    pub co_orbital_max_velocity_kms: f64,
    /// Separation rate above which a converging approach reads as direct (km/s)
    pub direct_min_velocity_kms: f64,
    /// Max separation spread (fraction of mean) still considered flat
    pub flat_separation_tolerance: f64,
    /// Max lateral offset for a drift classification (km)
    pub drift_max_lateral_km: f64,
    /// Approach-bearing alignment with the sun vector that flags sun-hiding (deg)
    pub sun_alignment_tolerance_deg: f64,
    /// Miss distance below which severity is threatened (km)
    pub threatened_km: f64,
    /// Miss distance below which severity is watched (km)
    pub watched_km: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            lookahead_minutes: 180.0,
            step_s: 30.0,
            co_orbital_max_velocity_kms: 0.05,
            direct_min_velocity_kms: 1.0,
            flat_separation_tolerance: 0.10,
            drift_max_lateral_km: 50.0,
            sun_alignment_tolerance_deg: 15.0,
            threatened_km: 5.0,
            watched_km: 50.0,
        }
    }
}

/// Kinematic summary of one look-ahead walk, used for classification.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Kinematics {
    pub relative_velocity_kms: f64,
    pub separation_start_km: f64,
    pub separation_end_km: f64,
    pub min_separation_km: f64,
    pub max_separation_km: f64,
    pub mean_separation_km: f64,
    pub lateral_km: f64,
    pub altitude_closing: bool,
    pub sun_aligned: bool,
}

/// Score one foreign-object-vs-asset pair at evaluation time `now_s`.
pub fn score_proximity(
    subject: &TrackedObject,
    counterpart: &TrackedObject,
    now_s: f64,
    cfg: &ProximityConfig,
) -> ProximityThreat {
    let window_s = cfg.lookahead_minutes * 60.0;
    let steps = (window_s / cfg.step_s).ceil() as usize;

    let mut min_sep = f64::INFINITY;
    let mut max_sep = 0.0f64;
    let mut sum_sep = 0.0;
    let mut t_min = now_s;
    let mut sep_start = 0.0;
    let mut sep_end = 0.0;
    let mut alt_diffs = Vec::with_capacity(steps + 1);

    for k in 0..=steps {
        let t = now_s + k as f64 * cfg.step_s;
        let pa = subject.trajectory.sample_at(t);
        let pb = counterpart.trajectory.sample_at(t);
        let sep = (eci_position(&pa) - eci_position(&pb)).norm();

        if k == 0 {
            sep_start = sep;
        }
        if k == steps {
            sep_end = sep;
        }
        if sep < min_sep {
            min_sep = sep;
            t_min = t;
        }
        max_sep = max_sep.max(sep);
        sum_sep += sep;
        alt_diffs.push((pa.altitude_km - pb.altitude_km).abs());
    }

    let mean_sep = sum_sep / (steps + 1) as f64;
    let tca_minutes = (t_min - now_s) / 60.0;

    // Approach speed is the separation rate, not the inertial relative
    // speed: a trailing twin on the same orbit keeps a constant range and
    // must read as near-zero.
    let rel_now = relative_vector(subject, counterpart, now_s);
    let sep_next = relative_vector(subject, counterpart, now_s + cfg.step_s).norm();
    let relative_velocity_kms = ((sep_next - rel_now.norm()) / cfg.step_s).abs();

    // Lateral (along-shell) offset at evaluation time
    let pa = subject.trajectory.sample_at(now_s);
    let pb = counterpart.trajectory.sample_at(now_s);
    let ua = eci_position(&pa).normalize();
    let ub = eci_position(&pb).normalize();
    let mean_radius = EARTH_RADIUS_KM + (pa.altitude_km + pb.altitude_km) / 2.0;
    let lateral_km = ua.dot(&ub).clamp(-1.0, 1.0).acos() * mean_radius;

    let altitude_closing = alt_diffs
        .windows(2)
        .all(|w| w[1] <= w[0] + 1e-6)
        && alt_diffs.last().copied().unwrap_or(0.0) < alt_diffs.first().copied().unwrap_or(0.0);

    // Sun-hiding: approach bearing aligned with the subject's sun vector
    let bearing = rel_now.norm();
    let sun_aligned = if bearing > 1e-6 {
        let approach = rel_now / bearing;
        let sun = sun_vector(now_s);
        approach.dot(&sun).clamp(-1.0, 1.0).acos().to_degrees() < cfg.sun_alignment_tolerance_deg
    } else {
        false
    };

    let kin = Kinematics {
        relative_velocity_kms,
        separation_start_km: sep_start,
        separation_end_km: sep_end,
        min_separation_km: min_sep,
        max_separation_km: max_sep,
        mean_separation_km: mean_sep,
        lateral_km,
        altitude_closing,
        sun_aligned,
    };
    let (pattern, sun_hiding_detected) = classify_pattern(&kin, cfg);

    let severity = severity_for(min_sep, cfg);

    // Bayesian posterior on minimum separation, tightened by closing
    // geometry and a shorter TCA
    let prior = bayes::prior(subject.country_code.as_deref(), subject.rcs_size.as_deref());
    let lr = bayes::likelihood_ratio(min_sep, &bayes::SEPARATION_THREAT, &bayes::SEPARATION_BENIGN);
    let posterior = bayes::posterior(prior, lr);
    let tca_factor = (1.0 - tca_minutes / cfg.lookahead_minutes).clamp(0.0, 1.0);
    let closing_factor = if sep_start > 1e-6 {
        ((sep_start - min_sep) / sep_start).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let confidence =
        (posterior * (0.5 + 0.3 * tca_factor + 0.2 * closing_factor)).clamp(0.0, 1.0);

    ProximityThreat {
        id: format!("prox-{}", Uuid::new_v4()),
        subject_id: subject.id.clone(),
        counterpart_id: counterpart.id.clone(),
        severity,
        confidence,
        miss_distance_km: min_sep,
        tca_minutes,
        approach_velocity_kms: relative_velocity_kms,
        pattern,
        sun_hiding_detected,
    }
}

pub(crate) fn severity_for(miss_km: f64, cfg: &ProximityConfig) -> Severity {
    if miss_km < cfg.threatened_km {
        Severity::Threatened
    } else if miss_km < cfg.watched_km {
        Severity::Watched
    } else {
        Severity::Nominal
    }
}

pub(crate) fn classify_pattern(
    kin: &Kinematics,
    cfg: &ProximityConfig,
) -> (ApproachPattern, bool) {
    let flat = (kin.max_separation_km - kin.min_separation_km)
        <= cfg.flat_separation_tolerance * kin.mean_separation_km.max(1e-6);
    let closing = kin.separation_end_km < kin.separation_start_km;

    let pattern = if kin.relative_velocity_kms < cfg.co_orbital_max_velocity_kms && flat {
        ApproachPattern::CoOrbital
    } else if kin.sun_aligned {
        ApproachPattern::SunHiding
    } else if kin.relative_velocity_kms > cfg.direct_min_velocity_kms && closing {
        ApproachPattern::Direct
    } else if kin.lateral_km < cfg.drift_max_lateral_km && kin.altitude_closing {
        ApproachPattern::Drift
    } else if closing {
        ApproachPattern::Drift
    } else {
        ApproachPattern::CoOrbital
    };

    (pattern, kin.sun_aligned)
}

fn relative_vector(a: &TrackedObject, b: &TrackedObject, t: f64) -> Vector3<f64> {
    eci_position(&a.trajectory.sample_at(t)) - eci_position(&b.trajectory.sample_at(t))
}

/// Crude sun direction: subsolar longitude from the time of day, zero
/// declination. Enough to flag bearing alignment, nothing more.
fn sun_vector(t_s: f64) -> Vector3<f64> {
    let day_fraction = (t_s / 86400.0).rem_euclid(1.0);
    let lon = (180.0 - day_fraction * 360.0).to_radians();
    Vector3::new(lon.cos(), lon.sin(), 0.0)
}
