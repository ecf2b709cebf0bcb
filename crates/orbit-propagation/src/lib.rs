//! Orbit Propagation Library
//!
//! Circular-orbit ground-track synthesis for the Orbital Shield engine.
//! Keplerian period + plane rotation only: no J2, no oblateness, no Earth
//! rotation. Visualization-grade fidelity; operational propagation is an
//! external service and out of scope here.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod synth;

pub use synth::{generate_geo_loiter_trajectory, generate_intercept_trajectory};

/// Earth equatorial radius (km)
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Standard gravitational parameter (km^3/s^2)
pub const MU_EARTH: f64 = 398600.4418;

/// Samples per trajectory, spanning exactly one orbital period.
pub const TRAJECTORY_SAMPLES: usize = 180;

#[derive(Error, Debug)]
pub enum ElementsError {
    #[error("Non-finite orbital element: {0}")]
    NonFinite(&'static str),
    #[error("Altitude out of range: {0} km (must be > 0)")]
    AltitudeOutOfRange(f64),
    #[error("Inclination out of range: {0} deg (must be 0-180)")]
    InclinationOutOfRange(f64),
    #[error("RAAN out of range: {0} deg (must be 0-360)")]
    RaanOutOfRange(f64),
}

pub type Result<T> = std::result::Result<T, ElementsError>;

/// Circular-orbit elements. Immutable once constructed; a maneuver yields a
/// new value via [`OrbitalElements::with_maneuver`], never an in-place edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrbitalElements {
    pub inclination_deg: f64,
    pub altitude_km: f64,
    pub raan_deg: f64,
    pub epoch_s: f64,
}

impl OrbitalElements {
    /// Validate and construct. Malformed input is rejected here so the
    /// generator itself can stay a pure function.
    pub fn new(inclination_deg: f64, altitude_km: f64, raan_deg: f64, epoch_s: f64) -> Result<Self> {
        if !inclination_deg.is_finite() {
            return Err(ElementsError::NonFinite("inclination_deg"));
        }
        if !altitude_km.is_finite() {
            return Err(ElementsError::NonFinite("altitude_km"));
        }
        if !raan_deg.is_finite() {
            return Err(ElementsError::NonFinite("raan_deg"));
        }
        if !epoch_s.is_finite() {
            return Err(ElementsError::NonFinite("epoch_s"));
        }
        if altitude_km <= 0.0 {
            return Err(ElementsError::AltitudeOutOfRange(altitude_km));
        }
        if !(0.0..=180.0).contains(&inclination_deg) {
            return Err(ElementsError::InclinationOutOfRange(inclination_deg));
        }
        if !(0.0..=360.0).contains(&raan_deg) {
            return Err(ElementsError::RaanOutOfRange(raan_deg));
        }
        Ok(Self {
            inclination_deg,
            altitude_km,
            raan_deg,
            epoch_s,
        })
    }

    /// Orbital period from Kepler's third law (seconds).
    pub fn period_s(&self) -> f64 {
        let r = EARTH_RADIUS_KM + self.altitude_km;
        2.0 * std::f64::consts::PI * (r.powi(3) / MU_EARTH).sqrt()
    }

    /// Apply a maneuver: replace altitude/RAAN/inclination wholesale and
    /// restamp the epoch. Returns a fresh validated value.
    pub fn with_maneuver(
        &self,
        altitude_delta_km: f64,
        raan_delta_deg: f64,
        inclination_delta_deg: f64,
        epoch_s: f64,
    ) -> Result<Self> {
        let raan = (self.raan_deg + raan_delta_deg).rem_euclid(360.0);
        Self::new(
            (self.inclination_deg + inclination_delta_deg).clamp(0.0, 180.0),
            self.altitude_km + altitude_delta_km,
            raan,
            epoch_s,
        )
    }
}

/// One ground-track sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryPoint {
    pub time_s: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Cyclic ground track: [`TRAJECTORY_SAMPLES`] points spanning one full
/// period. Index N wraps to index 0; consumers must treat this as a closed
/// loop, never a truncated arc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
    period_s: f64,
    epoch_s: f64,
}

impl Trajectory {
    /// Panics on an empty sample set; every track carries at least one
    /// point, and the cyclic lookups divide by the sample count.
    pub fn from_points(points: Vec<TrajectoryPoint>, period_s: f64, epoch_s: f64) -> Self {
        assert!(!points.is_empty(), "trajectory requires at least one sample");
        Self {
            points,
            period_s,
            epoch_s,
        }
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn epoch_s(&self) -> f64 {
        self.epoch_s
    }

    /// Index of the sample nearest in time to `t`, wrapping cyclically.
    pub fn nearest_index(&self, t: f64) -> usize {
        let step = self.period_s / self.points.len() as f64;
        let phase = (t - self.epoch_s).rem_euclid(self.period_s);
        ((phase / step).round() as usize) % self.points.len()
    }

    /// Interpolated sample at arbitrary time `t`, wrapping across the loop
    /// boundary. Longitude interpolates along the shorter arc.
    pub fn sample_at(&self, t: f64) -> TrajectoryPoint {
        let n = self.points.len();
        let step = self.period_s / n as f64;
        let phase = (t - self.epoch_s).rem_euclid(self.period_s);
        let i = (phase / step).floor() as usize % n;
        let j = (i + 1) % n;
        let frac = (phase - i as f64 * step) / step;

        let a = &self.points[i];
        let b = &self.points[j];
        TrajectoryPoint {
            time_s: t,
            latitude_deg: a.latitude_deg + (b.latitude_deg - a.latitude_deg) * frac,
            longitude_deg: wrap_longitude(
                a.longitude_deg + angular_delta(a.longitude_deg, b.longitude_deg) * frac,
            ),
            altitude_km: a.altitude_km + (b.altitude_km - a.altitude_km) * frac,
        }
    }
}

/// Signed shortest angular difference from `from` to `to` (degrees).
fn angular_delta(from: f64, to: f64) -> f64 {
    let mut d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Normalize a longitude into [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    let mut l = lon.rem_euclid(360.0);
    if l >= 180.0 {
        l -= 360.0;
    }
    l
}

/// Generate one full-period ground track from circular-orbit elements.
///
/// Sampling: [`TRAJECTORY_SAMPLES`] equally spaced true-anomaly steps. For
/// each step the unit in-plane position is rotated by inclination then RAAN
/// into an ECI-like frame, then converted to geodetic latitude/longitude.
/// Altitude is constant (eccentricity 0).
pub fn generate_trajectory(elements: &OrbitalElements) -> Trajectory {
    let period = elements.period_s();
    let step = period / TRAJECTORY_SAMPLES as f64;
    let inc = elements.inclination_deg.to_radians();
    let raan = elements.raan_deg.to_radians();

    let mut points = Vec::with_capacity(TRAJECTORY_SAMPLES);
    for i in 0..TRAJECTORY_SAMPLES {
        let t = elements.epoch_s + i as f64 * step;
        let ta = 2.0 * std::f64::consts::PI * (i as f64 / TRAJECTORY_SAMPLES as f64);

        // Unit position in the orbital plane
        let x = ta.cos();
        let y = ta.sin();

        // Rotate by inclination, then RAAN
        let xe = x * raan.cos() - y * inc.cos() * raan.sin();
        let ye = x * raan.sin() + y * inc.cos() * raan.cos();
        let ze = y * inc.sin();

        let lat = ze.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = ye.atan2(xe).to_degrees();

        points.push(TrajectoryPoint {
            time_s: t,
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_km: elements.altitude_km,
        });
    }

    Trajectory::from_points(points, period, elements.epoch_s)
}

/// ECI-like position vector for a ground-track sample (km).
pub fn eci_position(point: &TrajectoryPoint) -> Vector3<f64> {
    let r = EARTH_RADIUS_KM + point.altitude_km;
    let lat = point.latitude_deg.to_radians();
    let lon = point.longitude_deg.to_radians();
    Vector3::new(
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    )
}

/// ECI-like position of a fixed ground point at the Earth's surface (km).
pub fn ground_position(latitude_deg: f64, longitude_deg: f64) -> Vector3<f64> {
    eci_position(&TrajectoryPoint {
        time_s: 0.0,
        latitude_deg,
        longitude_deg,
        altitude_km: 0.0,
    })
}
