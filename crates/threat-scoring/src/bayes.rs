//! Bayesian confidence scoring
//!
//! Log-normal likelihood-ratio updates shared by the proximity and
//! similarity scorers. Benign distributions were fitted from a 500-object
//! non-adversarial sample; threat distributions are expert-informed
//! (inspector standoff distances and shadowing divergence).

/// Log-normal distribution parameters.
#[derive(Debug, Clone, Copy)]
pub struct LogNormal {
    pub mu: f64,
    pub sigma: f64,
}

impl LogNormal {
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// PDF at `x`; zero for non-positive `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let log_x = x.ln();
        let exponent = -((log_x - self.mu).powi(2)) / (2.0 * self.sigma.powi(2));
        (1.0 / (x * self.sigma * (2.0 * std::f64::consts::PI).sqrt())) * exponent.exp()
    }
}

/// Benign minimum-separation distribution (km).
pub const SEPARATION_BENIGN: LogNormal = LogNormal::new(5.063, 1.369);
/// Threat minimum-separation distribution (km), inspector standoff profile.
pub const SEPARATION_THREAT: LogNormal = LogNormal::new(3.5, 1.2);

/// Benign orbital-divergence distribution; random pairs diverge widely.
pub const DIVERGENCE_BENIGN: LogNormal = LogNormal::new(0.2, 0.6);
/// Threat orbital-divergence distribution; shadowing pairs nearly identical.
pub const DIVERGENCE_THREAT: LogNormal = LogNormal::new(-3.0, 0.8);

pub const PRIOR_ADVERSARIAL: f64 = 0.5;
pub const PRIOR_BENIGN: f64 = 0.00005;
pub const SMALL_RCS_MULTIPLIER: f64 = 1.5;

const ADVERSARIAL_COUNTRIES: [&str; 3] = ["PRC", "CIS", "RUS"];

/// Whether the attribution falls inside the threat model's country set.
pub fn adversarial(country_code: Option<&str>) -> bool {
    matches!(country_code, Some(c) if ADVERSARIAL_COUNTRIES.contains(&c))
}

/// Prior P(threat) from country attribution and radar cross section.
pub fn prior(country_code: Option<&str>, rcs_size: Option<&str>) -> f64 {
    let base = if adversarial(country_code) {
        PRIOR_ADVERSARIAL
    } else {
        PRIOR_BENIGN
    };
    if rcs_size == Some("SMALL") {
        (base * SMALL_RCS_MULTIPLIER).min(1.0)
    } else {
        base
    }
}

/// LR = P(x | threat) / P(x | benign). Returns infinity when `x` is at or
/// below zero under a threat model peaked at zero; callers clamp the
/// posterior to 1.0 in that case.
pub fn likelihood_ratio(x: f64, threat: &LogNormal, benign: &LogNormal) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    threat.pdf(x) / benign.pdf(x).max(1e-12)
}

/// Bayesian update: P(threat | x) = LR·prior / (LR·prior + 1 − prior).
pub fn posterior(prior: f64, lr: f64) -> f64 {
    if prior <= 0.0 {
        return 0.0;
    }
    if prior >= 1.0 || lr.is_infinite() {
        return 1.0;
    }
    let num = lr * prior;
    let den = num + (1.0 - prior);
    if den <= 0.0 {
        return 0.0;
    }
    (num / den).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_zero_below_support() {
        assert_eq!(SEPARATION_BENIGN.pdf(0.0), 0.0);
        assert_eq!(SEPARATION_BENIGN.pdf(-5.0), 0.0);
        assert!(SEPARATION_BENIGN.pdf(100.0) > 0.0);
    }

    #[test]
    fn test_posterior_monotone_in_separation() {
        // Closer approach => larger LR => larger posterior
        let p = prior(Some("PRC"), None);
        let close = posterior(
            p,
            likelihood_ratio(2.0, &SEPARATION_THREAT, &SEPARATION_BENIGN),
        );
        let far = posterior(
            p,
            likelihood_ratio(400.0, &SEPARATION_THREAT, &SEPARATION_BENIGN),
        );
        assert!(close > far, "close {close} far {far}");
    }

    #[test]
    fn test_identical_orbits_clamp_to_one() {
        let lr = likelihood_ratio(0.0, &DIVERGENCE_THREAT, &DIVERGENCE_BENIGN);
        assert!(lr.is_infinite());
        assert_eq!(posterior(0.5, lr), 1.0);
    }

    #[test]
    fn test_prior_attribution() {
        assert_eq!(prior(Some("PRC"), None), PRIOR_ADVERSARIAL);
        assert_eq!(prior(Some("USA"), None), PRIOR_BENIGN);
        assert_eq!(prior(None, None), PRIOR_BENIGN);
        assert!(prior(Some("RUS"), Some("SMALL")) > PRIOR_ADVERSARIAL);
    }
}
