use crate::analysis::quantization::PHI;
use crate::domain::model::Particle;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_POWER: u32 = 10;
pub const DEFAULT_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhiPowerMatch {
    pub heavier: String,
    pub lighter: String,
    pub ratio: f64,
    pub power: u32,
    pub phi_power: f64,
    pub relative_error: f64,
}

fn massive_sorted(particles: &[Particle]) -> Vec<&Particle> {
    let mut massive: Vec<&Particle> = particles.iter().filter(|p| p.is_massive()).collect();
    massive.sort_by(|a, b| a.mass_gev.total_cmp(&b.mass_gev));
    massive
}

/// Pairs whose mass ratio sits within `tolerance` (relative) of φ^k for k in 1..=max_power.
pub fn phi_power_matches(particles: &[Particle], max_power: u32, tolerance: f64) -> Vec<PhiPowerMatch> {
    let massive = massive_sorted(particles);
    let mut matches = Vec::new();

    for (i, lighter) in massive.iter().enumerate() {
        for heavier in &massive[i + 1..] {
            if heavier.mass_gev <= lighter.mass_gev {
                continue;
            }
            let ratio = heavier.mass_gev / lighter.mass_gev;
            for power in 1..=max_power {
                let phi_power = PHI.powi(power as i32);
                let relative_error = (ratio - phi_power).abs() / phi_power;
                if relative_error < tolerance {
                    matches.push(PhiPowerMatch {
                        heavier: heavier.name.clone(),
                        lighter: lighter.name.clone(),
                        ratio,
                        power,
                        phi_power,
                        relative_error,
                    });
                }
            }
        }
    }
    matches
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogSpacing {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Statistics of consecutive `ln m` gaps over the mass-sorted massive particles.
pub fn log_spacing(particles: &[Particle]) -> Option<LogSpacing> {
    let logs: Vec<f64> = massive_sorted(particles)
        .iter()
        .map(|p| p.mass_gev.ln())
        .collect();
    if logs.len() < 2 {
        return None;
    }

    let diffs: Vec<f64> = logs.windows(2).map(|w| w[1] - w[0]).collect();
    let count = diffs.len() as f64;
    let mean = diffs.iter().sum::<f64>() / count;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / count;

    Some(LogSpacing {
        mean,
        std_dev: variance.sqrt(),
        min: diffs.iter().copied().fold(f64::INFINITY, f64::min),
        max: diffs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Ratio of two named catalog masses, when both are present and massive.
pub fn mass_ratio(particles: &[Particle], numerator: &str, denominator: &str) -> Option<f64> {
    let num = particles.iter().find(|p| p.name == numerator)?;
    let den = particles.iter().find(|p| p.name == denominator)?;
    if den.is_massive() {
        Some(num.mass_gev / den.mass_gev)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_model;
    use crate::domain::model::ParticleKind;

    fn lepton(name: &str, mass: f64) -> Particle {
        Particle::new(name, mass, -1.0, 0.5, ParticleKind::Lepton, 1)
    }

    #[test]
    fn test_exact_phi_power_is_matched() {
        let particles = vec![lepton("light", 1.0), lepton("heavy", PHI.powi(3))];
        let matches = phi_power_matches(&particles, 10, 0.05);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].power, 3);
        assert_eq!(matches[0].heavier, "heavy");
        assert!(matches[0].relative_error < 1e-12);
    }

    #[test]
    fn test_massless_and_equal_masses_are_skipped() {
        let particles = vec![
            lepton("a", 1.0),
            lepton("b", 1.0),
            lepton("massless", 0.0),
        ];
        assert!(phi_power_matches(&particles, 10, 0.05).is_empty());
    }

    #[test]
    fn test_standard_model_matches_are_within_tolerance() {
        let matches = phi_power_matches(&standard_model(), DEFAULT_MAX_POWER, DEFAULT_TOLERANCE);
        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.relative_error < DEFAULT_TOLERANCE));
        // Z/W = 1.1345 is not near any power of phi
        assert!(!matches
            .iter()
            .any(|m| m.heavier == "Z_boson" && m.lighter == "W_boson"));
    }

    #[test]
    fn test_log_spacing() {
        let e = std::f64::consts::E;
        let particles = vec![lepton("a", 1.0), lepton("b", e), lepton("c", e * e * e)];
        let spacing = log_spacing(&particles).unwrap();
        assert!((spacing.mean - 1.5).abs() < 1e-12);
        assert!((spacing.std_dev - 0.5).abs() < 1e-12);
        assert!((spacing.min - 1.0).abs() < 1e-12);
        assert!((spacing.max - 2.0).abs() < 1e-12);

        assert!(log_spacing(&[lepton("only", 1.0)]).is_none());
    }

    #[test]
    fn test_mass_ratio() {
        let catalog = standard_model();
        let r = mass_ratio(&catalog, "muon", "electron").unwrap();
        assert!((r - 206.768).abs() < 0.01);
        assert!(mass_ratio(&catalog, "muon", "photon").is_none());
        assert!(mass_ratio(&catalog, "muon", "graviton").is_none());
    }
}
