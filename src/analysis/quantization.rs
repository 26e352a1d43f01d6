//! Golden-ratio exponents of particle masses.
//!
//! A mass `m` is described relative to a reference mass as `m = m_ref · φ^n`.
//! The exponent is recovered as `n = ln(m / m_ref) / ln φ` and snapped onto a
//! lattice of step 1, 1/2 or 1/4. The quarter lattice index `q = round(4n)` is
//! what the Casimir decomposition works with.

use crate::domain::model::{Particle, ParticleKind};
use crate::utils::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PHI: f64 = 1.618_033_988_749_895;

pub const DEFAULT_FACTORS: [u32; 6] = [1, 2, 3, 4, 5, 6];
pub const DEFAULT_DIVISORS: [f64; 5] = [0.25, 0.5, 1.0, 2.0, 3.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Integer,
    Half,
    Quarter,
}

impl Step {
    pub fn divisions(&self) -> u32 {
        match self {
            Step::Integer => 1,
            Step::Half => 2,
            Step::Quarter => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Integer => "integer",
            Step::Half => "half",
            Step::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "1" => Ok(Step::Integer),
            "half" | "0.5" => Ok(Step::Half),
            "quarter" | "0.25" => Ok(Step::Quarter),
            other => Err(AnalysisError::InvalidConfigValueError {
                field: "step".to_string(),
                value: other.to_string(),
                reason: "Expected one of: integer, half, quarter".to_string(),
            }),
        }
    }
}

/// Exponent `n` such that `mass = reference · φ^n`.
pub fn golden_exponent(name: &str, mass_gev: f64, reference_mass_gev: f64) -> Result<f64> {
    if !(reference_mass_gev > 0.0) {
        return Err(AnalysisError::InvalidMass {
            name: "reference".to_string(),
            mass_gev: reference_mass_gev,
        });
    }
    if !(mass_gev > 0.0) {
        return Err(AnalysisError::InvalidMass {
            name: name.to_string(),
            mass_gev,
        });
    }
    Ok((mass_gev / reference_mass_gev).ln() / PHI.ln())
}

pub fn quantize(n: f64, step: Step) -> f64 {
    let d = step.divisions() as f64;
    (n * d).round() / d
}

/// Quarter-lattice index of an exponent.
pub fn quarter_index(n: f64) -> i64 {
    (n * 4.0).round() as i64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenFit {
    pub name: String,
    pub kind: ParticleKind,
    pub mass_gev: f64,
    pub n_exact: f64,
    pub n_quantized: f64,
    pub step: Step,
    pub q: i64,
    pub predicted_mass_gev: f64,
    pub error_pct: f64,
}

pub fn fit_particle(particle: &Particle, reference: &Particle, step: Step) -> Result<GoldenFit> {
    let n_exact = golden_exponent(&particle.name, particle.mass_gev, reference.mass_gev)?;
    let n_quantized = quantize(n_exact, step);
    let predicted_mass_gev = reference.mass_gev * PHI.powf(n_quantized);
    let error_pct = (predicted_mass_gev - particle.mass_gev).abs() / particle.mass_gev * 100.0;

    Ok(GoldenFit {
        name: particle.name.clone(),
        kind: particle.kind,
        mass_gev: particle.mass_gev,
        n_exact,
        n_quantized,
        step,
        q: quarter_index(n_exact),
        predicted_mass_gev,
        error_pct,
    })
}

/// Whichever of the integer and half-integer lattices lands closer; ties go to integer.
pub fn best_integer_or_half(particle: &Particle, reference: &Particle) -> Result<GoldenFit> {
    let integer = fit_particle(particle, reference, Step::Integer)?;
    let half = fit_particle(particle, reference, Step::Half)?;
    if half.error_pct < integer.error_pct {
        Ok(half)
    } else {
        Ok(integer)
    }
}

/// Fits every massive particle, ordered by ascending exponent.
pub fn fit_catalog(particles: &[Particle], reference: &Particle, step: Step) -> Result<Vec<GoldenFit>> {
    let mut fits = particles
        .iter()
        .filter(|p| p.is_massive())
        .map(|p| fit_particle(p, reference, step))
        .collect::<Result<Vec<_>>>()?;
    fits.sort_by(|a, b| a.n_exact.total_cmp(&b.n_exact));
    Ok(fits)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub within_threshold: usize,
    pub total: usize,
    pub threshold_pct: f64,
}

/// Counts fits under the error threshold; the reference particle is left out of both counts.
pub fn summarize(fits: &[GoldenFit], reference: &str, threshold_pct: f64) -> FitSummary {
    let others: Vec<&GoldenFit> = fits.iter().filter(|f| f.name != reference).collect();
    FitSummary {
        within_threshold: others.iter().filter(|f| f.error_pct < threshold_pct).count(),
        total: others.len(),
        threshold_pct,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCheck {
    pub factor: u32,
    pub value: f64,
    pub is_integer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    pub name: String,
    pub n: f64,
    pub checks: Vec<FactorCheck>,
}

pub fn factor_integrality(name: &str, n: f64, factors: &[u32], tolerance: f64) -> FactorRow {
    let checks = factors
        .iter()
        .map(|&factor| {
            let value = factor as f64 * n;
            FactorCheck {
                factor,
                value,
                is_integer: (value - value.round()).abs() < tolerance,
            }
        })
        .collect();

    FactorRow {
        name: name.to_string(),
        n,
        checks,
    }
}

/// Gaps between consecutive quantised exponents, smallest exponent first.
pub fn successive_differences(fits: &[GoldenFit]) -> Vec<f64> {
    let mut values: Vec<f64> = fits.iter().map(|f| f.n_quantized).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisorCheck {
    pub divisor: f64,
    pub works: bool,
    pub max_error: f64,
    pub multipliers: Vec<i64>,
}

pub fn divisor_check(diffs: &[f64], divisors: &[f64], tolerance: f64) -> Vec<DivisorCheck> {
    divisors
        .iter()
        .map(|&divisor| {
            let multipliers: Vec<i64> = diffs.iter().map(|d| (d / divisor).round() as i64).collect();
            let max_error = diffs
                .iter()
                .zip(&multipliers)
                .map(|(d, &m)| (d - m as f64 * divisor).abs())
                .fold(0.0_f64, f64::max);
            DivisorCheck {
                divisor,
                works: max_error < tolerance,
                max_error,
                multipliers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_model;

    fn particle(name: &str) -> Particle {
        standard_model()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn test_phi_constant() {
        assert!((PHI - (1.0 + 5f64.sqrt()) / 2.0).abs() < 1e-15);
        assert!((PHI * PHI - PHI - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_golden_exponent_of_reference_is_zero() {
        let n = golden_exponent("electron", 0.000511, 0.000511).unwrap();
        assert!(n.abs() < 1e-12);

        let n = golden_exponent("x", 0.000511 * PHI.powi(7), 0.000511).unwrap();
        assert!((n - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_golden_exponent_rejects_massless() {
        assert!(matches!(
            golden_exponent("photon", 0.0, 0.000511),
            Err(AnalysisError::InvalidMass { .. })
        ));
        assert!(golden_exponent("muon", 0.105, 0.0).is_err());
        assert!(golden_exponent("muon", f64::NAN, 0.000511).is_err());
    }

    #[test]
    fn test_quantize_steps() {
        assert_eq!(quantize(11.0795, Step::Integer), 11.0);
        assert_eq!(quantize(4.5979, Step::Half), 4.5);
        assert_eq!(quantize(10.8143, Step::Quarter), 10.75);
        assert_eq!(quarter_index(16.9447), 68);
        assert_eq!(quarter_index(-27.7783), -111);
    }

    #[test]
    fn test_step_from_str() {
        assert_eq!("quarter".parse::<Step>().unwrap(), Step::Quarter);
        assert_eq!("Half".parse::<Step>().unwrap(), Step::Half);
        assert_eq!("1".parse::<Step>().unwrap(), Step::Integer);
        assert!("third".parse::<Step>().is_err());
    }

    #[test]
    fn test_fit_muon_against_electron() {
        let fit = fit_particle(&particle("muon"), &particle("electron"), Step::Quarter).unwrap();
        assert!((fit.n_exact - 11.0795).abs() < 1e-3);
        assert_eq!(fit.n_quantized, 11.0);
        assert_eq!(fit.q, 44);
        assert!((fit.error_pct - 3.75).abs() < 0.05);
    }

    #[test]
    fn test_up_quark_is_a_close_fit() {
        let fit = fit_particle(&particle("up_quark"), &particle("electron"), Step::Quarter).unwrap();
        assert_eq!(fit.q, 12);
        assert!(fit.error_pct < 0.5);
    }

    #[test]
    fn test_best_integer_or_half_prefers_half_for_down_quark() {
        let fit = best_integer_or_half(&particle("down_quark"), &particle("electron")).unwrap();
        assert_eq!(fit.step, Step::Half);
        assert_eq!(fit.n_quantized, 4.5);
    }

    #[test]
    fn test_best_integer_or_half_prefers_integer_for_tau() {
        let fit = best_integer_or_half(&particle("tau"), &particle("electron")).unwrap();
        assert_eq!(fit.step, Step::Integer);
        assert_eq!(fit.n_quantized, 17.0);
    }

    #[test]
    fn test_best_integer_or_half_tie_goes_to_integer() {
        let electron = particle("electron");
        let mut on_lattice = particle("muon");
        on_lattice.mass_gev = electron.mass_gev * PHI.powi(7);

        let integer = fit_particle(&on_lattice, &electron, Step::Integer).unwrap();
        let half = fit_particle(&on_lattice, &electron, Step::Half).unwrap();
        assert_eq!(integer.error_pct, half.error_pct);

        let fit = best_integer_or_half(&on_lattice, &electron).unwrap();
        assert_eq!(fit.step, Step::Integer);
        assert_eq!(fit.n_quantized, 7.0);
    }

    #[test]
    fn test_fit_catalog_skips_massless_and_sorts() {
        let catalog = standard_model();
        let fits = fit_catalog(&catalog, &particle("electron"), Step::Quarter).unwrap();
        assert_eq!(fits.len(), 15);
        assert_eq!(fits[0].name, "electron_neutrino");
        assert_eq!(fits.last().unwrap().name, "top_quark");
        assert!(fits.windows(2).all(|w| w[0].n_exact <= w[1].n_exact));
        assert!(!fits.iter().any(|f| f.name == "photon" || f.name == "gluon"));
    }

    #[test]
    fn test_summarize_excludes_reference() {
        let catalog = standard_model();
        let fits = fit_catalog(&catalog, &particle("electron"), Step::Quarter).unwrap();
        let summary = summarize(&fits, "electron", 5.0);
        assert_eq!(summary.total, 14);
        assert!(summary.within_threshold < summary.total);
        assert!(summary.within_threshold >= 9);
    }

    #[test]
    fn test_factor_integrality() {
        let row = factor_integrality("strange_quark", 10.75, &DEFAULT_FACTORS, 1e-3);
        let integral: Vec<u32> = row
            .checks
            .iter()
            .filter(|c| c.is_integer)
            .map(|c| c.factor)
            .collect();
        assert_eq!(integral, vec![4]);
    }

    #[test]
    fn test_divisor_check() {
        let diffs = [0.25, 0.5, 1.0];
        let checks = divisor_check(&diffs, &[0.25, 0.5], 0.01);

        assert!(checks[0].works);
        assert_eq!(checks[0].multipliers, vec![1, 2, 4]);

        assert!(!checks[1].works);
        assert!((checks[1].max_error - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_successive_differences() {
        let catalog = standard_model();
        let fits = fit_catalog(&catalog, &particle("electron"), Step::Quarter).unwrap();
        let diffs = successive_differences(&fits);
        assert_eq!(diffs.len(), fits.len() - 1);
        assert!(diffs.iter().all(|d| *d >= 0.0));
        assert!(divisor_check(&diffs, &[0.25], 0.01)[0].works);
    }
}
