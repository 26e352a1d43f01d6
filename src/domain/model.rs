use crate::analysis::casimir::{Coefficients, Prediction, Verification, VerificationSummary};
use crate::analysis::digital_root::{FibonacciAggregate, FibonacciProfile};
use crate::analysis::export::ModelDocument;
use crate::analysis::geometric::CheckOutcome;
use crate::analysis::patterns::PatternReport;
use crate::analysis::quantization::{DivisorCheck, FactorRow, FitSummary, GoldenFit};
use crate::analysis::ratios::{LogSpacing, PhiPowerMatch};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Lepton,
    Quark,
    GaugeBoson,
    Scalar,
}

impl ParticleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Lepton => "lepton",
            ParticleKind::Quark => "quark",
            ParticleKind::GaugeBoson => "gauge_boson",
            ParticleKind::Scalar => "scalar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "lepton" => Some(ParticleKind::Lepton),
            "quark" => Some(ParticleKind::Quark),
            "gauge_boson" => Some(ParticleKind::GaugeBoson),
            "scalar" => Some(ParticleKind::Scalar),
            _ => None,
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub name: String,
    pub mass_gev: f64,
    pub charge: f64,
    pub spin: f64,
    pub kind: ParticleKind,
    /// 1..=3 for fermions, 0 for bosons.
    #[serde(default)]
    pub generation: u8,
}

impl Particle {
    pub fn new(
        name: &str,
        mass_gev: f64,
        charge: f64,
        spin: f64,
        kind: ParticleKind,
        generation: u8,
    ) -> Self {
        Self {
            name: name.to_string(),
            mass_gev,
            charge,
            spin,
            kind,
            generation,
        }
    }

    pub fn is_massive(&self) -> bool {
        self.mass_gev > 0.0
    }

    pub fn is_neutrino(&self) -> bool {
        self.kind == ParticleKind::Lepton && self.charge == 0.0
    }
}

/// Everything the transform stage produces; the load stage only renders it.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub reference: String,
    pub reference_mass_gev: f64,
    pub fits: Vec<GoldenFit>,
    /// Integer-or-half fits, for comparison with the configured lattice.
    pub coarse_fits: Vec<GoldenFit>,
    pub fit_summary: FitSummary,
    pub factor_table: Vec<FactorRow>,
    pub divisor_checks: Vec<DivisorCheck>,
    pub verifications: Vec<Verification>,
    pub verification_summary: VerificationSummary,
    pub corrections: Vec<Correction>,
    pub patterns: PatternReport,
    pub predictions: Vec<Prediction>,
    pub fibonacci: Vec<FibonacciProfile>,
    pub fibonacci_summary: FibonacciAggregate,
    pub phi_power_matches: Vec<PhiPowerMatch>,
    pub log_spacing: Option<LogSpacing>,
    pub geometric_checks: Vec<CheckOutcome>,
    pub model: ModelDocument,
}

/// Closest in-bounds coefficients reproducing the observed q of a mismatched entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub name: String,
    pub claimed: Coefficients,
    pub observed_q: i64,
    pub suggested: Option<Coefficients>,
}
