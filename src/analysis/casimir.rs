//! Decomposition of quarter-lattice indices over the A5 Casimir basis.
//!
//! The claim under test is that every `q = round(4n)` can be written as
//! `q = 8a + 15b + 24c`, where 8, 15 and 24 are the normalised quadratic
//! Casimir eigenvalues of the 3-, 4- and 5-dimensional irreps of A5.
//! gcd(8, 15, 24) = 1, so every integer has solutions. [`verify`] compares
//! claimed coefficients with the q derived from measured masses and reports
//! each outcome.

use crate::analysis::quantization::{GoldenFit, PHI};
use crate::utils::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

pub const CASIMIR_BASIS: [i64; 3] = [8, 15, 24];

/// Irrep dimensions the basis values belong to, in the same order.
pub const BASIS_DIMENSIONS: [u32; 3] = [3, 4, 5];

/// Largest |a|, |b| or |c| accepted from a coefficient table or search bound.
pub const MAX_COEFFICIENT_MAGNITUDE: i64 = 1_000_000;

/// Largest `(a, b, c)` box the prediction search will walk.
pub const MAX_SEARCH_COMBINATIONS: u128 = 1_000_000;

pub fn casimir_for_dimension(dim: u32) -> i64 {
    match dim {
        1 => 0,
        3 => 8,
        4 => 15,
        5 => 24,
        other => (other as i64) * (other as i64) - 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coefficients {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

impl Coefficients {
    pub const fn new(a: i64, b: i64, c: i64) -> Self {
        Self { a, b, c }
    }

    /// Panics on overflow; tables and bounds are limited to
    /// [`MAX_COEFFICIENT_MAGNITUDE`], which keeps this in range.
    pub fn q(&self) -> i64 {
        CASIMIR_BASIS[0] * self.a + CASIMIR_BASIS[1] * self.b + CASIMIR_BASIS[2] * self.c
    }

    pub fn checked_q(&self) -> Option<i64> {
        CASIMIR_BASIS[0]
            .checked_mul(self.a)?
            .checked_add(CASIMIR_BASIS[1].checked_mul(self.b)?)?
            .checked_add(CASIMIR_BASIS[2].checked_mul(self.c)?)
    }

    pub fn within_magnitude(&self, limit: i64) -> bool {
        [self.a, self.b, self.c].iter().all(|v| v.unsigned_abs() <= limit.unsigned_abs())
    }

    pub fn sum(&self) -> i64 {
        self.a + self.b + self.c
    }

    pub fn all_even(&self) -> bool {
        self.a % 2 == 0 && self.b % 2 == 0 && self.c % 2 == 0
    }

    fn distance_sq(&self, other: &Coefficients) -> i64 {
        [
            self.a.saturating_sub(other.a),
            self.b.saturating_sub(other.b),
            self.c.saturating_sub(other.c),
        ]
        .iter()
        .fold(0i64, |acc, d| acc.saturating_add(d.saturating_mul(*d)))
    }
}

impl fmt::Display for Coefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.a, self.b, self.c)
    }
}

const BUILTIN_TABLE: [(&str, Coefficients); 15] = [
    ("electron_neutrino", Coefficients::new(-28, -16, 10)),
    ("muon_neutrino", Coefficients::new(-30, -12, 10)),
    ("tau_neutrino", Coefficients::new(-30, -6, 7)),
    ("electron", Coefficients::new(-30, 0, 10)),
    ("up_quark", Coefficients::new(-30, 4, 8)),
    ("down_quark", Coefficients::new(-30, 6, 7)),
    ("strange_quark", Coefficients::new(-29, 4, 9)),
    ("muon", Coefficients::new(-29, 4, 9)),
    ("charm_quark", Coefficients::new(-29, 7, 8)),
    ("tau", Coefficients::new(-29, 4, 10)),
    ("bottom_quark", Coefficients::new(-30, 5, 10)),
    ("top_quark", Coefficients::new(-28, 6, 10)),
    ("W_boson", Coefficients::new(-28, 12, 6)),
    ("Z_boson", Coefficients::new(-28, 12, 6)),
    ("higgs_boson", Coefficients::new(-28, 9, 8)),
];

/// Claimed `(a, b, c)` per particle name, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoefficientTable {
    entries: Vec<(String, Coefficients)>,
}

#[derive(Deserialize)]
struct CoefficientFile {
    coefficients: BTreeMap<String, [i64; 3]>,
}

impl CoefficientTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TABLE
                .iter()
                .map(|(name, coeffs)| (name.to_string(), *coeffs))
                .collect(),
        }
    }

    pub fn from_entries(entries: Vec<(String, Coefficients)>) -> Self {
        Self { entries }
    }

    /// Parses `[coefficients]` with `name = [a, b, c]` rows.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CoefficientFile =
            toml::from_str(content).map_err(|e| AnalysisError::ConfigValidationError {
                field: "coefficients".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if file.coefficients.is_empty() {
            return Err(AnalysisError::ValidationError {
                message: "Coefficient table is empty".to_string(),
            });
        }

        let entries: Vec<(String, Coefficients)> = file
            .coefficients
            .into_iter()
            .map(|(name, [a, b, c])| (name, Coefficients::new(a, b, c)))
            .collect();

        if let Some((name, coeffs)) = entries
            .iter()
            .find(|(_, c)| !c.within_magnitude(MAX_COEFFICIENT_MAGNITUDE))
        {
            return Err(AnalysisError::ValidationError {
                message: format!(
                    "Coefficients {} for {} exceed the limit of ±{}",
                    coeffs, name, MAX_COEFFICIENT_MAGNITUDE
                ),
            });
        }

        Ok(Self { entries })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<Coefficients> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coefficients)> + '_ {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn coefficient_set(&self) -> HashSet<Coefficients> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Exact,
    Mismatch { delta: i64 },
    Unmeasured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub name: String,
    pub coefficients: Coefficients,
    pub claimed_q: i64,
    pub observed_q: Option<i64>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub exact: usize,
    pub mismatched: usize,
    pub unmeasured: usize,
    pub total: usize,
}

impl VerificationSummary {
    pub fn from_results(results: &[Verification]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for v in results {
            match v.verdict {
                Verdict::Exact => summary.exact += 1,
                Verdict::Mismatch { .. } => summary.mismatched += 1,
                Verdict::Unmeasured => summary.unmeasured += 1,
            }
        }
        summary
    }

    pub fn all_exact(&self) -> bool {
        self.total > 0 && self.mismatched == 0 && self.unmeasured == 0
    }
}

/// Compares each claimed entry with the q observed from the fitted mass.
pub fn verify(table: &CoefficientTable, fits: &[GoldenFit]) -> Vec<Verification> {
    table
        .iter()
        .map(|(name, coefficients)| {
            let claimed_q = coefficients.q();
            let observed_q = fits.iter().find(|f| f.name == name).map(|f| f.q);
            let verdict = match observed_q {
                None => Verdict::Unmeasured,
                Some(q) if q == claimed_q => Verdict::Exact,
                Some(q) => Verdict::Mismatch {
                    delta: claimed_q - q,
                },
            };
            Verification {
                name: name.to_string(),
                coefficients,
                claimed_q,
                observed_q,
                verdict,
            }
        })
        .collect()
}

/// Inclusive search ranges for `a`, `b` and `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientBounds {
    pub a: (i64, i64),
    pub b: (i64, i64),
    pub c: (i64, i64),
}

impl Default for CoefficientBounds {
    fn default() -> Self {
        Self {
            a: (-32, -28),
            b: (-20, 14),
            c: (5, 12),
        }
    }
}

impl CoefficientBounds {
    /// Number of `(a, b, c)` points in the box; zero when an axis is inverted.
    pub fn combinations(&self) -> u128 {
        [self.a, self.b, self.c]
            .iter()
            .map(|&(lo, hi)| {
                if hi < lo {
                    0
                } else {
                    (i128::from(hi) - i128::from(lo) + 1) as u128
                }
            })
            .fold(1u128, |acc, span| acc.saturating_mul(span))
    }

    pub fn contains(&self, coeffs: &Coefficients) -> bool {
        (self.a.0..=self.a.1).contains(&coeffs.a)
            && (self.b.0..=self.b.1).contains(&coeffs.b)
            && (self.c.0..=self.c.1).contains(&coeffs.c)
    }
}

/// All solutions of `8a + 15b + 24c = q` inside the bounds, lexicographically ordered.
pub fn decompose(q: i64, bounds: &CoefficientBounds) -> Vec<Coefficients> {
    let mut out = Vec::new();
    for a in bounds.a.0..=bounds.a.1 {
        for b in bounds.b.0..=bounds.b.1 {
            let rest = CASIMIR_BASIS[0]
                .checked_mul(a)
                .and_then(|x| CASIMIR_BASIS[1].checked_mul(b).and_then(|y| x.checked_add(y)))
                .and_then(|ab| q.checked_sub(ab));
            let Some(rest) = rest else {
                continue;
            };
            if rest.rem_euclid(CASIMIR_BASIS[2]) != 0 {
                continue;
            }
            let c = rest / CASIMIR_BASIS[2];
            if (bounds.c.0..=bounds.c.1).contains(&c) {
                out.push(Coefficients::new(a, b, c));
            }
        }
    }
    out
}

pub fn nearest_decomposition(
    q: i64,
    bounds: &CoefficientBounds,
    centre: &Coefficients,
) -> Option<Coefficients> {
    // min_by_key keeps the first minimum, so ties resolve lexicographically
    decompose(q, bounds)
        .into_iter()
        .min_by_key(|c| c.distance_sq(centre))
}

pub fn table_centroid(table: &CoefficientTable) -> Option<Coefficients> {
    if table.is_empty() {
        return None;
    }
    let n = table.len() as f64;
    let (sa, sb, sc) = table
        .iter()
        .fold((0i64, 0i64, 0i64), |(sa, sb, sc), (_, c)| (sa + c.a, sb + c.b, sc + c.c));
    Some(Coefficients::new(
        (sa as f64 / n).round() as i64,
        (sb as f64 / n).round() as i64,
        (sc as f64 / n).round() as i64,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassRegion {
    VeryLight,
    Light,
    SubReference,
    ReferenceRegion,
    CharmTau,
    TopWZ,
    VeryHeavy,
}

impl MassRegion {
    pub fn classify(q: i64) -> Self {
        match q {
            q if q < -200 => MassRegion::VeryLight,
            q if q < -100 => MassRegion::Light,
            q if q < 0 => MassRegion::SubReference,
            q if q < 50 => MassRegion::ReferenceRegion,
            q if q < 100 => MassRegion::CharmTau,
            q if q < 150 => MassRegion::TopWZ,
            _ => MassRegion::VeryHeavy,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MassRegion::VeryLight => "very light (neutrino-like)",
            MassRegion::Light => "light (neutrino/electron-like)",
            MassRegion::SubReference => "below the reference mass",
            MassRegion::ReferenceRegion => "electron/up quark region",
            MassRegion::CharmTau => "charm/tau region",
            MassRegion::TopWZ => "top/W/Z region",
            MassRegion::VeryHeavy => "very heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSettings {
    pub bounds: CoefficientBounds,
    /// Open interval on q.
    pub q_window: (i64, i64),
    /// Open interval on the predicted mass in GeV.
    pub mass_window: (f64, f64),
    pub limit: usize,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            bounds: CoefficientBounds::default(),
            q_window: (-250, 150),
            mass_window: (1e-10, 1e10),
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub coefficients: Coefficients,
    pub q: i64,
    pub n: f64,
    pub mass_gev: f64,
    pub region: MassRegion,
}

/// Coefficient combinations not in the table, lightest first.
pub fn predict_new(
    table: &CoefficientTable,
    settings: &PredictionSettings,
    reference_mass_gev: f64,
) -> Vec<Prediction> {
    let known = table.coefficient_set();
    let bounds = &settings.bounds;
    let (q_lo, q_hi) = settings.q_window;
    let (m_lo, m_hi) = settings.mass_window;

    let mut predictions = Vec::new();
    for a in bounds.a.0..=bounds.a.1 {
        for b in bounds.b.0..=bounds.b.1 {
            for c in bounds.c.0..=bounds.c.1 {
                let coefficients = Coefficients::new(a, b, c);
                if known.contains(&coefficients) {
                    continue;
                }
                let Some(q) = coefficients.checked_q() else {
                    continue;
                };
                if q <= q_lo || q >= q_hi {
                    continue;
                }
                let n = q as f64 / 4.0;
                let mass_gev = reference_mass_gev * PHI.powf(n);
                if mass_gev <= m_lo || mass_gev >= m_hi {
                    continue;
                }
                predictions.push(Prediction {
                    coefficients,
                    q,
                    n,
                    mass_gev,
                    region: MassRegion::classify(q),
                });
            }
        }
    }

    predictions.sort_by(|x, y| x.q.cmp(&y.q).then(x.coefficients.cmp(&y.coefficients)));
    predictions.truncate(settings.limit);
    predictions
}
