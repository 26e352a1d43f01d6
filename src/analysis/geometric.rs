//! Closed-form φ predictions compared with measured quantities.

use crate::analysis::quantization::PHI;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricCheck {
    pub label: String,
    pub formula: String,
    pub predicted: f64,
    pub experimental: f64,
    /// Angles in degrees compare modulo 180°.
    pub is_angle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Good,
    Poor,
    Failed,
}

impl Grade {
    pub fn from_error_pct(error_pct: f64) -> Self {
        if error_pct < 10.0 {
            Grade::Good
        } else if error_pct < 30.0 {
            Grade::Poor
        } else {
            Grade::Failed
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Grade::Good => "✓",
            Grade::Poor => "✗",
            Grade::Failed => "✗✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: GeometricCheck,
    pub error_pct: f64,
    pub grade: Grade,
}

fn check(label: &str, formula: &str, predicted: f64, experimental: f64, is_angle: bool) -> GeometricCheck {
    GeometricCheck {
        label: label.to_string(),
        formula: formula.to_string(),
        predicted,
        experimental,
        is_angle,
    }
}

/// PDG 2024 central values.
pub fn standard_checks() -> Vec<GeometricCheck> {
    vec![
        check("m_mu/m_e", "phi^11", PHI.powi(11), 206.76828, false),
        check("m_tau/m_mu", "phi^5.75", PHI.powf(5.75), 16.8167, false),
        check(
            "theta_12",
            "atan(1/phi) deg",
            (1.0 / PHI).atan().to_degrees(),
            33.45,
            true,
        ),
        check("delta_cp", "pi/phi^2 rad in deg", (PI / (PHI * PHI)).to_degrees(), 114.0, true),
        check("lambda_higgs", "phi^-5", PHI.powi(-5), 0.13, false),
        check("m_W/m_Z", "phi^-1", 1.0 / PHI, 80.377 / 91.1876, false),
    ]
}

pub fn error_pct(check: &GeometricCheck) -> f64 {
    let raw = (check.predicted - check.experimental).abs();
    let diff = if check.is_angle {
        raw.min(180.0 - raw)
    } else {
        raw
    };
    diff / check.experimental * 100.0
}

pub fn evaluate(checks: &[GeometricCheck]) -> Vec<CheckOutcome> {
    checks
        .iter()
        .map(|c| {
            let error_pct = error_pct(c);
            CheckOutcome {
                check: c.clone(),
                error_pct,
                grade: Grade::from_error_pct(error_pct),
            }
        })
        .collect()
}
