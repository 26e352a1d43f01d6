use crate::analysis::casimir::{CoefficientTable, Coefficients, BASIS_DIMENSIONS, CASIMIR_BASIS};
use crate::analysis::quantization::{GoldenFit, PHI};
use crate::domain::model::{Particle, ParticleKind};
use serde::{Deserialize, Serialize};

pub const FORMULA: &str = "q = 8a + 15b + 24c, where q = 4n and n = log_phi(m / m_ref)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisElement {
    pub value: i64,
    pub dimension: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantumNumbers {
    pub charge: f64,
    pub spin: f64,
    pub kind: ParticleKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParticle {
    pub name: String,
    pub mass_gev: f64,
    pub q: i64,
    pub n: f64,
    pub coefficients: Coefficients,
    pub quantum_numbers: QuantumNumbers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub basis: Vec<BasisElement>,
    pub formula: String,
    pub phi: f64,
    pub reference: String,
    pub reference_mass_gev: f64,
    pub particles: Vec<ModelParticle>,
}

/// Only particles present in the table, the catalog and the fits are exported.
/// `q` and `n` are the measured values, not the claimed ones.
pub fn build_model(
    table: &CoefficientTable,
    catalog: &[Particle],
    fits: &[GoldenFit],
    reference: &Particle,
) -> ModelDocument {
    let basis = CASIMIR_BASIS
        .iter()
        .zip(BASIS_DIMENSIONS)
        .map(|(&value, dimension)| BasisElement {
            value,
            dimension,
            description: format!(
                "Quadratic Casimir eigenvalue for the A5 {}D representation",
                dimension
            ),
        })
        .collect();

    let particles = table
        .iter()
        .filter_map(|(name, coefficients)| {
            let particle = catalog.iter().find(|p| p.name == name)?;
            let fit = fits.iter().find(|f| f.name == name)?;
            Some(ModelParticle {
                name: name.to_string(),
                mass_gev: particle.mass_gev,
                q: fit.q,
                n: fit.q as f64 / 4.0,
                coefficients,
                quantum_numbers: QuantumNumbers {
                    charge: particle.charge,
                    spin: particle.spin,
                    kind: particle.kind,
                },
            })
        })
        .collect();

    ModelDocument {
        basis,
        formula: FORMULA.to_string(),
        phi: PHI,
        reference: reference.name.clone(),
        reference_mass_gev: reference.mass_gev,
        particles,
    }
}
