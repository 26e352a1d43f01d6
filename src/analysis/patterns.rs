use crate::analysis::casimir::{CoefficientTable, Coefficients};
use crate::domain::model::{Particle, ParticleKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    A,
    B,
    C,
}

impl Component {
    fn of(&self, coeffs: &Coefficients) -> i64 {
        match self {
            Component::A => coeffs.a,
            Component::B => coeffs.b,
            Component::C => coeffs.c,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientStats {
    pub min: i64,
    pub max: i64,
    pub mean: f64,
}

pub fn component_stats(table: &CoefficientTable, component: Component) -> Option<CoefficientStats> {
    let values: Vec<i64> = table.iter().map(|(_, c)| component.of(&c)).collect();
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;
    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
    Some(CoefficientStats { min, max, mean })
}

/// Component value -> particle names carrying it (names sorted).
pub fn group_by_value(table: &CoefficientTable, component: Component) -> BTreeMap<i64, Vec<String>> {
    let mut groups: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for (name, coeffs) in table.iter() {
        groups
            .entry(component.of(&coeffs))
            .or_default()
            .push(name.to_string());
    }
    for names in groups.values_mut() {
        names.sort();
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Neutrino,
    ChargedLepton,
    Quark,
    Boson,
}

impl Family {
    pub fn of(particle: &Particle) -> Self {
        match particle.kind {
            ParticleKind::Lepton if particle.is_neutrino() => Family::Neutrino,
            ParticleKind::Lepton => Family::ChargedLepton,
            ParticleKind::Quark => Family::Quark,
            ParticleKind::GaugeBoson | ParticleKind::Scalar => Family::Boson,
        }
    }
}

/// Table entries whose particle is absent from the catalog are skipped.
pub fn group_by_family(
    table: &CoefficientTable,
    catalog: &[Particle],
) -> BTreeMap<Family, Vec<(String, Coefficients)>> {
    let mut groups: BTreeMap<Family, Vec<(String, Coefficients)>> = BTreeMap::new();
    for (name, coeffs) in table.iter() {
        if let Some(particle) = catalog.iter().find(|p| p.name == name) {
            groups
                .entry(Family::of(particle))
                .or_default()
                .push((name.to_string(), coeffs));
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTotals {
    pub generation: u8,
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub members: usize,
}

pub fn generation_totals(table: &CoefficientTable, catalog: &[Particle]) -> Vec<GenerationTotals> {
    (1..=3u8)
        .map(|generation| {
            let mut totals = GenerationTotals {
                generation,
                a: 0,
                b: 0,
                c: 0,
                members: 0,
            };
            for (name, coeffs) in table.iter() {
                let in_generation = catalog
                    .iter()
                    .any(|p| p.name == name && p.generation == generation);
                if in_generation {
                    totals.a += coeffs.a;
                    totals.b += coeffs.b;
                    totals.c += coeffs.c;
                    totals.members += 1;
                }
            }
            totals
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryTraits {
    pub name: String,
    pub sum: i64,
    pub all_even: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternReport {
    pub a: Option<CoefficientStats>,
    pub b: Option<CoefficientStats>,
    pub c: Option<CoefficientStats>,
    pub by_c: BTreeMap<i64, Vec<String>>,
    pub by_b: BTreeMap<i64, Vec<String>>,
    pub by_family: BTreeMap<Family, Vec<(String, Coefficients)>>,
    pub generations: Vec<GenerationTotals>,
    pub entries: Vec<EntryTraits>,
}

pub fn analyze(table: &CoefficientTable, catalog: &[Particle]) -> PatternReport {
    PatternReport {
        a: component_stats(table, Component::A),
        b: component_stats(table, Component::B),
        c: component_stats(table, Component::C),
        by_c: group_by_value(table, Component::C),
        by_b: group_by_value(table, Component::B),
        by_family: group_by_family(table, catalog),
        generations: generation_totals(table, catalog),
        entries: table
            .iter()
            .map(|(name, c)| EntryTraits {
                name: name.to_string(),
                sum: c.sum(),
                all_even: c.all_even(),
            })
            .collect(),
    }
}
