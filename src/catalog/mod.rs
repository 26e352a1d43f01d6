//! Particle catalogs: the built-in Standard Model table, file formats and sources.

pub mod store;

use crate::domain::model::{Particle, ParticleKind};
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::{self, Validate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CATALOG_EXTENSIONS: [&str; 2] = ["csv", "json"];

/// Standard Model particles, PDG 2024 masses in GeV (quark masses are current masses).
pub fn standard_model() -> Vec<Particle> {
    use ParticleKind::*;
    vec![
        Particle::new("electron", 0.0005109989461, -1.0, 0.5, Lepton, 1),
        Particle::new("electron_neutrino", 0.0000000008, 0.0, 0.5, Lepton, 1),
        Particle::new("muon", 0.1056583745, -1.0, 0.5, Lepton, 2),
        Particle::new("muon_neutrino", 0.00000017, 0.0, 0.5, Lepton, 2),
        Particle::new("tau", 1.77686, -1.0, 0.5, Lepton, 3),
        Particle::new("tau_neutrino", 0.0155, 0.0, 0.5, Lepton, 3),
        Particle::new("up_quark", 0.00216, 2.0 / 3.0, 0.5, Quark, 1),
        Particle::new("down_quark", 0.00467, -1.0 / 3.0, 0.5, Quark, 1),
        Particle::new("charm_quark", 1.27, 2.0 / 3.0, 0.5, Quark, 2),
        Particle::new("strange_quark", 0.093, -1.0 / 3.0, 0.5, Quark, 2),
        Particle::new("top_quark", 172.76, 2.0 / 3.0, 0.5, Quark, 3),
        Particle::new("bottom_quark", 4.18, -1.0 / 3.0, 0.5, Quark, 3),
        Particle::new("photon", 0.0, 0.0, 1.0, GaugeBoson, 0),
        Particle::new("W_boson", 80.377, 1.0, 1.0, GaugeBoson, 0),
        Particle::new("Z_boson", 91.1876, 0.0, 1.0, GaugeBoson, 0),
        Particle::new("gluon", 0.0, 0.0, 1.0, GaugeBoson, 0),
        Particle::new("higgs_boson", 125.25, 0.0, 0.0, Scalar, 0),
    ]
}

/// The reference must be present and massive.
pub fn find_reference<'a>(particles: &'a [Particle], name: &str) -> Result<&'a Particle> {
    particles
        .iter()
        .find(|p| p.name == name && p.is_massive())
        .ok_or_else(|| AnalysisError::MissingReference {
            name: name.to_string(),
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    List(Vec<Particle>),
    Wrapped { particles: Vec<Particle> },
}

/// A JSON array of particles, or an object with a `particles` array.
pub fn parse_catalog_json(bytes: &[u8]) -> Result<Vec<Particle>> {
    let payload: CatalogPayload = serde_json::from_slice(bytes)?;
    let particles = match payload {
        CatalogPayload::List(particles) => particles,
        CatalogPayload::Wrapped { particles } => particles,
    };
    check_particles(&particles)?;
    Ok(particles)
}

/// Header: `name,mass_gev,charge,spin,kind,generation`.
pub fn parse_catalog_csv(bytes: &[u8]) -> Result<Vec<Particle>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let particles = reader
        .deserialize::<Particle>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    check_particles(&particles)?;
    Ok(particles)
}

fn check_particles(particles: &[Particle]) -> Result<()> {
    for p in particles {
        validation::validate_non_empty_string("particle.name", &p.name)?;
        if !p.mass_gev.is_finite() || p.mass_gev < 0.0 {
            return Err(AnalysisError::InvalidMass {
                name: p.name.clone(),
                mass_gev: p.mass_gev,
            });
        }
    }
    Ok(())
}

pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> Result<Vec<Particle>> {
    let path = path.as_ref();
    let display = path.to_string_lossy();
    validation::validate_file_extension("catalog", &display, &CATALOG_EXTENSIONS)?;

    let bytes = std::fs::read(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => parse_catalog_csv(&bytes),
        _ => parse_catalog_json(&bytes),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
    Database(PathBuf),
    Remote(String),
}

impl FromStr for CatalogSource {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AnalysisError::MissingConfigError {
                field: "catalog".to_string(),
            });
        }
        if s.eq_ignore_ascii_case("builtin") {
            Ok(CatalogSource::Builtin)
        } else if let Some(path) = s.strip_prefix("sqlite:") {
            Ok(CatalogSource::Database(PathBuf::from(path)))
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(CatalogSource::Remote(s.to_string()))
        } else {
            Ok(CatalogSource::File(PathBuf::from(s)))
        }
    }
}

impl Validate for CatalogSource {
    fn validate(&self) -> Result<()> {
        match self {
            CatalogSource::Builtin => Ok(()),
            CatalogSource::File(path) => {
                validation::validate_file_extension("catalog", &path.to_string_lossy(), &CATALOG_EXTENSIONS)
            }
            CatalogSource::Database(path) => validation::validate_path("catalog", &path.to_string_lossy()),
            CatalogSource::Remote(url) => validation::validate_url("catalog", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_standard_model_contents() {
        let sm = standard_model();
        assert_eq!(sm.len(), 17);
        assert_eq!(sm.iter().filter(|p| p.is_massive()).count(), 15);
        assert_eq!(sm.iter().filter(|p| p.is_neutrino()).count(), 3);
    }

    #[test]
    fn test_find_reference() {
        let sm = standard_model();
        assert_eq!(find_reference(&sm, "electron").unwrap().name, "electron");
        assert!(matches!(
            find_reference(&sm, "photon"),
            Err(AnalysisError::MissingReference { .. })
        ));
        assert!(find_reference(&sm, "graviton").is_err());
    }

    #[test]
    fn test_parse_catalog_json_list_and_wrapped() {
        let list = br#"[{"name":"electron","mass_gev":0.000511,"charge":-1,"spin":0.5,"kind":"lepton","generation":1}]"#;
        assert_eq!(parse_catalog_json(list).unwrap().len(), 1);

        let wrapped = br#"{"particles":[{"name":"higgs_boson","mass_gev":125.25,"charge":0,"spin":0,"kind":"scalar"}]}"#;
        let parsed = parse_catalog_json(wrapped).unwrap();
        assert_eq!(parsed[0].kind, ParticleKind::Scalar);
        assert_eq!(parsed[0].generation, 0);
    }

    #[test]
    fn test_parse_catalog_rejects_negative_mass() {
        let bad = br#"[{"name":"ghost","mass_gev":-1.0,"charge":0,"spin":0,"kind":"scalar"}]"#;
        assert!(matches!(
            parse_catalog_json(bad),
            Err(AnalysisError::InvalidMass { .. })
        ));
    }

    #[test]
    fn test_parse_catalog_csv() {
        let csv = "name,mass_gev,charge,spin,kind,generation\n\
                   electron,0.000511,-1,0.5,lepton,1\n\
                   top_quark, 172.76, 0.6667, 0.5, quark, 3\n";
        let particles = parse_catalog_csv(csv.as_bytes()).unwrap();
        assert_eq!(particles.len(), 2);
        assert_eq!(particles[1].name, "top_quark");
        assert_eq!(particles[1].kind, ParticleKind::Quark);

        let bad_kind = "name,mass_gev,charge,spin,kind,generation\nx,1,0,0,meson,0\n";
        assert!(parse_catalog_csv(bad_kind.as_bytes()).is_err());
    }

    #[test]
    fn test_load_catalog_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_vec(&standard_model()).unwrap();
        file.write_all(&json).unwrap();

        let particles = load_catalog_file(file.path()).unwrap();
        let names: Vec<&str> = particles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(particles.len(), 17);
        assert_eq!(names[0], "electron");
        assert_eq!(names[16], "higgs_boson");

        let txt = NamedTempFile::new().unwrap();
        assert!(load_catalog_file(txt.path()).is_err());
    }

    #[test]
    fn test_catalog_source_from_str() {
        assert_eq!("builtin".parse::<CatalogSource>().unwrap(), CatalogSource::Builtin);
        assert_eq!(
            "sqlite:data/db/particles.db".parse::<CatalogSource>().unwrap(),
            CatalogSource::Database(PathBuf::from("data/db/particles.db"))
        );
        assert_eq!(
            "https://example.com/pdg.json".parse::<CatalogSource>().unwrap(),
            CatalogSource::Remote("https://example.com/pdg.json".to_string())
        );
        assert_eq!(
            "pdg.csv".parse::<CatalogSource>().unwrap(),
            CatalogSource::File(PathBuf::from("pdg.csv"))
        );
        assert!("  ".parse::<CatalogSource>().is_err());
    }

    #[test]
    fn test_catalog_source_validation() {
        assert!(CatalogSource::File(PathBuf::from("pdg.xlsx")).validate().is_err());
        assert!(CatalogSource::File(PathBuf::from("pdg.csv")).validate().is_ok());
        assert!(CatalogSource::Remote("https://".to_string()).validate().is_err());
        assert!(CatalogSource::Database(PathBuf::from("")).validate().is_err());
    }
}
