use golden_mass::analysis::quantization::Step;
use golden_mass::{AnalysisEngine, AnalysisPipeline, CliConfig, LocalStorage, TomlConfig};
use httpmock::prelude::*;
use std::io::Read;
use tempfile::TempDir;

fn cli_config(catalog: &str, output_path: &str) -> CliConfig {
    CliConfig {
        catalog: catalog.to_string(),
        output_path: output_path.to_string(),
        reference: "electron".to_string(),
        step: Step::Quarter,
        coefficients: None,
        formats: vec!["csv".to_string(), "tsv".to_string(), "json".to_string()],
        compress: false,
        prediction_limit: 20,
        error_threshold: 5.0,
        verbose: false,
        monitor: false,
        json_logs: false,
    }
}

#[tokio::test]
async fn test_end_to_end_builtin_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let storage = LocalStorage::new(&output_path);
    let pipeline = AnalysisPipeline::new(storage, cli_config("builtin", &output_path));
    let engine = AnalysisEngine::new_with_monitoring(pipeline, false);

    let location = engine.run().await.unwrap();
    assert_eq!(location, output_path.trim_end_matches('/'));

    for name in [
        "fits.csv",
        "fits.tsv",
        "verification.csv",
        "predictions.csv",
        "model.json",
        "report.json",
    ] {
        assert!(temp_dir.path().join(name).exists(), "missing {}", name);
    }

    let model: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("model.json")).unwrap()).unwrap();
    assert_eq!(model["particles"].as_array().unwrap().len(), 15);

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["verification_summary"]["exact"], 9);
    assert_eq!(report["fit_summary"]["total"], 14);

    let predictions = std::fs::read_to_string(temp_dir.path().join("predictions.csv")).unwrap();
    assert_eq!(predictions.lines().next().unwrap(), "a,b,c,q,n,mass_gev,region");
    assert_eq!(predictions.lines().count(), 21);
}

#[tokio::test]
async fn test_end_to_end_remote_catalog_compressed() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let catalog = serde_json::json!({
        "particles": [
            {"name": "electron", "mass_gev": 0.0005109989461, "charge": -1, "spin": 0.5, "kind": "lepton", "generation": 1},
            {"name": "muon", "mass_gev": 0.1056583745, "charge": -1, "spin": 0.5, "kind": "lepton", "generation": 2},
            {"name": "tau", "mass_gev": 1.77686, "charge": -1, "spin": 0.5, "kind": "lepton", "generation": 3}
        ]
    });
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/leptons.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(catalog);
    });

    let mut config = cli_config(&server.url("/leptons.json"), &output_path);
    config.compress = true;

    let storage = LocalStorage::new(&output_path);
    let engine = AnalysisEngine::new(AnalysisPipeline::new(storage, config));
    let location = engine.run().await.unwrap();

    api_mock.assert();
    assert!(location.ends_with("analysis.zip"));

    let zip_data = std::fs::read(temp_dir.path().join("analysis.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 6);

    let mut verification = String::new();
    archive
        .by_name("verification.csv")
        .unwrap()
        .read_to_string(&mut verification)
        .unwrap();
    // only the three leptons are measured
    assert_eq!(
        verification.lines().filter(|l| l.contains(",unmeasured")).count(),
        12
    );
    assert!(verification.lines().any(|l| l.starts_with("muon,") && l.contains(",exact")));
}

#[tokio::test]
async fn test_remote_failure_uses_builtin_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(503);
    });

    let mut config = cli_config(&server.url("/"), &output_path);
    config.formats = vec!["json".to_string()];

    let engine = AnalysisEngine::new(AnalysisPipeline::new(LocalStorage::new(&output_path), config));
    engine.run().await.unwrap();

    api_mock.assert();
    let model: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("model.json")).unwrap()).unwrap();
    assert_eq!(model["particles"].as_array().unwrap().len(), 15);
    assert!(!temp_dir.path().join("fits.csv").exists());
}

#[tokio::test]
async fn test_custom_coefficients_and_reference_from_toml() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out");
    let coefficients_path = temp_dir.path().join("table.toml");
    std::fs::write(
        &coefficients_path,
        "[coefficients]\nmuon = [-30, 0, 10]\ntau = [-29, 3, 9]\n",
    )
    .unwrap();

    let toml_content = format!(
        r#"
[analysis]
name = "muon-reference"

[source]
catalog = "builtin"
coefficients = "{}"

[fit]
reference = "muon"

[load]
output_path = "{}"
output_formats = ["json"]
"#,
        coefficients_path.display(),
        output_path.display()
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let engine = AnalysisEngine::new(AnalysisPipeline::new(LocalStorage::new(&output_path), config));
    engine.run().await.unwrap();

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_path.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["reference"], "muon");
    assert_eq!(report["verification_summary"]["total"], 2);
    // muon is its own reference, so q = 0 is exact
    let muon = report["verifications"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["name"] == "muon")
        .unwrap();
    assert_eq!(muon["verdict"]["status"], "exact");
}
