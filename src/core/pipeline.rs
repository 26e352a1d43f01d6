use crate::analysis::casimir::{self, CoefficientBounds, CoefficientTable, Prediction, Verdict, Verification, VerificationSummary};
use crate::analysis::quantization::{self, DEFAULT_DIVISORS, DEFAULT_FACTORS};
use crate::analysis::{digital_root, export, geometric, patterns, ratios};
use crate::catalog::store::CatalogStore;
use crate::catalog::{self, CatalogSource};
use crate::core::{AnalysisReport, ConfigProvider, Particle, Pipeline, Storage};
use crate::domain::model::Correction;
use crate::utils::error::{AnalysisError, Result};
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use zip::write::{FileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "analysis.zip";
const FACTOR_TOLERANCE: f64 = 0.001;
const DIVISOR_TOLERANCE: f64 = 0.01;

pub struct AnalysisPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> AnalysisPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn coefficient_table(&self) -> Result<CoefficientTable> {
        match self.config.coefficients_path() {
            Some(path) => {
                tracing::debug!("Loading coefficient table from {}", path);
                CoefficientTable::from_file(path)
            }
            None => Ok(CoefficientTable::builtin()),
        }
    }

    /// Falls back to the built-in catalog when the server answers with an error or nothing.
    async fn fetch_remote(&self, url: &str) -> Result<Vec<Particle>> {
        tracing::debug!("Requesting catalog from: {}", url);
        let response = self.client.get(url).send().await?;
        tracing::debug!("Catalog response status: {}", response.status());

        if !response.status().is_success() {
            tracing::warn!(
                "⚠️ Catalog endpoint returned {}, using built-in Standard Model catalog",
                response.status()
            );
            return Ok(catalog::standard_model());
        }

        let body = response.bytes().await?;
        let particles = catalog::parse_catalog_json(&body)?;
        if particles.is_empty() {
            tracing::warn!("⚠️ Catalog endpoint returned no particles, using built-in catalog");
            return Ok(catalog::standard_model());
        }
        Ok(particles)
    }
}

fn suggest_corrections(
    table: &CoefficientTable,
    verifications: &[Verification],
    bounds: &CoefficientBounds,
) -> Vec<Correction> {
    let Some(centre) = casimir::table_centroid(table) else {
        return Vec::new();
    };
    verifications
        .iter()
        .filter_map(|v| match (v.verdict, v.observed_q) {
            (Verdict::Mismatch { .. }, Some(observed_q)) => Some(Correction {
                name: v.name.clone(),
                claimed: v.coefficients,
                observed_q,
                suggested: casimir::nearest_decomposition(observed_q, bounds, &centre),
            }),
            _ => None,
        })
        .collect()
}

async fn read_database(path: PathBuf) -> Result<Vec<Particle>> {
    tokio::task::spawn_blocking(move || CatalogStore::open(&path)?.list_by_mass())
        .await
        .map_err(|e| AnalysisError::ProcessingError {
            message: format!("Catalog database task failed: {}", e),
        })?
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AnalysisPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Particle>> {
        let source: CatalogSource = self.config.catalog_source().parse()?;

        let particles = match source {
            CatalogSource::Builtin => catalog::standard_model(),
            CatalogSource::File(path) => catalog::load_catalog_file(&path)?,
            CatalogSource::Database(path) => read_database(path).await?,
            CatalogSource::Remote(url) => self.fetch_remote(&url).await?,
        };

        tracing::debug!("Catalog holds {} particles", particles.len());
        Ok(particles)
    }

    async fn transform(&self, particles: Vec<Particle>) -> Result<AnalysisReport> {
        let table = self.coefficient_table()?;
        let reference = catalog::find_reference(&particles, self.config.reference_particle())?.clone();
        let step = self.config.step();

        let fits = quantization::fit_catalog(&particles, &reference, step)?;
        let fit_summary =
            quantization::summarize(&fits, &reference.name, self.config.error_threshold_pct());
        tracing::info!(
            "📐 {}/{} particles within {}% on the {} lattice",
            fit_summary.within_threshold,
            fit_summary.total,
            fit_summary.threshold_pct,
            step
        );

        let factor_table = fits
            .iter()
            .map(|f| {
                quantization::factor_integrality(&f.name, f.n_quantized, &DEFAULT_FACTORS, FACTOR_TOLERANCE)
            })
            .collect();
        let diffs = quantization::successive_differences(&fits);
        let divisor_checks = quantization::divisor_check(&diffs, &DEFAULT_DIVISORS, DIVISOR_TOLERANCE);

        let verifications = casimir::verify(&table, &fits);
        let verification_summary = VerificationSummary::from_results(&verifications);
        if !verification_summary.all_exact() {
            tracing::warn!(
                "⚠️ {} of {} coefficient entries do not reproduce the measured q",
                verification_summary.mismatched + verification_summary.unmeasured,
                verification_summary.total
            );
        }

        let settings = self.config.prediction_settings();
        let corrections = suggest_corrections(&table, &verifications, &settings.bounds);
        let predictions = casimir::predict_new(&table, &settings, reference.mass_gev);

        let coarse_fits = particles
            .iter()
            .filter(|p| p.is_massive())
            .map(|p| quantization::best_integer_or_half(p, &reference))
            .collect::<Result<Vec<_>>>()?;

        let fibonacci: Vec<_> = table
            .iter()
            .map(|(name, c)| {
                digital_root::fibonacci_profile(name, c.q(), &digital_root::DEFAULT_MULTIPLIERS)
            })
            .collect();
        let fibonacci_summary = digital_root::aggregate(&fibonacci);

        let model = export::build_model(&table, &particles, &fits, &reference);

        Ok(AnalysisReport {
            reference: reference.name.clone(),
            reference_mass_gev: reference.mass_gev,
            fit_summary,
            factor_table,
            divisor_checks,
            verification_summary,
            corrections,
            patterns: patterns::analyze(&table, &particles),
            predictions,
            fibonacci,
            fibonacci_summary,
            phi_power_matches: ratios::phi_power_matches(
                &particles,
                ratios::DEFAULT_MAX_POWER,
                ratios::DEFAULT_TOLERANCE,
            ),
            log_spacing: ratios::log_spacing(&particles),
            geometric_checks: geometric::evaluate(&geometric::standard_checks()),
            verifications,
            fits,
            coarse_fits,
            model,
        })
    }

    async fn load(&self, report: AnalysisReport) -> Result<String> {
        let outputs = render_outputs(&report, self.config.output_formats())?;
        let output_dir = self.config.output_path().trim_end_matches('/');

        if self.config.compress() {
            tracing::debug!("Creating ZIP file with {} files", outputs.len());

            // 建立 ZIP 檔案
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &outputs {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ARCHIVE_NAME, &zip_data).await?;
            return Ok(format!("{}/{}", output_dir, ARCHIVE_NAME));
        }

        for (name, data) in &outputs {
            self.storage.write_file(name, data).await?;
        }
        tracing::debug!("Wrote {} output files", outputs.len());
        Ok(output_dir.to_string())
    }
}

#[derive(Serialize)]
struct VerificationRow<'a> {
    name: &'a str,
    a: i64,
    b: i64,
    c: i64,
    claimed_q: i64,
    observed_q: Option<i64>,
    status: &'static str,
    delta: Option<i64>,
}

impl<'a> From<&'a Verification> for VerificationRow<'a> {
    fn from(v: &'a Verification) -> Self {
        let (status, delta) = match v.verdict {
            Verdict::Exact => ("exact", None),
            Verdict::Mismatch { delta } => ("mismatch", Some(delta)),
            Verdict::Unmeasured => ("unmeasured", None),
        };
        Self {
            name: &v.name,
            a: v.coefficients.a,
            b: v.coefficients.b,
            c: v.coefficients.c,
            claimed_q: v.claimed_q,
            observed_q: v.observed_q,
            status,
            delta,
        }
    }
}

#[derive(Serialize)]
struct PredictionRow {
    a: i64,
    b: i64,
    c: i64,
    q: i64,
    n: f64,
    mass_gev: f64,
    region: &'static str,
}

impl From<&Prediction> for PredictionRow {
    fn from(p: &Prediction) -> Self {
        Self {
            a: p.coefficients.a,
            b: p.coefficients.b,
            c: p.coefficients.c,
            q: p.q,
            n: p.n,
            mass_gev: p.mass_gev,
            region: p.region.label(),
        }
    }
}

const FIT_HEADER: [&str; 9] = [
    "name",
    "kind",
    "mass_gev",
    "n_exact",
    "n_quantized",
    "step",
    "q",
    "predicted_mass_gev",
    "error_pct",
];
const VERIFICATION_HEADER: [&str; 8] = [
    "name", "a", "b", "c", "claimed_q", "observed_q", "status", "delta",
];
const PREDICTION_HEADER: [&str; 7] = ["a", "b", "c", "q", "n", "mass_gev", "region"];

/// Serialized rows; `header` is written on its own when there are none.
fn render_rows<T: Serialize>(
    rows: impl IntoIterator<Item = T>,
    header: &[&str],
    delimiter: u8,
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    let mut written = 0usize;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(header)?;
    }
    writer
        .into_inner()
        .map_err(|e| AnalysisError::IoError(e.into_error()))
}

/// File name and contents for every artefact enabled by `formats`.
pub fn render_outputs(report: &AnalysisReport, formats: &[String]) -> Result<Vec<(String, Vec<u8>)>> {
    let wants = |format: &str| formats.iter().any(|f| f.eq_ignore_ascii_case(format));
    let mut outputs = Vec::new();

    if wants("csv") {
        outputs.push(("fits.csv".to_string(), render_rows(&report.fits, &FIT_HEADER, b',')?));
        outputs.push((
            "verification.csv".to_string(),
            render_rows(
                report.verifications.iter().map(VerificationRow::from),
                &VERIFICATION_HEADER,
                b',',
            )?,
        ));
        outputs.push((
            "predictions.csv".to_string(),
            render_rows(
                report.predictions.iter().map(PredictionRow::from),
                &PREDICTION_HEADER,
                b',',
            )?,
        ));
    }
    if wants("tsv") {
        outputs.push(("fits.tsv".to_string(), render_rows(&report.fits, &FIT_HEADER, b'\t')?));
    }
    if wants("json") {
        outputs.push(("model.json".to_string(), serde_json::to_vec_pretty(&report.model)?));
        outputs.push(("report.json".to_string(), serde_json::to_vec_pretty(report)?));
    }
    Ok(outputs)
}
