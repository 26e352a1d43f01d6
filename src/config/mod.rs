#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::analysis::casimir::{PredictionSettings, MAX_COEFFICIENT_MAGNITUDE, MAX_SEARCH_COMBINATIONS};
use crate::catalog::CatalogSource;
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
use crate::analysis::quantization::Step;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ERROR_THRESHOLD_PCT: f64 = 5.0;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "golden-mass")]
#[command(about = "Golden-ratio mass analysis of the Standard Model particle spectrum")]
pub struct CliConfig {
    /// `builtin`, a .csv/.json file, `sqlite:<path>` or an http(s) URL
    #[arg(long, default_value = "builtin")]
    pub catalog: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "electron")]
    pub reference: String,

    /// integer, half or quarter
    #[arg(long, default_value = "quarter")]
    pub step: Step,

    /// TOML file with a [coefficients] table
    #[arg(long)]
    pub coefficients: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "csv,tsv,json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all outputs into analysis.zip")]
    pub compress: bool,

    #[arg(long, default_value_t = 20)]
    pub prediction_limit: usize,

    #[arg(long, default_value_t = DEFAULT_ERROR_THRESHOLD_PCT)]
    pub error_threshold: f64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn catalog_source(&self) -> &str {
        &self.catalog
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn reference_particle(&self) -> &str {
        &self.reference
    }

    fn step(&self) -> Step {
        self.step
    }

    fn coefficients_path(&self) -> Option<&str> {
        self.coefficients.as_deref()
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn compress(&self) -> bool {
        self.compress
    }

    fn error_threshold_pct(&self) -> f64 {
        self.error_threshold
    }

    fn prediction_settings(&self) -> PredictionSettings {
        PredictionSettings {
            limit: self.prediction_limit,
            ..PredictionSettings::default()
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_run_settings(&RunSettings {
            catalog: &self.catalog,
            output_path: &self.output_path,
            reference: &self.reference,
            coefficients: self.coefficients.as_deref(),
            formats: &self.formats,
            error_threshold_pct: self.error_threshold,
            predictions: &self.prediction_settings(),
        })
    }
}

/// Settings shared by every configuration front end.
pub struct RunSettings<'a> {
    pub catalog: &'a str,
    pub output_path: &'a str,
    pub reference: &'a str,
    pub coefficients: Option<&'a str>,
    pub formats: &'a [String],
    pub error_threshold_pct: f64,
    pub predictions: &'a PredictionSettings,
}

pub fn validate_run_settings(settings: &RunSettings<'_>) -> Result<()> {
    validation::validate_path("output_path", settings.output_path)?;
    validation::validate_non_empty_string("reference", settings.reference)?;
    settings.catalog.parse::<CatalogSource>()?.validate()?;

    if let Some(path) = settings.coefficients {
        validation::validate_file_extension("coefficients", path, &["toml"])?;
    }

    validation::validate_output_formats("output_formats", settings.formats)?;

    let threshold = settings.error_threshold_pct;
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(AnalysisError::InvalidConfigValueError {
            field: "error_threshold_pct".to_string(),
            value: threshold.to_string(),
            reason: "Threshold must be a positive percentage".to_string(),
        });
    }
    validation::validate_range("error_threshold_pct", threshold, 0.0, 100.0)?;

    validate_prediction_settings(settings.predictions)
}

pub fn validate_prediction_settings(settings: &PredictionSettings) -> Result<()> {
    validation::validate_positive_number("predictions.limit", settings.limit, 1)?;

    let bounds = &settings.bounds;
    validation::validate_ordered_pair("predictions.a", bounds.a.0, bounds.a.1)?;
    validation::validate_ordered_pair("predictions.b", bounds.b.0, bounds.b.1)?;
    validation::validate_ordered_pair("predictions.c", bounds.c.0, bounds.c.1)?;
    for (field, (lo, hi)) in [
        ("predictions.a", bounds.a),
        ("predictions.b", bounds.b),
        ("predictions.c", bounds.c),
    ] {
        validation::validate_range(field, lo, -MAX_COEFFICIENT_MAGNITUDE, MAX_COEFFICIENT_MAGNITUDE)?;
        validation::validate_range(field, hi, -MAX_COEFFICIENT_MAGNITUDE, MAX_COEFFICIENT_MAGNITUDE)?;
    }

    let combinations = bounds.combinations();
    if combinations > MAX_SEARCH_COMBINATIONS {
        return Err(AnalysisError::InvalidConfigValueError {
            field: "predictions".to_string(),
            value: combinations.to_string(),
            reason: format!(
                "The a/b/c bounds span more than {} combinations",
                MAX_SEARCH_COMBINATIONS
            ),
        });
    }

    validation::validate_ordered_pair("predictions.q_window", settings.q_window.0, settings.q_window.1)?;

    let (lo, hi) = settings.mass_window;
    if lo.is_nan() || hi.is_nan() || lo < 0.0 || lo >= hi {
        return Err(AnalysisError::InvalidConfigValueError {
            field: "predictions.mass_window".to_string(),
            value: format!("[{}, {}]", lo, hi),
            reason: "Expected 0 <= lo < hi".to_string(),
        });
    }
    Ok(())
}
