use crate::analysis::casimir::{CoefficientBounds, PredictionSettings};
use crate::analysis::quantization::Step;
use crate::config::{validate_run_settings, RunSettings, DEFAULT_ERROR_THRESHOLD_PCT};
use crate::core::ConfigProvider;
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub analysis: AnalysisInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub fit: FitConfig,
    #[serde(default)]
    pub predictions: PredictionsConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub catalog: String,
    pub coefficients: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitConfig {
    pub reference: Option<String>,
    pub step: Option<Step>,
    pub error_threshold_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionsConfig {
    pub a: Option<[i64; 2]>,
    pub b: Option<[i64; 2]>,
    pub c: Option<[i64; 2]>,
    pub q_window: Option<[i64; 2]>,
    pub mass_window: Option<[f64; 2]>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

const DEFAULT_REFERENCE: &str = "electron";

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalysisError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalysisError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("analysis.name", &self.analysis.name)?;

        if let Some(level) = self.log_level() {
            if !crate::utils::logger::is_log_level(level) {
                return Err(AnalysisError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Expected one of {}", crate::utils::logger::LOG_LEVELS.join(", ")),
                });
            }
        }

        let predictions = self.prediction_settings();
        validate_run_settings(&RunSettings {
            catalog: &self.source.catalog,
            output_path: &self.load.output_path,
            reference: self.reference_particle(),
            coefficients: self.source.coefficients.as_deref(),
            formats: &self.load.output_formats,
            error_threshold_pct: self.error_threshold_pct(),
            predictions: &predictions,
        })
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_source(&self) -> &str {
        &self.source.catalog
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn reference_particle(&self) -> &str {
        self.fit.reference.as_deref().unwrap_or(DEFAULT_REFERENCE)
    }

    fn step(&self) -> Step {
        self.fit.step.unwrap_or(Step::Quarter)
    }

    fn coefficients_path(&self) -> Option<&str> {
        self.source.coefficients.as_deref()
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load.compression.as_ref().map(|c| c.enabled).unwrap_or(false)
    }

    fn error_threshold_pct(&self) -> f64 {
        self.fit
            .error_threshold_pct
            .unwrap_or(DEFAULT_ERROR_THRESHOLD_PCT)
    }

    fn prediction_settings(&self) -> PredictionSettings {
        let defaults = PredictionSettings::default();
        let p = &self.predictions;
        let pair = |v: Option<[i64; 2]>, fallback: (i64, i64)| v.map(|[lo, hi]| (lo, hi)).unwrap_or(fallback);

        PredictionSettings {
            bounds: CoefficientBounds {
                a: pair(p.a, defaults.bounds.a),
                b: pair(p.b, defaults.bounds.b),
                c: pair(p.c, defaults.bounds.c),
            },
            q_window: pair(p.q_window, defaults.q_window),
            mass_window: p
                .mass_window
                .map(|[lo, hi]| (lo, hi))
                .unwrap_or(defaults.mass_window),
            limit: p.limit.unwrap_or(defaults.limit),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
