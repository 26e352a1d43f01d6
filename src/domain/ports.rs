use crate::analysis::casimir::PredictionSettings;
use crate::analysis::quantization::Step;
use crate::domain::model::{AnalysisReport, Particle};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// `builtin`, a `.csv`/`.json` path, `sqlite:<path>` or an http(s) URL.
    fn catalog_source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn reference_particle(&self) -> &str;
    fn step(&self) -> Step;
    fn coefficients_path(&self) -> Option<&str>;
    fn output_formats(&self) -> &[String];
    fn compress(&self) -> bool;
    fn error_threshold_pct(&self) -> f64;
    fn prediction_settings(&self) -> PredictionSettings;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Particle>>;
    async fn transform(&self, particles: Vec<Particle>) -> Result<AnalysisReport>;
    async fn load(&self, report: AnalysisReport) -> Result<String>;
}
