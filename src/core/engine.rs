use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a pipeline through extract, transform and load.
pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting golden-ratio analysis");
        if self.monitor.is_enabled() {
            self.monitor.log_stats("Start");
        }

        // Extract
        tracing::info!("📥 Extracting particle catalog...");
        let particles = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} particles", particles.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Running analyses...");
        let report = self.pipeline.transform(particles).await?;
        tracing::info!(
            "🔄 Fitted {} particles, {}/{} coefficient entries exact",
            report.fits.len(),
            report.verification_summary.exact,
            report.verification_summary.total
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(report).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
