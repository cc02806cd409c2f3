use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 三階段流程引擎：extract → transform → load
pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        self.monitor.log_stats("extract");

        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;
        self.monitor.log_stats("transform");

        tracing::info!("Loading results...");
        let output_path = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("load");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        tracing::info!("Output saved to: {}", output_path);
        Ok(output_path)
    }
}
