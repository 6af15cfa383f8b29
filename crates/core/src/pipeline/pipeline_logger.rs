use std::collections::BTreeMap;
use std::time::Instant;

/// Stage names reported by the prediction pipeline.
pub const STAGE_PREPROCESS: &str = "preprocess";
pub const STAGE_INFERENCE: &str = "inference";
pub const STAGE_POSTPROCESS: &str = "postprocess";
/// Faces kept per processed image.
pub const METRIC_FACES: &str = "faces";

/// Observer for per-image pipeline events.
///
/// Keeps the use case free of any particular output mechanism; the CLI
/// prints a summary while tests and embedders can stay silent.
pub trait PipelineLogger: Send {
    /// Report progress over a known number of images.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one image.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric.
    fn metric(&mut self, name: &str, value: f64);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Collects stage timings and metrics and logs a summary at the end.
///
/// Progress lines are throttled to every `throttle` images.
pub struct StdoutPipelineLogger {
    throttle: usize,
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    start_time: Instant,
    images: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            images: 0,
        }
    }

    /// Formatted summary, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        // Every processed image reports inference once, even without progress calls.
        let images = self
            .timings
            .get(STAGE_INFERENCE)
            .map_or(self.images, |v| v.len().max(self.images));
        let mut lines = vec![format!(
            "Pipeline summary ({images} images, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        for (name, values) in &self.metrics {
            let total: f64 = values.iter().sum();
            lines.push(format!("  {name}: avg {:.1}  total {total:.0}", mean(values)));
        }

        if images > 0 && elapsed_ms > 0.0 {
            let rate = images as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} images/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.images = current;
        if total > 0 && (current % self.throttle == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} images ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing(STAGE_INFERENCE, 5.0);
        logger.metric(METRIC_FACES, 3.0);
        logger.summary();
    }

    #[test]
    fn test_timing_records_per_stage() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing(STAGE_INFERENCE, 20.0);
        logger.timing(STAGE_INFERENCE, 30.0);
        logger.timing(STAGE_PREPROCESS, 5.0);

        assert_eq!(logger.timings_for(STAGE_INFERENCE).unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for(STAGE_PREPROCESS).unwrap(), &[5.0]);
        assert!(logger.timings_for(STAGE_POSTPROCESS).is_none());
    }

    #[test]
    fn test_metric_average() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric(METRIC_FACES, 3.0);
        logger.metric(METRIC_FACES, 4.0);
        assert_relative_eq!(mean(logger.metrics_for(METRIC_FACES).unwrap()), 3.5);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing(STAGE_PREPROCESS, 2.0);
        logger.timing(STAGE_INFERENCE, 20.0);
        logger.metric(METRIC_FACES, 3.0);
        logger.metric(METRIC_FACES, 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary (1 images"));
        assert!(summary.contains(STAGE_PREPROCESS));
        assert!(summary.contains(STAGE_INFERENCE));
        assert!(summary.contains("faces: avg 3.5  total 7"));
        assert!(summary.contains("images/s"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_images() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=20 {
            logger.progress(i, 20);
        }
        assert_eq!(logger.images, 20);
    }

    #[test]
    fn test_zero_throttle_clamped() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle, 1);
        assert_eq!(StdoutPipelineLogger::default().throttle, 10);
    }
}
