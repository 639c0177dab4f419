use std::collections::HashMap;
use std::time::Instant;

/// Observer for preprocessing events.
///
/// Keeps the use case free of output concerns: the CLI logs through
/// `log`, tests discard everything.
pub trait PipelineLogger: Send {
    /// Report that file `current` of `total` in `partition` is done.
    fn progress(&mut self, partition: &str, current: usize, total: usize);

    /// Record how long a named stage took for one file.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. output duration in seconds).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _partition: &str, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: forwards progress and status lines to the `log` facade and
/// aggregates per-stage timing and metrics into an end-of-run report.
///
/// Progress lines are throttled to every `throttle_files` files per
/// partition, plus the last file of each partition.
pub struct CliPipelineLogger {
    throttle_files: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    files_done: usize,
}

impl CliPipelineLogger {
    pub fn new(throttle_files: usize) -> Self {
        Self {
            throttle_files: throttle_files.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            files_done: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let files = self.files_done;
        let mut lines = vec![format!(
            "Preprocessing summary ({files} files, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:7.2}ms  total {total_ms:8.1}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: avg {:.2}", mean(&self.metrics[name])));
        }

        if files > 0 && elapsed_ms > 0.0 {
            let rate = files as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.2} files/s"));
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

impl Default for CliPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for CliPipelineLogger {
    fn progress(&mut self, partition: &str, current: usize, total: usize) {
        self.files_done += 1;
        if total > 0 && (current % self.throttle_files == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("→ {partition}: {current}/{total} files ({pct:.0}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
