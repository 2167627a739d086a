//! ABOUTME: Summary statistics and chart rendering for collected samples
//! ABOUTME: Plain, baseline-relative, and aggregate report modes

pub mod chart;
pub mod stats;

pub use stats::{mean, retained_after_warmup, speedup_percent};

use lb_core::{Error, ReportMode, Result};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Summary for one measured loop
#[derive(Debug, Clone, Serialize)]
pub struct LoopSummary {
    pub loop_id: String,
    /// Samples retained after warm-up exclusion
    pub samples: usize,
    /// Mean frame duration in milliseconds over the retained samples
    pub avgtime_ms: f64,
    /// Percentage relative to the recorded baseline (baseline mode only)
    pub speedup_pct: Option<f64>,
}

/// Complete run summary
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub mode: ReportMode,
    pub loops: Vec<LoopSummary>,
    /// Meaning depends on the mode: mean of per-loop averages (plain), mean
    /// of per-loop speedups (baseline), or mean over every retained sample
    /// (aggregate)
    pub overall: f64,
}

/// Turns raw per-loop sample sequences into a run summary
pub struct Reporter {
    mode: ReportMode,
    warmup_exclude: usize,
    baselines: HashMap<String, f64>,
}

impl Reporter {
    pub fn new(mode: ReportMode, warmup_exclude: usize, baselines: HashMap<String, f64>) -> Self {
        Self {
            mode,
            warmup_exclude,
            baselines,
        }
    }

    pub fn summarize(&self, results: &[(String, Vec<f64>)]) -> Result<Report> {
        let mut loops = Vec::with_capacity(results.len());
        let mut retained_all = Vec::new();

        for (loop_id, samples) in results {
            let retained = retained_after_warmup(samples, self.warmup_exclude);
            let avgtime_ms = mean(retained).ok_or_else(|| {
                Error::Validation(format!(
                    "Loop {} has no samples left after excluding {} warm-up frames",
                    loop_id, self.warmup_exclude
                ))
            })?;

            let speedup_pct = match self.mode {
                ReportMode::Baseline => {
                    let baseline = self.baselines.get(loop_id).ok_or_else(|| {
                        Error::Validation(format!("No baseline recorded for loop {}", loop_id))
                    })?;
                    Some(speedup_percent(avgtime_ms, *baseline))
                }
                _ => None,
            };

            debug!(loop_id = %loop_id, avgtime_ms, ?speedup_pct, "Loop summarized");
            retained_all.extend_from_slice(retained);
            loops.push(LoopSummary {
                loop_id: loop_id.clone(),
                samples: retained.len(),
                avgtime_ms,
                speedup_pct,
            });
        }

        let overall = match self.mode {
            ReportMode::Plain => {
                mean(&loops.iter().map(|l| l.avgtime_ms).collect::<Vec<_>>()).unwrap_or(0.0)
            }
            ReportMode::Baseline => mean(
                &loops
                    .iter()
                    .filter_map(|l| l.speedup_pct)
                    .collect::<Vec<_>>(),
            )
            .unwrap_or(0.0),
            ReportMode::Aggregate => mean(&retained_all).unwrap_or(0.0),
        };

        Ok(Report {
            mode: self.mode,
            loops,
            overall,
        })
    }
}

/// Render the deterministic key=value report lines
pub fn render_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.loops.len() + 1);
    for summary in &report.loops {
        let mut line = format!(
            "loop={} samples={} avgtime={:.4}",
            summary.loop_id, summary.samples, summary.avgtime_ms
        );
        if let Some(speedup) = summary.speedup_pct {
            line.push_str(&format!(" speedup={:.2}", speedup));
        }
        lines.push(line);
    }

    let (overall_key, overall) = match report.mode {
        ReportMode::Plain => ("avgtime_mean", format!("{:.4}", report.overall)),
        ReportMode::Baseline => ("speedup_mean", format!("{:.2}", report.overall)),
        ReportMode::Aggregate => ("sample_mean", format!("{:.4}", report.overall)),
    };
    lines.push(format!("overall {}={}", overall_key, overall));
    lines
}
