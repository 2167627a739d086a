// ABOUTME: Report mode vocabulary shared between configuration and reporting.
// ABOUTME: Encodes the three observed script variants as explicit modes.
use serde::{Deserialize, Serialize};

/// Which flavor of summary the reporter produces.
///
/// The original tooling existed as three near-duplicate variants; each is a
/// mode here instead of a separate program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Per-loop average frame duration only.
    #[default]
    Plain,
    /// Per-loop average plus speedup percentage against a recorded baseline.
    Baseline,
    /// Per-loop averages plus one mean over every retained sample.
    Aggregate,
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportMode::Plain => write!(f, "plain"),
            ReportMode::Baseline => write!(f, "baseline"),
            ReportMode::Aggregate => write!(f, "aggregate"),
        }
    }
}
