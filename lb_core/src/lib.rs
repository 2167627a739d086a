//! ABOUTME: Core types, errors, and tracing utilities
//! ABOUTME: Foundation crate used by all other loopbench components

pub mod error;
pub mod mode;
pub mod telemetry;
pub mod time;

pub use error::{Error, Result};
pub use mode::ReportMode;
pub use time::MonotonicTimer;

#[cfg(test)]
mod tests {
    use super::ReportMode;

    #[test]
    fn test_report_mode_round_trips_through_serde() {
        for mode in [
            ReportMode::Plain,
            ReportMode::Baseline,
            ReportMode::Aggregate,
        ] {
            let encoded = serde_json::to_string(&mode).unwrap();
            // The wire form matches the Display form used in logs
            assert_eq!(encoded, format!("\"{}\"", mode));
            let decoded: ReportMode = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, mode);
        }
    }
}
