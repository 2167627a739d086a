// ABOUTME: Console line parser for per-frame timing messages.
// ABOUTME: Prefix and suffix checks plus a real float parse, no fixed offsets.
use tracing::warn;

/// Exact prefix the harness page prints before each frame duration
pub const SAMPLE_PREFIX: &str = "run_frame() took ";

/// Unit suffix closing each frame duration message
pub const SAMPLE_SUFFIX: &str = "ms";

/// Extract the millisecond duration from a console line.
///
/// Lines that do not carry the prefix are not ours and return `None`
/// silently. Lines that carry the prefix but no parseable number are
/// malformed harness output and are skipped with a warning rather than
/// corrupting the sample sequence.
pub fn parse_sample(line: &str) -> Option<f64> {
    let rest = line.strip_prefix(SAMPLE_PREFIX)?;
    let Some(number) = rest.strip_suffix(SAMPLE_SUFFIX) else {
        warn!(line = %line, "Frame timing line missing unit suffix");
        return None;
    };

    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(_) => {
            warn!(line = %line, "Frame timing value is not finite");
            None
        }
        Err(e) => {
            warn!(line = %line, error = %e, "Frame timing value failed to parse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_wellformed_line() {
        assert_eq!(parse_sample("run_frame() took 9.5341ms"), Some(9.5341));
    }

    #[test]
    fn test_parses_integer_duration() {
        assert_eq!(parse_sample("run_frame() took 12ms"), Some(12.0));
    }

    #[test]
    fn test_ignores_unrelated_lines() {
        assert_eq!(parse_sample("loaded"), None);
        assert_eq!(parse_sample(""), None);
        assert_eq!(parse_sample("run_frame() finished"), None);
    }

    #[test]
    fn test_prefix_must_match_exactly() {
        assert_eq!(parse_sample(" run_frame() took 1.0ms"), None);
        assert_eq!(parse_sample("RUN_FRAME() TOOK 1.0ms"), None);
    }

    #[test]
    fn test_rejects_missing_suffix() {
        assert_eq!(parse_sample("run_frame() took 9.5341"), None);
        assert_eq!(parse_sample("run_frame() took 9.5341 milliseconds"), None);
    }

    #[test]
    fn test_rejects_malformed_number() {
        assert_eq!(parse_sample("run_frame() took fastms"), None);
        assert_eq!(parse_sample("run_frame() took ms"), None);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(parse_sample("run_frame() took infms"), None);
        assert_eq!(parse_sample("run_frame() took NaNms"), None);
    }
}
