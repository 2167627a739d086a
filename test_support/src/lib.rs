//! ABOUTME: Shared testing utilities and helper functions
//! ABOUTME: Common test fixtures for all loopbench crates

/// Build a synthetic frame-timing console line for the given duration
pub fn frame_line(duration_ms: f64) -> String {
    format!("run_frame() took {}ms", duration_ms)
}

/// Build `count` identical synthetic frame-timing console lines
pub fn frame_lines(count: usize, duration_ms: f64) -> Vec<String> {
    (0..count).map(|_| frame_line(duration_ms)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_line_format() {
        assert_eq!(frame_line(9.5341), "run_frame() took 9.5341ms");
    }

    #[test]
    fn test_frame_lines_count() {
        assert_eq!(frame_lines(101, 1.0).len(), 101);
    }
}
