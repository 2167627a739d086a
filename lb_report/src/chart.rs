// ABOUTME: Standalone SVG line chart of per-frame durations, one series per loop.
// ABOUTME: Fixed geometry, y-axis floored at zero, grid, legend.
use lb_core::Result;
use std::path::Path;
use tracing::info;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const GRID_ROWS: usize = 10;
const GRID_COLS: usize = 10;

/// Twelve distinguishable line colors, reused cyclically
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#aec7e8", "#ffbb78",
];

/// One labelled line on the chart
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Render the frame-duration chart as a standalone SVG document.
///
/// The y-axis always starts at zero; durations are never negative and a
/// zoomed-in axis would exaggerate noise.
pub fn render_svg(series: &[Series], title: &str) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let max_len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let y_max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max)
        .max(1e-9)
        * 1.05;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = WIDTH,
        h = HEIGHT
    ));
    svg.push_str(&format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        WIDTH, HEIGHT
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"28\" text-anchor=\"middle\" font-size=\"18\">{}</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        escape(title)
    ));

    // Grid and y-axis labels
    for row in 0..=GRID_ROWS {
        let frac = row as f64 / GRID_ROWS as f64;
        let y = MARGIN_TOP + plot_h * (1.0 - frac);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\n",
            MARGIN_LEFT,
            y,
            MARGIN_LEFT + plot_w,
            y
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{:.1}</text>\n",
            MARGIN_LEFT - 8.0,
            y + 4.0,
            y_max * frac
        ));
    }

    // Grid and x-axis labels
    if max_len > 1 {
        for col in 0..=GRID_COLS {
            let frac = col as f64 / GRID_COLS as f64;
            let x = MARGIN_LEFT + plot_w * frac;
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\n",
                x,
                MARGIN_TOP,
                x,
                MARGIN_TOP + plot_h
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
                x,
                MARGIN_TOP + plot_h + 18.0,
                ((max_len - 1) as f64 * frac).round() as usize
            ));
        }
    }

    // Axis labels
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">frame number</text>\n",
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 16.0
    ));
    svg.push_str(&format!(
        "<text x=\"18\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\" \
         transform=\"rotate(-90 18 {y})\">run_frame duration [ms]</text>\n",
        y = MARGIN_TOP + plot_h / 2.0
    ));

    // One polyline per series plus its legend entry
    for (idx, s) in series.iter().enumerate() {
        if s.values.is_empty() {
            continue;
        }
        let color = PALETTE[idx % PALETTE.len()];
        let denominator = (max_len.max(2) - 1) as f64;
        let points: Vec<String> = s
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = MARGIN_LEFT + plot_w * (i as f64 / denominator);
                let y = MARGIN_TOP + plot_h * (1.0 - (v.max(0.0) / y_max).min(1.0));
                format!("{:.1},{:.1}", x, y)
            })
            .collect();
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
            color,
            points.join(" ")
        ));

        let legend_y = MARGIN_TOP + 16.0 * idx as f64;
        svg.push_str(&format!(
            "<line x1=\"{x1:.1}\" y1=\"{y:.1}\" x2=\"{x2:.1}\" y2=\"{y:.1}\" \
             stroke=\"{color}\" stroke-width=\"3\"/>\n",
            x1 = WIDTH - MARGIN_RIGHT + 14.0,
            x2 = WIDTH - MARGIN_RIGHT + 38.0,
            y = legend_y,
            color = color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{}</text>\n",
            WIDTH - MARGIN_RIGHT + 44.0,
            legend_y + 4.0,
            escape(&s.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render and write the chart to `path`
pub fn write_chart(path: &Path, series: &[Series], title: &str) -> Result<()> {
    let svg = render_svg(series, title);
    std::fs::write(path, svg)?;
    info!(path = %path.display(), series = series.len(), "Chart written");
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, values: Vec<f64>) -> Series {
        Series {
            label: label.to_string(),
            values,
        }
    }

    #[test]
    fn test_one_polyline_per_series() {
        let svg = render_svg(
            &[
                series("37", vec![1.0, 2.0, 3.0]),
                series("4023", vec![3.0, 2.0, 1.0]),
            ],
            "run_frame duration per frame",
        );
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">37</text>"));
        assert!(svg.contains(">4023</text>"));
        assert!(svg.contains("frame number"));
        assert!(svg.contains("run_frame duration [ms]"));
    }

    #[test]
    fn test_empty_series_is_skipped() {
        let svg = render_svg(
            &[series("37", vec![1.0, 2.0]), series("empty", vec![])],
            "t",
        );
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn test_points_stay_inside_the_plot() {
        let svg = render_svg(&[series("x", vec![0.0, 5.0, 2.5])], "t");
        let points_attr = svg
            .split("points=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        for pair in points_attr.split(' ') {
            let (x, y) = pair.split_once(',').unwrap();
            let x: f64 = x.parse().unwrap();
            let y: f64 = y.parse().unwrap();
            assert!((0.0..=WIDTH).contains(&x));
            assert!((0.0..=HEIGHT).contains(&y));
        }
    }

    #[test]
    fn test_no_nan_coordinates_for_flat_zero_series() {
        let svg = render_svg(&[series("flat", vec![0.0; 10])], "t");
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_write_chart_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        write_chart(&path, &[series("37", vec![1.0, 2.0])], "t").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("<svg"));
        assert!(contents.trim_end().ends_with("</svg>"));
    }
}
