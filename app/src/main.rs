//! ABOUTME: Main binary for the loopbench frame-timing harness
//! ABOUTME: Wires server, fetcher, driver, collector, and reporter together

use lb_collect::Session;
use lb_config::Config;
use lb_core::telemetry;
use lb_driver::{BrowserFactory, DriverConfig, LoopDriver};
use lb_fetch::{AssetFetcher, FetchConfig};
use lb_report::{chart, render_lines, Reporter};
use lb_serve::ServeConfig;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    telemetry::init_tracing("development", "loopbench");
    tracing::info!("loopbench starting");

    // Load configuration - exit with non-zero if invalid
    let config = match Config::load() {
        Ok(config) => {
            tracing::debug!(?config, "Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    tracing::info!(
        loops = config.bench.loops.len(),
        sample_cap = config.bench.sample_cap,
        warmup_exclude = config.bench.warmup_exclude,
        mode = %config.report.mode,
        "Benchmark configured"
    );

    // Content server lives on its own thread for the rest of the run
    let server = match lb_serve::start(&ServeConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: PathBuf::from(&config.server.root),
    }) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start content server: {}", e);
            process::exit(1);
        }
    };
    tracing::info!(base_url = %server.base_url(), "Content server ready");

    let fetcher = match AssetFetcher::new(FetchConfig {
        base_url: config.fetch.base_url.clone(),
        media_dir: PathBuf::from(&config.fetch.media_dir),
    }) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("Failed to create asset fetcher: {}", e);
            process::exit(1);
        }
    };

    let driver = LoopDriver::new(
        browser_factory(&config),
        DriverConfig {
            play_selector: config.driver.play_selector.clone(),
            warmup_delay: Duration::from_millis(config.driver.warmup_delay_ms),
            poll_interval: Duration::from_millis(config.driver.poll_interval_ms),
            collection_timeout: (config.driver.collection_timeout_secs > 0)
                .then(|| Duration::from_secs(config.driver.collection_timeout_secs)),
        },
    );

    // One loop at a time, each in a fresh browser session
    let mut results: Vec<(String, Vec<f64>)> = Vec::with_capacity(config.bench.loops.len());
    for loop_id in &config.bench.loops {
        if let Err(e) = fetcher.ensure(loop_id).await {
            tracing::error!(loop_id = %loop_id, "Asset fetch failed: {}", e);
            process::exit(1);
        }

        let session = Session::new(loop_id.clone(), config.bench.sample_cap);
        match driver.run_loop(&server.base_url(), &session).await {
            Ok(samples) => results.push((loop_id.clone(), samples)),
            Err(e) => {
                tracing::error!(loop_id = %loop_id, "Loop failed: {}", e);
                process::exit(1);
            }
        }
    }

    let reporter = Reporter::new(
        config.report.mode,
        config.bench.warmup_exclude,
        config.report.baselines.clone(),
    );
    let report = match reporter.summarize(&results) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Failed to summarize results: {}", e);
            process::exit(1);
        }
    };

    for line in render_lines(&report) {
        println!("{}", line);
    }

    if !config.report.chart_path.is_empty() {
        let series: Vec<chart::Series> = results
            .iter()
            .map(|(loop_id, samples)| chart::Series {
                label: loop_id.clone(),
                values: samples.clone(),
            })
            .collect();
        if let Err(e) = chart::write_chart(
            Path::new(&config.report.chart_path),
            &series,
            "run_frame duration per frame",
        ) {
            tracing::error!("Failed to write chart: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(feature = "webdriver")]
fn browser_factory(config: &Config) -> Box<dyn BrowserFactory> {
    Box::new(lb_driver::WebDriverFactory::new(
        config.driver.webdriver_url.clone(),
        config.driver.headless,
    ))
}

#[cfg(not(feature = "webdriver"))]
fn browser_factory(_config: &Config) -> Box<dyn BrowserFactory> {
    tracing::warn!("webdriver feature not enabled, using a synthetic browser session");
    Box::new(lb_driver::SyntheticFactory::new(1.0, 25))
}
