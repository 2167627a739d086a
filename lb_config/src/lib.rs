//! ABOUTME: Configuration management with validation and environment loading
//! ABOUTME: Handles all benchmark settings from defaults, files, and env vars

use config::{Config as ConfigBuilder, Environment, File};
use lb_core::{Error, ReportMode, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Loop identifiers measured when no explicit list is configured.
const DEFAULT_LOOPS: &[&str] = &[
    "37", "7311", "4145", "437", "1650", "2139", "4023", "3664", "3946", "4449", "7081", "7711",
];

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Serialize, Validate, Default)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub fetch: FetchConfig,
    #[validate(nested)]
    pub driver: DriverConfig,
    #[validate(nested)]
    pub bench: BenchConfig,
    pub report: ReportConfig,
}

/// Local content server configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    /// TCP port for the content server; 0 picks an ephemeral port
    pub port: u16,
    /// Directory served to the browser (harness page plus media files)
    #[validate(length(min = 1))]
    pub root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            root: ".".to_string(),
        }
    }
}

/// Asset fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct FetchConfig {
    /// Remote directory the media files are downloaded from
    #[validate(length(min = 1))]
    pub base_url: String,
    /// Local directory the media files are cached in
    #[validate(length(min = 1))]
    pub media_dir: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://z0r.de/L".to_string(),
            media_dir: ".".to_string(),
        }
    }
}

/// Browser driver configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DriverConfig {
    /// WebDriver endpoint (e.g. chromedriver)
    #[validate(length(min = 1))]
    pub webdriver_url: String,
    /// Run the browser headless
    pub headless: bool,
    /// CSS selector of the element that starts playback
    #[validate(length(min = 1))]
    pub play_selector: String,
    /// Delay between navigation and the play click, in milliseconds
    #[validate(range(min = 1, max = 60000))]
    pub warmup_delay_ms: u64,
    /// Interval between console drains, in milliseconds
    #[validate(range(min = 1, max = 60000))]
    pub poll_interval_ms: u64,
    /// Abort a loop that has not filled its sample cap after this many
    /// seconds; 0 waits forever
    pub collection_timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            play_selector: "#play_button".to_string(),
            warmup_delay_ms: 1000,
            poll_interval_ms: 1000,
            collection_timeout_secs: 0,
        }
    }
}

/// Measurement configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BenchConfig {
    /// Loop identifiers to measure, in order
    #[validate(length(min = 1))]
    pub loops: Vec<String>,
    /// Samples collected per loop before the run moves on
    #[validate(range(min = 1, max = 100000))]
    pub sample_cap: usize,
    /// Leading samples excluded from the average (cold-start skew)
    pub warmup_exclude: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            loops: DEFAULT_LOOPS.iter().map(|s| s.to_string()).collect(),
            sample_cap: 101,
            warmup_exclude: 10,
        }
    }
}

/// Reporting configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReportConfig {
    pub mode: ReportMode,
    /// Reference average frame duration per loop (baseline mode only)
    #[serde(default)]
    pub baselines: HashMap<String, f64>,
    /// Where the SVG chart is written; empty disables charting
    pub chart_path: String,
}

impl Config {
    /// Load configuration from defaults, an optional `loopbench.toml`, and
    /// `LOOPBENCH_`-prefixed environment variables
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // Set defaults first
        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 0)?
            .set_default("server.root", ".")?
            .set_default("fetch.base_url", "https://z0r.de/L")?
            .set_default("fetch.media_dir", ".")?
            .set_default("driver.webdriver_url", "http://localhost:9515")?
            .set_default("driver.headless", true)?
            .set_default("driver.play_selector", "#play_button")?
            .set_default("driver.warmup_delay_ms", 1000)?
            .set_default("driver.poll_interval_ms", 1000)?
            .set_default("driver.collection_timeout_secs", 0)?
            .set_default(
                "bench.loops",
                DEFAULT_LOOPS.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            )?
            .set_default("bench.sample_cap", 101)?
            .set_default("bench.warmup_exclude", 10)?
            .set_default("report.mode", "plain")?
            .set_default("report.chart_path", "")?;

        // Multi-word keys clash with the env separator, so handle them
        // explicitly before the generic prefix source
        if let Ok(cap) = std::env::var("LOOPBENCH_BENCH_SAMPLE_CAP") {
            builder = builder.set_override("bench.sample_cap", cap)?;
        }
        if let Ok(exclude) = std::env::var("LOOPBENCH_BENCH_WARMUP_EXCLUDE") {
            builder = builder.set_override("bench.warmup_exclude", exclude)?;
        }
        if let Ok(url) = std::env::var("LOOPBENCH_DRIVER_WEBDRIVER_URL") {
            builder = builder.set_override("driver.webdriver_url", url)?;
        }
        if let Ok(path) = std::env::var("LOOPBENCH_REPORT_CHART_PATH") {
            builder = builder.set_override("report.chart_path", path)?;
        }
        if let Ok(url) = std::env::var("LOOPBENCH_FETCH_BASE_URL") {
            builder = builder.set_override("fetch.base_url", url)?;
        }

        // Try to load from loopbench.toml if it exists (optional)
        if std::path::Path::new("loopbench.toml").exists() {
            builder = builder.add_source(File::with_name("loopbench").required(false));
        }

        // Load from environment variables with LOOPBENCH_ prefix (highest priority)
        builder = builder.add_source(
            Environment::with_prefix("LOOPBENCH")
                .try_parsing(true)
                .separator("_"),
        );

        let config = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build config: {}", e)))?;

        let parsed: Config = config
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Failed to deserialize config: {}", e)))?;

        parsed
            .validate()
            .map_err(|e| Error::Config(format!("Config validation failed: {}", e)))?;
        parsed.validate_cross_fields()?;

        Ok(parsed)
    }

    /// Checks that span more than one field and so fall outside the derive
    pub fn validate_cross_fields(&self) -> Result<()> {
        if self.bench.warmup_exclude >= self.bench.sample_cap {
            return Err(Error::Validation(format!(
                "warmup_exclude ({}) must be below sample_cap ({})",
                self.bench.warmup_exclude, self.bench.sample_cap
            )));
        }

        if self.report.mode == ReportMode::Baseline {
            for loop_id in &self.bench.loops {
                if !self.report.baselines.contains_key(loop_id) {
                    return Err(Error::Validation(format!(
                        "baseline mode requires a baseline for loop {}",
                        loop_id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Use a mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() -> Vec<(&'static str, Option<String>)> {
        let vars = [
            "LOOPBENCH_SERVER_HOST",
            "LOOPBENCH_SERVER_PORT",
            "LOOPBENCH_BENCH_SAMPLE_CAP",
            "LOOPBENCH_BENCH_WARMUP_EXCLUDE",
            "LOOPBENCH_DRIVER_WEBDRIVER_URL",
            "LOOPBENCH_REPORT_CHART_PATH",
            "LOOPBENCH_FETCH_BASE_URL",
        ];
        vars.iter()
            .map(|key| {
                let original = env::var(key).ok();
                env::remove_var(key);
                (*key, original)
            })
            .collect()
    }

    fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let config = Config::load().expect("defaults should load");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 0);
        assert_eq!(config.fetch.base_url, "https://z0r.de/L");
        assert_eq!(config.driver.play_selector, "#play_button");
        assert_eq!(config.bench.sample_cap, 101);
        assert_eq!(config.bench.warmup_exclude, 10);
        assert_eq!(config.bench.loops.len(), 12);
        assert!(config.bench.loops.contains(&"4023".to_string()));
        assert_eq!(config.report.mode, ReportMode::Plain);
        assert!(config.report.chart_path.is_empty());

        restore_env(saved);
    }

    #[test]
    fn test_env_override_sample_cap() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        env::set_var("LOOPBENCH_BENCH_SAMPLE_CAP", "100");
        env::set_var("LOOPBENCH_BENCH_WARMUP_EXCLUDE", "20");
        let config = Config::load().expect("overrides should load");
        assert_eq!(config.bench.sample_cap, 100);
        assert_eq!(config.bench.warmup_exclude, 20);

        restore_env(saved);
    }

    #[test]
    fn test_warmup_must_stay_below_cap() {
        let mut config = Config::default();
        config.bench.sample_cap = 10;
        config.bench.warmup_exclude = 10;
        assert!(config.validate_cross_fields().is_err());
    }

    #[test]
    fn test_baseline_mode_requires_full_table() {
        let mut config = Config::default();
        config.report.mode = ReportMode::Baseline;
        config.bench.loops = vec!["4023".to_string(), "37".to_string()];
        config.report.baselines.insert("4023".to_string(), 9.5341);
        assert!(config.validate_cross_fields().is_err());

        config.report.baselines.insert("37".to_string(), 12.0);
        assert!(config.validate_cross_fields().is_ok());
    }
}
