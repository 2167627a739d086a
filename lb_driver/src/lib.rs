//! ABOUTME: Browser automation for playing loops and harvesting console output
//! ABOUTME: Trait-based session abstraction with mock and WebDriver backends

use async_trait::async_trait;
use lb_collect::Session;
use lb_core::{Error, MonotonicTimer, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument};

pub mod mock;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use mock::{ScriptedFactory, ScriptedSession, SyntheticFactory};
#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverFactory;

/// Configuration for driving one loop
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// CSS selector of the element that starts playback
    pub play_selector: String,
    /// Delay between navigation and the play click
    pub warmup_delay: Duration,
    /// Interval between console drains
    pub poll_interval: Duration,
    /// Give up on a loop after this long; `None` waits forever
    pub collection_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            play_selector: "#play_button".to_string(),
            warmup_delay: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(1000),
            collection_timeout: None,
        }
    }
}

/// One live browser page under automation
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;
    async fn click(&self, selector: &str) -> Result<()>;
    /// Console lines printed since the previous drain, oldest first
    async fn drain_console(&self) -> Result<Vec<String>>;
    async fn close(&self) -> Result<()>;
}

/// Launches a fresh, isolated browser session for each loop
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>>;
}

/// Drives one loop at a time: fresh browser, navigate, warm up, click play,
/// pump console lines into the collector until the sample cap is reached.
pub struct LoopDriver {
    factory: Box<dyn BrowserFactory>,
    config: DriverConfig,
}

impl LoopDriver {
    pub fn new(factory: Box<dyn BrowserFactory>, config: DriverConfig) -> Self {
        Self { factory, config }
    }

    /// Play one loop in a fresh browser session and return its samples.
    ///
    /// The console pump runs as a spawned task; the driver awaits the
    /// session's completion signal rather than re-checking a flag.
    #[instrument(skip(self, session), fields(loop_id = %session.loop_id()))]
    pub async fn run_loop(&self, base_url: &str, session: &Arc<Session>) -> Result<Vec<f64>> {
        let browser = self.factory.launch().await?;
        let url = format!(
            "{}/?loop={}",
            base_url.trim_end_matches('/'),
            session.loop_id()
        );

        info!(url = %url, "Opening harness page");
        let timer = MonotonicTimer::new();
        browser.goto(&url).await?;
        tokio::time::sleep(self.config.warmup_delay).await;
        browser.click(&self.config.play_selector).await?;
        session.mark_started();

        let mut pump = tokio::spawn(pump_console(
            Arc::clone(&browser),
            Arc::clone(session),
            self.config.poll_interval,
        ));

        let wait = async {
            tokio::select! {
                _ = session.wait_done() => Ok(()),
                joined = &mut pump => match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(Error::Driver(format!("Console pump task failed: {}", e))),
                },
            }
        };

        let outcome = match self.config.collection_timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(format!(
                    "Loop {} collected {} of {} samples before the deadline",
                    session.loop_id(),
                    session.sample_count(),
                    session.cap()
                ))),
            },
            None => wait.await,
        };

        pump.abort();
        let closed = browser.close().await;
        outcome?;
        closed?;

        info!(
            samples = session.sample_count(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Loop finished"
        );
        Ok(session.samples())
    }
}

/// Feed console lines to the collector on a fixed interval until the
/// session reports done
async fn pump_console(
    browser: Arc<dyn BrowserSession>,
    session: Arc<Session>,
    interval: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for line in browser.drain_console().await? {
            session.offer(&line);
        }
        if session.is_done() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_collect::Phase;
    use test_support::frame_lines;

    fn fast_config() -> DriverConfig {
        DriverConfig {
            play_selector: "#play_button".to_string(),
            warmup_delay: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
            collection_timeout: None,
        }
    }

    #[tokio::test]
    async fn test_run_loop_collects_to_cap() {
        let scripted = ScriptedSession::new(vec![
            frame_lines(40, 9.5341),
            frame_lines(40, 9.5341),
            frame_lines(40, 9.5341),
        ]);
        let factory = ScriptedFactory::new(vec![Arc::clone(&scripted)]);
        let driver = LoopDriver::new(Box::new(factory), fast_config());

        let session = Session::new("4023", 101);
        let samples = driver
            .run_loop("http://127.0.0.1:8000", &session)
            .await
            .unwrap();

        assert_eq!(samples.len(), 101);
        assert_eq!(session.phase(), Phase::Done);
        assert_eq!(
            scripted.visited(),
            vec!["http://127.0.0.1:8000/?loop=4023".to_string()]
        );
        assert_eq!(scripted.clicked(), vec!["#play_button".to_string()]);
        assert!(scripted.closed());
    }

    #[tokio::test]
    async fn test_noise_lines_are_filtered_out() {
        let mut batches = vec![vec!["loaded".to_string(), "decoder ready".to_string()]];
        batches.push(frame_lines(5, 2.0));
        let scripted = ScriptedSession::new(batches);
        let factory = ScriptedFactory::new(vec![Arc::clone(&scripted)]);
        let driver = LoopDriver::new(Box::new(factory), fast_config());

        let session = Session::new("37", 5);
        let samples = driver
            .run_loop("http://127.0.0.1:8000", &session)
            .await
            .unwrap();

        assert_eq!(samples, vec![2.0; 5]);
    }

    #[tokio::test]
    async fn test_timeout_fires_when_collection_stalls() {
        // Only noise; the cap is never reached
        let scripted = ScriptedSession::new(vec![vec!["loaded".to_string()]]);
        let factory = ScriptedFactory::new(vec![scripted]);
        let mut config = fast_config();
        config.collection_timeout = Some(Duration::from_millis(50));
        let driver = LoopDriver::new(Box::new(factory), config);

        let session = Session::new("37", 5);
        let err = driver
            .run_loop("http://127.0.0.1:8000", &session)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_each_loop_gets_a_fresh_session() {
        let first = ScriptedSession::new(vec![frame_lines(3, 1.0)]);
        let second = ScriptedSession::new(vec![frame_lines(3, 2.0)]);
        let factory = ScriptedFactory::new(vec![Arc::clone(&first), Arc::clone(&second)]);
        let driver = LoopDriver::new(Box::new(factory), fast_config());

        let a = Session::new("37", 3);
        let b = Session::new("4023", 3);
        driver.run_loop("http://127.0.0.1:8000", &a).await.unwrap();
        driver.run_loop("http://127.0.0.1:8000", &b).await.unwrap();

        assert!(first.closed());
        assert!(second.closed());
        assert_eq!(a.samples(), vec![1.0; 3]);
        assert_eq!(b.samples(), vec![2.0; 3]);
    }

    #[tokio::test]
    async fn test_synthetic_factory_completes_a_session() {
        let factory = SyntheticFactory::new(1.5, 25);
        let driver = LoopDriver::new(Box::new(factory), fast_config());

        let session = Session::new("1650", 101);
        let samples = driver
            .run_loop("http://127.0.0.1:8000", &session)
            .await
            .unwrap();
        assert_eq!(samples.len(), 101);
        assert!(samples.iter().all(|&v| v == 1.5));
    }
}
