// ABOUTME: Test and fallback browser sessions that never launch a browser.
// ABOUTME: Scripted sessions replay console batches; synthetic ones invent them.
use crate::{BrowserFactory, BrowserSession};
use async_trait::async_trait;
use lb_core::{Error, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Browser session that replays pre-scripted console batches, one per drain.
///
/// Records every navigation, click, and close so tests can assert the
/// driver's interaction order.
pub struct ScriptedSession {
    batches: Mutex<VecDeque<Vec<String>>>,
    visited: Mutex<Vec<String>>,
    clicked: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl ScriptedSession {
    pub fn new(batches: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into()),
            visited: Mutex::new(Vec::new()),
            clicked: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn clicked(&self) -> Vec<String> {
        self.clicked.lock().unwrap().clone()
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.clicked.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn drain_console(&self) -> Result<Vec<String>> {
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

/// Hands out pre-built scripted sessions in order, one per launch
pub struct ScriptedFactory {
    sessions: Mutex<VecDeque<Arc<ScriptedSession>>>,
}

impl ScriptedFactory {
    pub fn new(sessions: Vec<Arc<ScriptedSession>>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
        }
    }
}

#[async_trait]
impl BrowserFactory for ScriptedFactory {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        let session = self
            .sessions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Driver("Scripted factory ran out of sessions".to_string()))?;
        Ok(session)
    }
}

/// Browser session that fabricates a constant frame duration forever.
///
/// Stands in for the real backend when the `webdriver` feature is off, so a
/// dry run still flows through the whole pipeline.
pub struct SyntheticSession {
    frame_ms: f64,
    batch: usize,
}

#[async_trait]
impl BrowserSession for SyntheticSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(url = %url, "Synthetic session navigated");
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        debug!(selector = %selector, "Synthetic session clicked");
        Ok(())
    }

    async fn drain_console(&self) -> Result<Vec<String>> {
        Ok((0..self.batch)
            .map(|_| format!("run_frame() took {}ms", self.frame_ms))
            .collect())
    }

    async fn close(&self) -> Result<()> {
        debug!("Synthetic session closed");
        Ok(())
    }
}

/// Factory for synthetic sessions emitting `frame_ms` durations in batches
pub struct SyntheticFactory {
    frame_ms: f64,
    batch: usize,
}

impl SyntheticFactory {
    pub fn new(frame_ms: f64, batch: usize) -> Self {
        Self { frame_ms, batch }
    }
}

#[async_trait]
impl BrowserFactory for SyntheticFactory {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>> {
        info!(frame_ms = self.frame_ms, "Launching synthetic browser session");
        Ok(Arc::new(SyntheticSession {
            frame_ms: self.frame_ms,
            batch: self.batch,
        }))
    }
}
