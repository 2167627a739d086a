// ABOUTME: Per-loop collection session owning phase, samples, and completion.
// ABOUTME: Replaces process-global started/finished flags with one object.
use crate::parse::parse_sample;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::{debug, trace};

/// Collection phases a loop moves through, strictly in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Page is loading; console output is discarded
    NotStarted,
    /// Play was triggered; waiting for the first frame timing
    Started,
    /// Frame timings are being appended
    Collecting,
    /// The sample cap was reached; everything further is discarded
    Done,
}

struct SessionState {
    phase: Phase,
    samples: Vec<f64>,
}

/// One loop's collection state: phase, sample sequence, and a completion
/// signal the driver can await instead of polling a flag.
pub struct Session {
    loop_id: String,
    cap: usize,
    state: Mutex<SessionState>,
    done: Notify,
}

impl Session {
    pub fn new(loop_id: impl Into<String>, cap: usize) -> Arc<Self> {
        assert!(cap > 0, "sample cap must be positive");
        Arc::new(Self {
            loop_id: loop_id.into(),
            cap,
            state: Mutex::new(SessionState {
                phase: Phase::NotStarted,
                samples: Vec::with_capacity(cap),
            }),
            done: Notify::new(),
        })
    }

    pub fn loop_id(&self) -> &str {
        &self.loop_id
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Record that playback was triggered; console lines count from here on
    pub fn mark_started(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase == Phase::NotStarted {
            state.phase = Phase::Started;
            debug!(loop_id = %self.loop_id, "Collection armed");
        }
    }

    /// Feed one console line; returns true if a sample was appended
    pub fn offer(&self, line: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.phase {
            Phase::NotStarted => {
                trace!(loop_id = %self.loop_id, "Discarding pre-start console line");
                return false;
            }
            Phase::Done => return false,
            Phase::Started | Phase::Collecting => {}
        }

        let Some(value) = parse_sample(line) else {
            return false;
        };

        state.phase = Phase::Collecting;
        state.samples.push(value);

        if state.samples.len() >= self.cap {
            state.phase = Phase::Done;
            debug!(loop_id = %self.loop_id, samples = state.samples.len(), "Sample cap reached");
            self.done.notify_one();
        }
        true
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    pub fn is_done(&self) -> bool {
        self.phase() == Phase::Done
    }

    pub fn sample_count(&self) -> usize {
        self.state.lock().unwrap().samples.len()
    }

    /// Copy out the collected samples
    pub fn samples(&self) -> Vec<f64> {
        self.state.lock().unwrap().samples.clone()
    }

    /// Wait until the sample cap is reached.
    ///
    /// `notify_one` stores a permit, so completion that lands before the
    /// driver starts waiting is not lost.
    pub async fn wait_done(&self) {
        while !self.is_done() {
            self.done.notified().await;
        }
    }
}
