//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use anyhow::Result;
use chatmark::highlight::{CacheKey, HighlightPipeline, PipelineConfig};
use chatmark::syntax::{CodeToken, TokenType, Tokenizer, TokenizerRegistry};

/// Upper bound for any wait on the background worker
pub const WAIT: Duration = Duration::from_secs(10);

/// Pipeline over `registry` with no pause between work items
pub fn test_pipeline(registry: TokenizerRegistry) -> HighlightPipeline {
    HighlightPipeline::new(
        Arc::new(registry),
        PipelineConfig {
            worker_yield: Duration::ZERO,
        },
    )
}

/// Receive `n` completion keys, failing the test on timeout
pub fn recv_keys(rx: &Receiver<CacheKey>, n: usize) -> Vec<CacheKey> {
    (0..n)
        .map(|i| {
            rx.recv_timeout(WAIT)
                .unwrap_or_else(|e| panic!("completion {} of {} never arrived: {}", i + 1, n, e))
        })
        .collect()
}

/// Tokenizer that marks the first word as a keyword and counts its calls
pub fn counting_tokenizer() -> (Arc<AtomicUsize>, Arc<dyn Tokenizer>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let tokenizer = move |code: &str| -> Result<Vec<CodeToken>> {
        counter.fetch_add(1, Ordering::SeqCst);
        let word = code.split_whitespace().next().unwrap_or("");
        Ok(vec![CodeToken::new(word, TokenType::Keyword, 0)])
    };
    (calls, Arc::new(tokenizer))
}

#[derive(Default)]
struct GateState {
    open: bool,
    entered: bool,
}

/// Holds the worker inside a tokenizer call until the test opens it
#[derive(Default)]
pub struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Called from the tokenizer: announce arrival, then wait for `open`
    fn enter(&self) {
        let mut state = self.state.lock().unwrap();
        state.entered = true;
        self.changed.notify_all();
        while !state.open {
            state = self.changed.wait(state).unwrap();
        }
    }

    /// Block until the worker is parked in the gate
    pub fn wait_entered(&self) {
        let state = self.state.lock().unwrap();
        let (state, timeout) = self
            .changed
            .wait_timeout_while(state, WAIT, |s| !s.entered)
            .unwrap();
        assert!(!timeout.timed_out() && state.entered, "worker never reached the gate");
    }

    pub fn open(&self) {
        self.state.lock().unwrap().open = true;
        self.changed.notify_all();
    }
}

/// Tokenizer that parks on `gate` for code equal to `"BLOCK"` and records
/// the order in which it sees inputs
pub fn gated_tokenizer(gate: Arc<Gate>) -> (Arc<Mutex<Vec<String>>>, Arc<dyn Tokenizer>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let tokenizer = move |code: &str| -> Result<Vec<CodeToken>> {
        log.lock().unwrap().push(code.to_string());
        if code == "BLOCK" {
            gate.enter();
        }
        Ok(Vec::new())
    };
    (seen, Arc::new(tokenizer))
}
