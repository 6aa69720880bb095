//! Background highlighting with a content-addressed cache
//!
//! `request` answers from the cache or hands back a placeholder and queues
//! the work. A single lazily-started worker thread drains the queue newest
//! first. Finished keys are broadcast to subscribers.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};
use std::thread;
use std::time::Duration;

use crate::syntax::TokenizerRegistry;
use crate::theme::{SyntaxPalette, ThemeSet};

use super::segments::{materialize, placeholder, ColoredSegment};

/// Identifies one highlight result: theme flag plus a hash of
/// `(language, code)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dark: bool,
    pub hash: u64,
}

/// Result of a highlight request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// Colored segments from the cache
    Ready(Vec<ColoredSegment>),
    /// Work is queued; `key` will be broadcast when it completes
    Pending {
        key: CacheKey,
        placeholder: Vec<ColoredSegment>,
    },
}

impl Highlight {
    /// Segments to draw right now, final or placeholder
    pub fn segments(&self) -> &[ColoredSegment] {
        match self {
            Highlight::Ready(segments) => segments,
            Highlight::Pending { placeholder, .. } => placeholder,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Highlight::Ready(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pause between work items so the worker never monopolizes a core
    pub worker_yield: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_yield: Duration::from_millis(1),
        }
    }
}

#[derive(Debug)]
struct WorkItem {
    key: CacheKey,
    language: String,
    code: String,
}

#[derive(Default)]
struct PipelineState {
    cache: HashMap<CacheKey, Arc<Vec<ColoredSegment>>>,
    pending: HashSet<CacheKey>,
    /// LIFO: the worker pops from the back
    queue: Vec<WorkItem>,
    worker_running: bool,
}

struct Shared {
    registry: Arc<TokenizerRegistry>,
    palette: RwLock<Option<Arc<dyn SyntaxPalette>>>,
    state: Mutex<PipelineState>,
    subscribers: Mutex<Vec<Sender<CacheKey>>>,
    config: PipelineConfig,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn palette(&self) -> Option<Arc<dyn SyntaxPalette>> {
        self.palette
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn notify(&self, key: CacheKey) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(key).is_ok());
    }
}

/// Cheap-to-clone handle to a highlight pipeline
#[derive(Clone)]
pub struct HighlightPipeline {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for HighlightPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightPipeline")
            .field("cached", &self.cache_len())
            .field("pending", &self.pending_len())
            .field("config", &self.shared.config)
            .finish()
    }
}

static GLOBAL: OnceLock<HighlightPipeline> = OnceLock::new();

impl HighlightPipeline {
    pub fn new(registry: Arc<TokenizerRegistry>, config: PipelineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry,
                palette: RwLock::new(None),
                state: Mutex::new(PipelineState::default()),
                subscribers: Mutex::new(Vec::new()),
                config,
            }),
        }
    }

    /// Process-wide pipeline over the built-in tokenizers
    pub fn global() -> &'static HighlightPipeline {
        GLOBAL.get_or_init(|| {
            HighlightPipeline::new(
                Arc::new(TokenizerRegistry::with_defaults()),
                PipelineConfig::default(),
            )
        })
    }

    /// Install the palette used for placeholders and new results.
    ///
    /// Results already cached keep the colors they were built with.
    pub fn set_palette(&self, palette: Arc<dyn SyntaxPalette>) {
        *self
            .shared
            .palette
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(palette);
    }

    /// Cache key for a request. Language ids compare case-insensitively.
    pub fn key_for(language: &str, dark: bool, code: &str) -> CacheKey {
        let mut hasher = DefaultHasher::new();
        language.trim().to_lowercase().hash(&mut hasher);
        code.hash(&mut hasher);
        CacheKey {
            dark,
            hash: hasher.finish(),
        }
    }

    /// Highlight `code`, from the cache when possible.
    ///
    /// Never blocks on tokenization. A miss queues the work once; repeated
    /// requests for a pending key only return a fresh placeholder.
    pub fn request(&self, language: &str, dark: bool, code: &str) -> Highlight {
        let key = Self::key_for(language, dark, code);
        let palette = self.shared.palette();

        let start_worker = {
            let mut state = self.shared.lock_state();
            if let Some(segments) = state.cache.get(&key) {
                tracing::trace!("Highlight cache hit for {:?}", key);
                return Highlight::Ready(segments.as_ref().clone());
            }

            if state.pending.insert(key) {
                tracing::debug!(
                    "Queueing highlight for '{}' ({} bytes), queue depth {}",
                    language,
                    code.len(),
                    state.queue.len() + 1
                );
                state.queue.push(WorkItem {
                    key,
                    language: language.to_string(),
                    code: code.to_string(),
                });
                !std::mem::replace(&mut state.worker_running, true)
            } else {
                false
            }
        };

        if start_worker {
            self.spawn_worker();
        }

        Highlight::Pending {
            key,
            placeholder: placeholder(code, palette.as_deref(), dark),
        }
    }

    /// Cached segments for a key, if the work has finished
    pub fn cached(&self, key: CacheKey) -> Option<Vec<ColoredSegment>> {
        self.shared
            .lock_state()
            .cache
            .get(&key)
            .map(|segments| segments.as_ref().clone())
    }

    pub fn is_pending(&self, key: CacheKey) -> bool {
        self.shared.lock_state().pending.contains(&key)
    }

    pub fn cache_len(&self) -> usize {
        self.shared.lock_state().cache.len()
    }

    pub fn pending_len(&self) -> usize {
        self.shared.lock_state().pending.len()
    }

    /// Receive every completed key from now on.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<CacheKey> {
        let (tx, rx) = mpsc::channel();
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    fn spawn_worker(&self) {
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("highlight-worker".into())
            .spawn(move || run_worker(shared));

        if let Err(e) = spawned {
            tracing::error!("Failed to start highlight worker: {}", e);
            // Forget the queued work so later requests retry it
            let mut state = self.shared.lock_state();
            let dropped: Vec<WorkItem> = state.queue.drain(..).collect();
            for item in dropped {
                state.pending.remove(&item.key);
            }
            state.worker_running = false;
        }
    }
}

/// Resets the queue if the worker unwinds, so later requests start over
/// with a fresh worker instead of waiting on keys nobody will finish.
struct WorkerGuard(Arc<Shared>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!("Highlight worker panicked, dropping queued work");
            let mut state = self.0.lock_state();
            state.queue.clear();
            state.pending.clear();
            state.worker_running = false;
        }
    }
}

fn run_worker(shared: Arc<Shared>) {
    let _guard = WorkerGuard(Arc::clone(&shared));
    tracing::debug!("Highlight worker started");

    loop {
        let item = {
            let mut state = shared.lock_state();
            match state.queue.pop() {
                Some(item) => item,
                None => {
                    state.worker_running = false;
                    break;
                }
            }
        };

        let tokens = shared.registry.highlight(&item.language, &item.code);
        let segments = match shared.palette() {
            Some(palette) => materialize(&item.code, &tokens, palette.as_ref(), item.key.dark),
            None => materialize(&item.code, &tokens, &ThemeSet::default(), item.key.dark),
        };

        {
            let mut state = shared.lock_state();
            state.cache.insert(item.key, Arc::new(segments));
            state.pending.remove(&item.key);
        }
        tracing::trace!("Highlighted {:?} ({} tokens)", item.key, tokens.len());
        shared.notify(item.key);

        if !shared.config.worker_yield.is_zero() {
            thread::sleep(shared.config.worker_yield);
        }
    }

    tracing::debug!("Highlight worker idle, exiting");
}
