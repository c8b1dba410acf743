use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use svault_constants::DEFAULT_LOAD_TIMEOUT_SECS;
use svault_error::{ReasonCode, Result, SaverError};
use svault_utils::{StatusEntry, now_millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Source,
    Managed,
}

impl Channel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Managed => "managed",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Succeeded(String),
    Failed(ReasonCode),
    TimedOut,
}

/// An immutable, sorted view of one channel's entries.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub entries: Vec<StatusEntry>,
    /// Hex SHA-256 over the entries' structural fields. Empty before the first load.
    pub hash: String,
    pub loaded_at: u64,
}

impl Snapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub enum LoadResult {
    /// Another load holds the channel; it will publish its own result.
    Busy,
    Completed {
        snapshot: Arc<Snapshot>,
        changed: bool,
    },
    Failed(SaverError),
    TimedOut(Duration),
}

impl LoadResult {
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Completed { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Latest first, ties broken by source reference.
pub fn sort_entries(entries: &mut [StatusEntry]) {
    entries.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.source_ref.to_key().cmp(&b.source_ref.to_key()))
    });
}

/// Hashes what identifies the content, never thumbnails or ids. `entries` must already be
/// sorted.
#[must_use]
pub fn structural_hash(entries: &[StatusEntry]) -> String {
    let mut hasher = Sha256::new();
    for entry in entries {
        hasher.update(entry.source_ref.to_key().as_bytes());
        hasher.update([0u8]);
        hasher.update(entry.size_bytes.to_le_bytes());
        hasher.update(entry.last_modified.to_le_bytes());
        hasher.update(entry.media_kind.as_str().as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

struct ChannelSlot {
    lock: Arc<Mutex<()>>,
    current: RwLock<Arc<Snapshot>>,
    loaded: AtomicBool,
    state: watch::Sender<LoadState>,
}

impl ChannelSlot {
    fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            lock: Arc::new(Mutex::new(())),
            current: RwLock::new(Arc::new(Snapshot::default())),
            loaded: AtomicBool::new(false),
            state,
        }
    }

    fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Runs at most one load per channel, bounds each by a timeout and only publishes a new
/// snapshot when the content changed.
pub struct LoadCoordinator {
    source: ChannelSlot,
    managed: ChannelSlot,
    timeout: Duration,
}

impl Default for LoadCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS))
    }
}

impl LoadCoordinator {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            source: ChannelSlot::new(),
            managed: ChannelSlot::new(),
            timeout,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    const fn slot(&self, channel: Channel) -> &ChannelSlot {
        match channel {
            Channel::Source => &self.source,
            Channel::Managed => &self.managed,
        }
    }

    #[must_use]
    pub fn subscribe(&self, channel: Channel) -> watch::Receiver<LoadState> {
        self.slot(channel).state.subscribe()
    }

    #[must_use]
    pub fn state(&self, channel: Channel) -> LoadState {
        self.slot(channel).state.borrow().clone()
    }

    #[must_use]
    pub fn snapshot(&self, channel: Channel) -> Arc<Snapshot> {
        self.slot(channel).current()
    }

    #[must_use]
    pub fn is_loaded(&self, channel: Channel) -> bool {
        self.slot(channel).loaded.load(Ordering::Acquire)
    }

    /// Marks the channel stale so the next [`Self::ensure_loaded`] fetches again.
    pub fn invalidate(&self, channel: Channel) {
        self.slot(channel).loaded.store(false, Ordering::Release);
    }

    /// Loads the channel unless a previous load already succeeded.
    pub async fn ensure_loaded<F>(&self, channel: Channel, fetch: F) -> LoadResult
    where
        F: FnOnce(CancellationToken) -> Result<Vec<StatusEntry>> + Send + 'static,
    {
        if self.is_loaded(channel) {
            return LoadResult::Completed {
                snapshot: self.snapshot(channel),
                changed: false,
            };
        }
        self.try_load(channel, fetch).await
    }

    pub async fn force_refresh<F>(&self, channel: Channel, fetch: F) -> LoadResult
    where
        F: FnOnce(CancellationToken) -> Result<Vec<StatusEntry>> + Send + 'static,
    {
        self.invalidate(channel);
        self.try_load(channel, fetch).await
    }

    /// Returns [`LoadResult::Busy`] at once when the channel is already loading.
    ///
    /// The fetch runs on the blocking pool and owns the channel lock, so a fetch that
    /// outlives its timeout keeps the channel busy until it actually returns. A fetch that
    /// returns in time hands the lock back and it is held until the result is published.
    pub async fn try_load<F>(&self, channel: Channel, fetch: F) -> LoadResult
    where
        F: FnOnce(CancellationToken) -> Result<Vec<StatusEntry>> + Send + 'static,
    {
        let slot = self.slot(channel);
        let Ok(guard) = Arc::clone(&slot.lock).try_lock_owned() else {
            svault_logger::debug(&format!("{channel} load already in flight"));
            return LoadResult::Busy;
        };

        let cancel = CancellationToken::new();
        let in_flight = InFlight {
            slot,
            previous: Some(slot.state.send_replace(LoadState::Loading)),
            cancel: cancel.clone(),
        };
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            let result = fetch(token);
            (guard, result)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok((guard, Ok(entries)))) => {
                let result = self.publish(channel, entries);
                if let Some(snapshot) = result.snapshot() {
                    in_flight.settle(LoadState::Succeeded(snapshot.hash.clone()));
                }
                drop(guard);
                result
            }
            Ok(Ok((guard, Err(err)))) => {
                svault_logger::debug(&format!("{channel} load failed: {err}"));
                in_flight.settle(LoadState::Failed(err.reason()));
                drop(guard);
                LoadResult::Failed(err)
            }
            Ok(Err(join_err)) => {
                let err =
                    SaverError::io(channel.as_str(), std::io::Error::other(join_err.to_string()));
                in_flight.settle(LoadState::Failed(err.reason()));
                LoadResult::Failed(err)
            }
            Err(_) => {
                cancel.cancel();
                svault_logger::warn(&format!(
                    "{channel} load timed out after {}s",
                    self.timeout.as_secs()
                ));
                in_flight.settle(LoadState::TimedOut);
                LoadResult::TimedOut(self.timeout)
            }
        }
    }

    /// Swaps in a new snapshot when the content changed. Callers hold the channel lock.
    fn publish(&self, channel: Channel, mut entries: Vec<StatusEntry>) -> LoadResult {
        let slot = self.slot(channel);
        sort_entries(&mut entries);
        let hash = structural_hash(&entries);

        let mut current = slot.current.write().unwrap_or_else(PoisonError::into_inner);
        let changed = current.hash != hash;
        if changed {
            svault_logger::debug(&format!("{channel} changed: {} entries", entries.len()));
            *current = Arc::new(Snapshot {
                entries,
                hash,
                loaded_at: now_millis(),
            });
        }
        let snapshot = Arc::clone(&current);
        drop(current);

        slot.loaded.store(true, Ordering::Release);
        LoadResult::Completed { snapshot, changed }
    }
}

/// A load between taking the lock and reporting its outcome. Dropped unsettled, it cancels
/// the fetch and puts the channel state back to what it was before.
struct InFlight<'a> {
    slot: &'a ChannelSlot,
    previous: Option<LoadState>,
    cancel: CancellationToken,
}

impl InFlight<'_> {
    fn settle(mut self, state: LoadState) {
        self.previous = None;
        self.slot.state.send_replace(state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.cancel.cancel();
            self.slot.state.send_replace(previous);
        }
    }
}
