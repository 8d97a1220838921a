use crate::ClockHandle;
use crate::cache::TempCode;
use crate::clock::unix_millis;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use ucss_storage::KvHandle;

/// Result of a single sweep decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// A write happened within the retention window; check again later.
    Rescheduled,
    /// Stale entries were removed (count given) and the sweeper stopped.
    Swept(usize),
}

/// Background cleanup of prefetched code entries whose removal timer was lost.
///
/// The sweep loop waits one retention window, then either reschedules itself
/// (a prefetch wrote recently, so its own timer is still pending) or removes
/// every stale prefixed entry and stops. The next [`touch`](Self::touch)
/// starts it again.
#[derive(Clone)]
pub struct Sweeper {
    inner: Arc<Inner>,
}

struct Inner {
    kv: KvHandle,
    clock: ClockHandle,
    prefix: String,
    retention: Duration,
    /// Unix milliseconds of the latest prefetch write; `i64::MIN` if none.
    last_write: AtomicI64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    pub fn new(kv: KvHandle, clock: ClockHandle, prefix: impl Into<String>, retention: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                kv,
                clock,
                prefix: prefix.into(),
                retention,
                last_write: AtomicI64::new(i64::MIN),
                task: Mutex::new(None),
            }),
        }
    }

    /// Records a write and makes sure the sweep loop is running.
    pub fn touch(&self) {
        let now = unix_millis(self.inner.clock.now());
        self.inner.last_write.store(now, Ordering::SeqCst);
        self.start();
    }

    /// Starts the sweep loop unless it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        tracing::debug!(prefix = %self.inner.prefix, "Starting prefetched code sweeper");
        *task = Some(tokio::spawn(self.clone().run()));
    }

    /// Stops the sweep loop. Entries already scheduled for removal by their
    /// own timers are unaffected.
    pub fn stop(&self) {
        if let Some(handle) = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        let task = self.inner.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn run(self) {
        loop {
            tokio::time::sleep(self.inner.retention).await;
            match self.tick().await {
                Ok(SweepOutcome::Rescheduled) => continue,
                Ok(SweepOutcome::Swept(_)) => break,
                Err(e) => {
                    tracing::warn!(error = %*e, "Sweeping prefetched code failed");
                    break;
                },
            }
        }
    }

    /// One decision step of the sweep loop.
    pub async fn tick(&self) -> Result<SweepOutcome> {
        let now = unix_millis(self.inner.clock.now());
        let last_write = self.inner.last_write.load(Ordering::SeqCst);
        if now.saturating_sub(last_write) < self.retention_ms() {
            return Ok(SweepOutcome::Rescheduled);
        }
        self.sweep_stale().await.map(SweepOutcome::Swept)
    }

    /// Removes every prefixed entry last written a full retention window ago
    /// or earlier. Entries that can't be read as [`TempCode`] are removed too.
    ///
    /// Returns the number of removed entries.
    pub async fn sweep_stale(&self) -> Result<usize> {
        let now = unix_millis(self.inner.clock.now());
        let retention = self.retention_ms();
        let leftovers: Vec<String> = self
            .inner
            .kv
            .get_all()
            .await
            .or_raise(|| ErrorKind::Storage)?
            .into_iter()
            .filter(|(key, _)| key.starts_with(&self.inner.prefix))
            .filter(|(_, value)| match serde_json::from_value::<TempCode>(value.clone()) {
                Ok(entry) => now.saturating_sub(entry.written_at) >= retention,
                Err(_) => true,
            })
            .map(|(key, _)| key)
            .collect();
        if !leftovers.is_empty() {
            self.inner.kv.remove(&leftovers).await.or_raise(|| ErrorKind::Storage)?;
            tracing::info!(count = leftovers.len(), "Removed leftover prefetched code");
        }
        Ok(leftovers.len())
    }

    fn retention_ms(&self) -> i64 {
        i64::try_from(self.inner.retention.as_millis()).unwrap_or(i64::MAX)
    }
}
