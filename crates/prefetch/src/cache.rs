use crate::clock::{SystemClock, unix_millis};
use crate::error::{ErrorKind, Result};
use crate::install::TabId;
use crate::sweep::Sweeper;
use crate::{ClockHandle, DownloaderHandle};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::instrument;
use ucss_config::PrefetchConfig;
use ucss_storage::KvHandle;
use ucss_storage::kv::KeyValueStoreExt;

/// What is parked under a tab's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TempContent {
    /// The download is still in flight.
    Loading,
    /// The downloaded source text.
    Code(String),
}

/// A prefetched code entry, as stored in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempCode {
    /// Unix milliseconds of the last write.
    pub written_at: i64,
    pub content: TempContent,
}

impl TempCode {
    pub fn code(&self) -> Option<&str> {
        match &self.content {
            TempContent::Code(code) => Some(code),
            TempContent::Loading => None,
        }
    }
}

/// Short-lived cache of source text prefetched for a not-yet-opened install
/// page, keyed by browser tab.
///
/// Every entry is removed one retention window after its download finished,
/// successful or not. When constructed with a [`Sweeper`], entries orphaned
/// by a lost removal timer (extension reload, browser exit) are cleaned up in
/// the background as well.
///
/// Cloning is cheap; clones share the same stores and sweeper.
#[derive(Clone)]
pub struct TempCodeCache {
    kv: KvHandle,
    downloader: DownloaderHandle,
    clock: ClockHandle,
    prefix: Arc<str>,
    retention: Duration,
    sweeper: Option<Sweeper>,
}

impl TempCodeCache {
    pub fn new(kv: KvHandle, downloader: DownloaderHandle, clock: ClockHandle, config: &PrefetchConfig) -> Self {
        let sweeper = config
            .sweep
            .then(|| Sweeper::new(kv.clone(), clock.clone(), &config.key_prefix, config.retention()));
        Self {
            kv,
            downloader,
            clock,
            prefix: config.key_prefix.as_str().into(),
            retention: config.retention(),
            sweeper,
        }
    }

    /// Cache using the system clock.
    pub fn from_config(kv: KvHandle, downloader: DownloaderHandle, config: &PrefetchConfig) -> Self {
        Self::new(kv, downloader, Arc::new(SystemClock), config)
    }

    /// The key-value store key for `tab_id`.
    pub fn key(&self, tab_id: TabId) -> String {
        format!("{}{tab_id}", self.prefix)
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn sweeper(&self) -> Option<&Sweeper> {
        self.sweeper.as_ref()
    }

    /// Starts prefetching `url` for `tab_id` in the background.
    ///
    /// Prefetching is a best-effort optimization: the install page can always
    /// download the source itself, so failures are logged and dropped.
    pub fn prefetch_code_for_installation(&self, tab_id: TabId, url: impl Into<String>) -> JoinHandle<()> {
        let cache = self.clone();
        let url = url.into();
        tokio::spawn(async move {
            if let Err(e) = cache.prefetch(tab_id, &url).await {
                tracing::warn!(tab_id, %url, error = %*e, "Prefetching usercss source failed");
            }
        })
    }

    /// Prefetches `url` for `tab_id`, returning once the entry holds the
    /// downloaded code (or the download failed).
    ///
    /// A [`Loading`](TempContent::Loading) placeholder is written while the
    /// download is in flight. Removal of the key is scheduled once the final
    /// write has landed, regardless of the outcome.
    #[instrument(skip(self))]
    pub async fn prefetch(&self, tab_id: TabId, url: &str) -> Result<()> {
        let key = self.key(tab_id);
        let result = self.download_into(&key, url).await;
        self.schedule_removal(key);
        result
    }

    async fn download_into(&self, key: &str, url: &str) -> Result<()> {
        if let Some(sweeper) = &self.sweeper {
            sweeper.touch();
        }
        let placeholder = TempCode {
            written_at: unix_millis(self.clock.now()),
            content: TempContent::Loading,
        };
        let (code, stored) = tokio::join!(self.downloader.download(url), self.kv.set_typed(key, &placeholder));
        stored.or_raise(|| ErrorKind::Storage)?;
        let code = code?;

        if let Some(sweeper) = &self.sweeper {
            sweeper.touch();
        }
        let entry = TempCode {
            written_at: unix_millis(self.clock.now()),
            content: TempContent::Code(code),
        };
        self.kv.set_typed(key, &entry).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(%key, "Prefetched usercss source");
        Ok(())
    }

    /// The entry currently parked for `tab_id`, if any.
    pub async fn get(&self, tab_id: TabId) -> Result<Option<TempCode>> {
        self.kv.get_typed(&self.key(tab_id)).await.or_raise(|| ErrorKind::Storage)
    }

    /// Removes and returns the entry for `tab_id`.
    ///
    /// A [`Loading`](TempContent::Loading) entry is left in place for the
    /// download to complete.
    pub async fn take(&self, tab_id: TabId) -> Result<Option<TempCode>> {
        let entry = self.get(tab_id).await?;
        if entry.as_ref().is_some_and(|entry| entry.code().is_some()) {
            self.kv.remove(&[self.key(tab_id)]).await.or_raise(|| ErrorKind::Storage)?;
        }
        Ok(entry)
    }

    fn schedule_removal(&self, key: String) {
        let kv = self.kv.clone();
        let delay = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = kv.remove(std::slice::from_ref(&key)).await {
                tracing::warn!(%key, error = %*e, "Removing expired prefetched source failed");
            }
        });
    }
}
