use crate::OpenerHandle;
use crate::cache::TempCodeCache;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use tracing::instrument;
use ucss_config::Config;

pub type TabId = u64;

/// The browser tab an install request originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    /// Position of the tab within its window.
    pub index: u32,
    pub url: Option<String>,
}

/// A request to open the usercss install page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Source URL; defaults to the tab's URL.
    pub url: Option<String>,
    /// The user navigated straight to the `.user.css` file.
    pub direct: bool,
    /// The caller already holds the source text.
    pub downloaded: bool,
    /// Requesting tab; defaults to the message sender's tab.
    pub tab: Option<Tab>,
}

/// Options for opening a new tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenUrl {
    pub url: String,
    pub index: u32,
    pub opener_tab_id: TabId,
    /// `None` leaves the choice of window to the opener.
    pub current_window: Option<bool>,
}

/// Opens URLs in browser tabs.
#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open_url(&self, options: OpenUrl) -> Result<()>;
}

/// Entry point for installing a usercss style from a URL.
pub struct InstallPage {
    cache: TempCodeCache,
    opener: OpenerHandle,
    page: String,
}

impl InstallPage {
    pub fn new(cache: TempCodeCache, opener: OpenerHandle, page: impl Into<String>) -> Self {
        Self { cache, opener, page: page.into() }
    }

    pub fn from_config(cache: TempCodeCache, opener: OpenerHandle, config: &Config) -> Self {
        Self::new(cache, opener, &config.install_page)
    }

    pub fn cache(&self) -> &TempCodeCache {
        &self.cache
    }

    /// Opens the install page right after the requesting tab.
    ///
    /// Direct installs that weren't downloaded yet get their source
    /// prefetched in the background, so the page usually finds it waiting.
    #[instrument(skip_all, fields(direct = request.direct))]
    pub async fn open(&self, request: InstallRequest, sender: Option<&Tab>) -> Result<()> {
        let tab = request
            .tab
            .or_else(|| sender.cloned())
            .ok_or_raise(|| ErrorKind::InvalidRequest("no tab to install from"))?;
        let url = request
            .url
            .or_else(|| tab.url.clone())
            .ok_or_raise(|| ErrorKind::InvalidRequest("no URL to install from"))?;

        if request.direct && !request.downloaded {
            self.cache.prefetch_code_for_installation(tab.id, url.clone());
        }
        let options = OpenUrl {
            url: self.page_url(&url, tab.id, request.direct),
            index: tab.index + 1,
            opener_tab_id: tab.id,
            current_window: None,
        };
        self.opener.open_url(options).await.or_raise(|| ErrorKind::Opener)
    }

    fn page_url(&self, url: &str, tab_id: TabId, direct: bool) -> String {
        let mut page = format!("{}?updateUrl={}&tabId={tab_id}", self.page, urlencoding::encode(url));
        if direct {
            page.push_str("&direct=yes");
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Downloader;
    use crate::clock::ManualClock;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use ucss_storage::kv::MemoryStore;

    const SOURCE_URL: &str = "https://example.com/my style.user.css";

    struct EchoDownloader;

    #[async_trait]
    impl Downloader for EchoDownloader {
        async fn download(&self, url: &str) -> Result<String> {
            Ok(format!("/* {url} */"))
        }
    }

    #[derive(Default)]
    struct RecordingOpener(Mutex<Vec<OpenUrl>>);

    #[async_trait]
    impl TabOpener for RecordingOpener {
        async fn open_url(&self, options: OpenUrl) -> Result<()> {
            self.0.lock().unwrap().push(options);
            Ok(())
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<RecordingOpener>, InstallPage) {
        let kv = Arc::new(MemoryStore::default());
        let opener = Arc::new(RecordingOpener::default());
        let cache = TempCodeCache::new(
            kv.clone(),
            Arc::new(EchoDownloader),
            Arc::new(ManualClock::default()),
            &Config::default().prefetch,
        );
        let page = InstallPage::from_config(cache, opener.clone(), &Config::default());
        (kv, opener, page)
    }

    fn tab() -> Tab {
        Tab { id: 7, index: 2, url: Some(SOURCE_URL.into()) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_install_prefetches_and_opens_page() {
        let (kv, opener, page) = setup();
        let request = InstallRequest { direct: true, tab: Some(tab()), ..Default::default() };
        page.open(request, None).await.unwrap();

        let opened = opener.0.lock().unwrap().clone();
        assert_eq!(
            opened,
            [OpenUrl {
                url: "/install-usercss.html?updateUrl=https%3A%2F%2Fexample.com%2Fmy%20style.user.css&tabId=7&direct=yes"
                    .into(),
                index: 3,
                opener_tab_id: 7,
                current_window: None,
            }]
        );

        // Let the background prefetch finish.
        tokio::time::sleep(Duration::from_millis(1)).await;
        let entry = page.cache().get(7).await.unwrap().unwrap();
        assert_eq!(entry.code(), Some("/* https://example.com/my style.user.css */"));
        assert_eq!(kv.keys().await, ["tempUsercssCode7"]);
    }

    #[rstest]
    #[case::not_direct(false, false)]
    #[case::already_downloaded(true, true)]
    #[tokio::test(start_paused = true)]
    async fn test_no_prefetch(#[case] direct: bool, #[case] downloaded: bool) {
        let (kv, opener, page) = setup();
        let request = InstallRequest { direct, downloaded, ..Default::default() };
        page.open(request, Some(&tab())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(kv.keys().await.is_empty());
        assert_eq!(opener.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_url_overrides_tab_url() {
        let (_kv, opener, page) = setup();
        let request = InstallRequest { url: Some("https://a.b/c.user.css".into()), ..Default::default() };
        page.open(request, Some(&tab())).await.unwrap();
        let opened = opener.0.lock().unwrap()[0].url.clone();
        assert_eq!(opened, "/install-usercss.html?updateUrl=https%3A%2F%2Fa.b%2Fc.user.css&tabId=7");
    }

    #[tokio::test]
    async fn test_missing_tab_is_rejected() {
        let (_kv, opener, page) = setup();
        let err = page.open(InstallRequest::default(), None).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidRequest("no tab to install from"));
        assert!(opener.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected() {
        let (_kv, _opener, page) = setup();
        let sender = Tab { url: None, ..tab() };
        let err = page.open(InstallRequest::default(), Some(&sender)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidRequest("no URL to install from"));
    }
}
