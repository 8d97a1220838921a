use crate::error::Result;
use async_trait::async_trait;

/// Fetches the source text behind a URL.
///
/// Implementations apply their own timeouts; failures should be raised as
/// [`Network`](crate::error::ErrorKind::Network).
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<String>;
}
