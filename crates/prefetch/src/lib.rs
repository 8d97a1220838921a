//! Prefetching of usercss source for install pages.
//!
//! When the user directly navigates to a `.user.css` URL, the source is
//! downloaded eagerly while the dedicated install page opens. The text is
//! parked in the extension-local [key-value store](ucss_storage::KeyValueStore)
//! under `prefix + tab id` and removed again after a fixed retention window,
//! whether or not the page ever consumed it.
//!
//! - [`TempCodeCache`]: the prefetch itself and delayed removal.
//! - [`Sweeper`]: background removal of entries orphaned when the install page
//!   never opened (e.g. the extension was reloaded in the meantime).
//! - [`InstallPage`]: the entry point that triggers the prefetch and opens the
//!   page next to the requesting tab.

mod cache;
mod clock;
mod download;
pub mod error;
mod install;
mod sweep;

pub use crate::cache::{TempCode, TempCodeCache, TempContent};
pub use crate::clock::{Clock, ManualClock, SystemClock, unix_millis};
pub use crate::download::Downloader;
pub use crate::install::{InstallPage, InstallRequest, OpenUrl, Tab, TabId, TabOpener};
pub use crate::sweep::{SweepOutcome, Sweeper};
use std::sync::Arc;

pub type ClockHandle = Arc<dyn Clock>;
pub type DownloaderHandle = Arc<dyn Downloader>;
pub type OpenerHandle = Arc<dyn TabOpener>;
