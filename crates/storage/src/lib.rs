//! Storage interfaces consumed by the usercss pipeline.
//!
//! - [`StyleStore`]: persistent storage of installed styles.
//! - [`KeyValueStore`]: a flat, JSON-valued local store (used for the
//!   short-lived prefetched code cache).
//!
//! In-memory implementations of both live behind the `mock` feature.

pub mod error;
pub mod kv;
pub mod style;

pub use crate::kv::KeyValueStore;
pub use crate::style::StyleStore;
use std::sync::Arc;

pub type StoreHandle = Arc<dyn StyleStore + Send + Sync>;
pub type KvHandle = Arc<dyn KeyValueStore + Send + Sync>;
