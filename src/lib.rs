//! Build, de-duplicate and install usercss styles.
//!
//! A usercss style is CSS with an `==UserStyle==` metadata block declaring its
//! name, namespace and user-configurable variables. [`Usercss`] drives the
//! pipeline around a [`Compiler`] and a [`StyleStore`](ucss_storage::StyleStore):
//!
//! 1. [`resolve`] parses the metadata block (once).
//! 2. [`find`] looks up an installed duplicate by id or by name and namespace.
//! 3. [`reconcile_with_duplicate`] lets the new version take over the
//!    duplicate's id and the values the user chose for its variables.
//! 4. The compiler turns the style into CSS sections, which are stored.
//!
//! Prefetching of usercss source for install pages lives in [`prefetch`],
//! layered configuration in [`config`].

mod build;
pub mod error;
mod find;
mod reconcile;
mod resolve;

pub use crate::build::{BuildOutcome, BuildParams, Usercss};
pub use crate::find::{find, find_for};
pub use crate::reconcile::{reconcile, reconcile_with_duplicate};
pub use crate::resolve::resolve;
pub use ucss_config as config;
pub use ucss_meta::{Compiler, UsercssCompiler};
pub use ucss_model as model;
pub use ucss_prefetch as prefetch;
pub use ucss_storage as storage;
