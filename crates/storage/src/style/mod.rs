//! Style storage trait and implementations.

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use self::mock::MockStyleStore;
use crate::error::Result;
use async_trait::async_trait;
use ucss_model::{Reason, Style, StyleId};

/// Persistent storage of installed styles.
///
/// Implementations must hand out a consistent snapshot per call; the build
/// pipeline never holds a lock across calls and relies on each [`Style`] being
/// owned by exactly one call chain.
///
/// # Examples
///
/// ```
/// use ucss_model::StyleId;
/// use ucss_storage::{StyleStore, error::{ErrorKind, Result}};
///
/// async fn is_installed(store: &dyn StyleStore, id: StyleId) -> Result<bool> {
///     match store.get(id).await {
///         Ok(_) => Ok(true),
///         Err(e) if matches!(&*e, ErrorKind::NotFound(_)) => Ok(false),
///         Err(e) => Err(e),
///     }
/// }
/// ```
#[async_trait]
pub trait StyleStore: Send + Sync {
    /// Fetch a single style by id.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the id is
    /// unknown.
    async fn get(&self, id: StyleId) -> Result<Style>;

    /// Snapshot of every installed style, in storage order.
    ///
    /// Storage order is stable: callers scanning for the first match (e.g.
    /// duplicate detection) get the same answer for the same contents.
    async fn all_styles(&self) -> Result<Vec<Style>>;

    /// Insert a new style (no `id`) or replace an existing one (with `id`).
    ///
    /// The optional `reason` is recorded on the stored style. Returns the
    /// style as stored, with its `id` assigned. Replacing an unknown id
    /// returns [`NotFound`](crate::error::ErrorKind::NotFound).
    async fn install_style(&self, style: Style, reason: Option<Reason>) -> Result<Style>;

    /// Save a style edited by the user.
    ///
    /// Same storage semantics as [`install_style`](Self::install_style) with
    /// [`Reason::EditSave`].
    async fn edit_save(&self, style: Style) -> Result<Style> {
        self.install_style(style, Some(Reason::EditSave)).await
    }
}
