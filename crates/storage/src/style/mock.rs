//! In-memory style store for testing.

use crate::StyleStore;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use ucss_model::{Reason, Style, StyleId};

/// In-memory style store for testing.
///
/// Styles are kept in insertion order in a `Vec` behind a [`RwLock`], so all
/// trait methods can operate on `&self` without external synchronisation and
/// [`all_styles`](StyleStore::all_styles) is deterministic. Ids are assigned
/// sequentially starting at 1.
///
/// # Examples
///
/// ```
/// use ucss_model::Style;
/// use ucss_storage::StyleStore;
/// use ucss_storage::style::MockStyleStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStyleStore::default();
/// let installed = store.install_style(Style::from_source("..."), None).await?;
/// assert!(installed.id.is_some());
/// assert_eq!(store.all_styles().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockStyleStore {
    storage: RwLock<(u64, Vec<Style>)>,
}

impl MockStyleStore {
    /// Create a mock store pre-populated with styles.
    ///
    /// Styles without an id get the next sequential id; styles with one keep
    /// it (and bump the sequence past it).
    pub fn with_styles(styles: impl IntoIterator<Item = Style>) -> Self {
        let mut last_id = 0;
        let mut list = Vec::new();
        for mut style in styles {
            let id = style.id.map_or(last_id + 1, |id| id.0);
            last_id = last_id.max(id);
            style.id = Some(StyleId(id));
            list.push(style);
        }
        Self { storage: RwLock::new((last_id, list)) }
    }

    /// Number of stored styles.
    pub async fn len(&self) -> usize {
        self.storage.read().await.1.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StyleStore for MockStyleStore {
    async fn get(&self, id: StyleId) -> Result<Style> {
        let guard = self.storage.read().await;
        guard
            .1
            .iter()
            .find(|style| style.id == Some(id))
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(id)))
    }

    async fn all_styles(&self) -> Result<Vec<Style>> {
        Ok(self.storage.read().await.1.clone())
    }

    async fn install_style(&self, mut style: Style, reason: Option<Reason>) -> Result<Style> {
        if reason.is_some() {
            style.reason = reason;
        }
        let mut guard = self.storage.write().await;
        let (last_id, list) = &mut *guard;
        match style.id {
            Some(id) => {
                let slot = list
                    .iter_mut()
                    .find(|existing| existing.id == Some(id))
                    .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(id)))?;
                *slot = style.clone();
                tracing::debug!(%id, "Replaced stored style");
            },
            None => {
                *last_id += 1;
                style.id = Some(StyleId(*last_id));
                list.push(style.clone());
                tracing::debug!(id = *last_id, "Inserted new style");
            },
        }
        Ok(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_assigns_sequential_ids() {
        let store = MockStyleStore::default();
        let a = store.install_style(Style::from_source("a"), None).await.unwrap();
        let b = store.install_style(Style::from_source("b"), None).await.unwrap();
        assert_eq!(a.id, Some(StyleId(1)));
        assert_eq!(b.id, Some(StyleId(2)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_install_with_id_replaces_in_place() {
        let store = MockStyleStore::with_styles([Style::from_source("a"), Style::from_source("b")]);
        let updated = Style::from_source("a2").with_id(StyleId(1));
        store.install_style(updated, Some(Reason::Config)).await.unwrap();

        let all = store.all_styles().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].source_code.as_deref(), Some("a2"));
        assert_eq!(all[0].reason, Some(Reason::Config));
        assert_eq!(all[1].source_code.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let store = MockStyleStore::default();
        let err = store.get(StyleId(7)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(StyleId(7))));
    }

    #[tokio::test]
    async fn test_install_unknown_id_not_found() {
        let store = MockStyleStore::default();
        let err = store.install_style(Style::default().with_id(StyleId(3)), None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(StyleId(3))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_with_styles_keeps_explicit_ids() {
        let store = MockStyleStore::with_styles([Style::default().with_id(StyleId(10)), Style::default()]);
        let ids: Vec<_> = store.all_styles().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, [Some(StyleId(10)), Some(StyleId(11))]);
    }

    #[tokio::test]
    async fn test_edit_save_tags_reason() {
        let store = MockStyleStore::with_styles([Style::default()]);
        let saved = store.edit_save(Style::from_source("edited").with_id(StyleId(1))).await.unwrap();
        assert_eq!(saved.reason, Some(Reason::EditSave));
        assert_eq!(store.get(StyleId(1)).await.unwrap().source_code.as_deref(), Some("edited"));
    }
}
