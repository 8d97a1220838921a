use crate::error::{ErrorKind, Result};
use tracing::instrument;
use ucss_model::{Identity, Style};
use ucss_storage::StyleStore;

/// Looks up a previously installed style.
///
/// [`Identity::ById`] is a direct lookup and fails with
/// [`ErrorKind::NotFound`] for unknown ids. [`Identity::ByNameNamespace`]
/// scans the store in storage order and returns the first style whose
/// metadata matches exactly, so the earliest installed of several lookalikes
/// always wins. Styles without usercss metadata never match.
#[instrument(level = "debug", skip_all, fields(%identity))]
pub async fn find<S: StyleStore + ?Sized>(store: &S, identity: &Identity) -> Result<Option<Style>> {
    let found = match identity {
        Identity::ById(id) => Some(store.get(*id).await.map_err(ErrorKind::storage)?),
        Identity::ByNameNamespace { .. } => store
            .all_styles()
            .await
            .map_err(ErrorKind::storage)?
            .into_iter()
            .find(|style| style.usercss_data.as_ref().is_some_and(|data| identity.matches(data))),
    };
    if let Some(style) = &found {
        tracing::debug!(id = ?style.id, "Found installed style");
    }
    Ok(found)
}

/// [`find`] with the identity derived from `style`; `None` if the style has
/// neither an id nor metadata.
pub async fn find_for<S: StyleStore + ?Sized>(store: &S, style: &Style) -> Result<Option<Style>> {
    match Identity::of(style) {
        Some(identity) => find(store, &identity).await,
        None => Ok(None),
    }
}
