use crate::error::Result;
use crate::find::find_for;
use tracing::instrument;
use ucss_model::{Reason, Style, assign_vars};
use ucss_storage::StyleStore;

/// Carries the user's variable values from `source_of_truth` over to `style`.
///
/// Only values the user set on variables both styles declare are copied.
/// Returns the number of variables updated, zero if either style is
/// unresolved.
pub fn reconcile(style: &mut Style, source_of_truth: &Style) -> usize {
    match (style.vars_mut(), source_of_truth.vars()) {
        (Some(target), Some(source)) => assign_vars(target, source),
        _ => 0,
    }
}

/// Matches a resolved `style` against what is already installed.
///
/// When a duplicate exists the style takes over its id, so installing it
/// replaces the existing record, and keeps the values the user chose for its
/// variables. Variable-only updates (`Reason::Config` with an id) are passed
/// through untouched: their values are the ones being saved.
#[instrument(level = "debug", skip_all, fields(id = ?style.id, reason = ?style.reason))]
pub async fn reconcile_with_duplicate<S: StyleStore + ?Sized>(store: &S, mut style: Style) -> Result<Style> {
    let is_config = style.reason == Some(Reason::Config);
    if is_config && style.id.is_some() {
        return Ok(style);
    }
    let Some(dup) = find_for(store, &style).await? else {
        return Ok(style);
    };
    style.id = dup.id;
    if !is_config {
        let assigned = reconcile(&mut style, &dup);
        tracing::debug!(id = ?style.id, assigned, "Kept variable values of installed style");
    }
    Ok(style)
}
