use crate::error::{ErrorKind, Result};
use crate::find::find;
use crate::reconcile::reconcile_with_duplicate;
use crate::resolve::resolve;
use exn::OptionExt;
use tracing::instrument;
use ucss_meta::{Compiler, UsercssCompiler};
use ucss_model::{Identity, Reason, Style, StyleId, VariableSet, assign_vars};
use ucss_storage::StoreHandle;

/// Input of [`Usercss::build_for_check`].
#[derive(Debug, Clone, Default)]
pub struct BuildParams {
    pub source_code: String,
    /// Also look up an installed duplicate.
    pub check_dup: bool,
    /// Parse metadata only, skip compilation.
    pub meta_only: bool,
    /// Values to seed the variables with.
    pub vars: Option<VariableSet>,
}

/// Output of [`Usercss::build_for_check`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub style: Style,
    /// Always `None` unless a duplicate check was requested.
    pub dup: Option<Style>,
}

/// The usercss build and install pipeline.
///
/// Every operation owns the [`Style`] it works on; nothing is locked between
/// steps, and the first failing step aborts the operation.
pub struct Usercss<C = UsercssCompiler> {
    store: StoreHandle,
    compiler: C,
}

impl Usercss {
    /// Pipeline using the built-in compiler.
    pub fn with_store(store: StoreHandle) -> Self {
        Self::new(store, UsercssCompiler)
    }
}

impl<C: Compiler> Usercss<C> {
    pub fn new(store: StoreHandle, compiler: C) -> Self {
        Self { store, compiler }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Prepares `style` for display or installation: restores its source from
    /// storage if it was stripped, resolves metadata, reconciles it with an
    /// installed duplicate and compiles it.
    #[instrument(skip_all, fields(id = ?style.id, reason = ?style.reason))]
    pub async fn parse_for_preview(&self, mut style: Style) -> Result<Style> {
        if style.source_code.is_none() {
            let id = style.id.ok_or_raise(|| ErrorKind::InvalidStyle("neither source code nor id"))?;
            let stored = self.store.get(id).await.map_err(ErrorKind::storage)?;
            style.source_code = stored.source_code;
        }
        let style = resolve(&self.compiler, style).await?;
        let style = reconcile_with_duplicate(&*self.store, style).await?;
        self.compile(style).await
    }

    /// Builds `style` and stores it, replacing an installed duplicate.
    #[instrument(skip_all, fields(id = ?style.id))]
    pub async fn install_usercss(&self, style: Style) -> Result<Style> {
        let style = self.parse_for_preview(style).await?;
        let installed = self.store.install_style(style, None).await.map_err(ErrorKind::storage)?;
        tracing::info!(id = ?installed.id, name = ?installed.name, "Installed usercss style");
        Ok(installed)
    }

    /// Builds `style` and stores it as a user edit.
    #[instrument(skip_all, fields(id = ?style.id))]
    pub async fn edit_save_usercss(&self, style: Style) -> Result<Style> {
        let style = self.parse_for_preview(style).await?;
        let saved = self.store.edit_save(style).await.map_err(ErrorKind::storage)?;
        tracing::info!(id = ?saved.id, "Saved edited usercss style");
        Ok(saved)
    }

    /// Replaces the variables of installed style `id` with `vars`, as given,
    /// and rebuilds it. Returns the variables as stored.
    #[instrument(skip(self, vars), fields(count = vars.len()))]
    pub async fn config_usercss_vars(&self, id: StyleId, vars: VariableSet) -> Result<VariableSet> {
        let mut style = self.store.get(id).await.map_err(ErrorKind::storage)?;
        *style.vars_mut().ok_or_raise(|| ErrorKind::InvalidStyle("not a usercss style"))? = vars;
        let style = self.compile(style).await?;
        let stored = self.store.install_style(style, Some(Reason::Config)).await.map_err(ErrorKind::storage)?;
        tracing::info!(%id, "Updated usercss variables");
        stored
            .usercss_data
            .map(|data| data.vars)
            .ok_or_raise(|| ErrorKind::InvalidStyle("store dropped usercss metadata"))
    }

    /// Parses (and unless `meta_only`, compiles) a fresh source, optionally
    /// looking up an installed duplicate at the same time.
    #[instrument(skip_all, fields(check_dup = params.check_dup, meta_only = params.meta_only))]
    pub async fn build_for_check(&self, params: BuildParams) -> Result<BuildOutcome> {
        let BuildParams { source_code, check_dup, meta_only, vars } = params;
        let mut style = self.compiler.build_meta(&source_code).await.map_err(ErrorKind::meta)?;
        if let (Some(target), Some(vars)) = (style.vars_mut(), vars.as_ref()) {
            assign_vars(target, vars);
        }
        let identity = Identity::of(&style);

        let build = async move {
            match meta_only {
                true => Ok(style),
                false => self.compile(style).await,
            }
        };
        let lookup = async {
            match (check_dup, &identity) {
                (true, Some(identity)) => find(&*self.store, identity).await,
                _ => Ok(None),
            }
        };
        let (style, dup) = futures::try_join!(build, lookup)?;
        Ok(BuildOutcome { style, dup })
    }

    /// Looks up an installed style without building anything.
    pub async fn find(&self, identity: &Identity) -> Result<Option<Style>> {
        find(&*self.store, identity).await
    }

    /// Parses the metadata of `source` without compiling it.
    pub async fn build_meta(&self, source: &str) -> Result<Style> {
        let params = BuildParams { source_code: source.to_string(), meta_only: true, ..Default::default() };
        Ok(self.build_for_check(params).await?.style)
    }

    async fn compile(&self, style: Style) -> Result<Style> {
        self.compiler.build_code(style).await.map_err(ErrorKind::meta)
    }
}
