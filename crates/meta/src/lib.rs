//! Usercss metadata parsing and CSS compilation.
//!
//! The pipeline only talks to the [`Compiler`] trait. [`UsercssCompiler`] is
//! the built-in implementation: it understands the `==UserStyle==` metadata
//! block and the `default` preprocessor (variables are exposed as `:root`
//! custom properties, and `/*[[name]]*/` placeholders are substituted).

mod compile;
mod consts;
pub mod error;
mod parse;

use crate::error::Result;
use async_trait::async_trait;
use tracing::instrument;
use ucss_model::Style;

pub use crate::parse::parse_metadata;

/// The metadata/CSS compiler service.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Parse the metadata block of `source` into an unsaved, resolved
    /// [`Style`] skeleton: `usercss_data`, `source_code`, `name` and
    /// `enabled` are populated.
    ///
    /// Fails with [`MetadataParse`](crate::error::ErrorKind::MetadataParse).
    async fn build_meta(&self, source: &str) -> Result<Style>;

    /// Compile a resolved style into its CSS [`sections`](Style::sections),
    /// using the current variable values.
    ///
    /// Fails with [`Compile`](crate::error::ErrorKind::Compile).
    async fn build_code(&self, style: Style) -> Result<Style>;
}

/// Built-in [`Compiler`] for the `default` usercss preprocessor.
///
/// # Examples
///
/// ```
/// use ucss_meta::{Compiler, UsercssCompiler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = r#"/* ==UserStyle==
/// @name        Dark Mode
/// @namespace   example.com
/// @version     1.0.0
/// @var color   bg "Background" #111111
/// ==/UserStyle== */
/// body { background: var(--bg); }
/// "#;
/// let compiler = UsercssCompiler;
/// let style = compiler.build_meta(source).await?;
/// let style = compiler.build_code(style).await?;
/// assert!(style.sections[0].code.contains("--bg: #111111;"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UsercssCompiler;

#[async_trait]
impl Compiler for UsercssCompiler {
    #[instrument(level = "debug", skip_all, fields(source_size = source.len()))]
    async fn build_meta(&self, source: &str) -> Result<Style> {
        let data = parse_metadata(source)?;
        Ok(Style {
            name: Some(data.name.clone()),
            enabled: Some(true),
            update_url: data.update_url.clone(),
            source_code: Some(source.to_string()),
            usercss_data: Some(data),
            ..Default::default()
        })
    }

    #[instrument(level = "debug", skip_all, fields(id = ?style.id))]
    async fn build_code(&self, style: Style) -> Result<Style> {
        compile::compile(style)
    }
}
