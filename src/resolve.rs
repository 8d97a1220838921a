use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use tracing::instrument;
use ucss_meta::Compiler;
use ucss_model::Style;

/// Attaches parsed usercss metadata to `style`.
///
/// Already resolved styles are returned untouched. Otherwise the source text
/// is parsed and every field the caller set on `style` is layered over the
/// parsed defaults, except the source itself, which the compiler may
/// normalize.
///
/// # Errors
/// [`ErrorKind::MetadataParse`] if there is no source or it doesn't parse.
#[instrument(level = "debug", skip_all, fields(id = ?style.id))]
pub async fn resolve<C: Compiler + ?Sized>(compiler: &C, mut style: Style) -> Result<Style> {
    if style.is_resolved() {
        return Ok(style);
    }
    let source = style.source_code.take().ok_or_raise(|| ErrorKind::MetadataParse)?;
    let parsed = compiler.build_meta(&source).await.map_err(ErrorKind::meta)?;
    Ok(style.merged_over(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ucss_meta::UsercssCompiler;
    use ucss_meta::error::Result as MetaResult;
    use ucss_model::{Reason, StyleId, UsercssData};

    const SOURCE: &str = "/* ==UserStyle==\n@name Foo\n@namespace bar\n@version 1.0.0\n==/UserStyle== */\na { }\n";

    #[derive(Default)]
    struct CountingCompiler(AtomicUsize);

    #[async_trait]
    impl Compiler for CountingCompiler {
        async fn build_meta(&self, source: &str) -> MetaResult<Style> {
            self.0.fetch_add(1, Ordering::SeqCst);
            UsercssCompiler.build_meta(source).await
        }

        async fn build_code(&self, style: Style) -> MetaResult<Style> {
            UsercssCompiler.build_code(style).await
        }
    }

    #[tokio::test]
    async fn test_resolved_style_is_untouched() {
        let compiler = CountingCompiler::default();
        let style = Style {
            usercss_data: Some(UsercssData { name: "Foo".into(), namespace: "bar".into(), ..Default::default() }),
            source_code: Some("not even usercss".into()),
            ..Default::default()
        };
        let resolved = resolve(&compiler, style.clone()).await.unwrap();
        assert_eq!(resolved, style);
        assert_eq!(compiler.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolving_twice_parses_once() {
        let compiler = CountingCompiler::default();
        let once = resolve(&compiler, Style::from_source(SOURCE)).await.unwrap();
        let twice = resolve(&compiler, once.clone()).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(compiler.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_caller_fields_take_precedence() {
        let style = Style {
            name: Some("Renamed".into()),
            enabled: Some(false),
            ..Style::from_source(SOURCE).with_id(StyleId(3)).with_reason(Reason::Update)
        };
        let resolved = resolve(&UsercssCompiler, style).await.unwrap();
        assert_eq!(resolved.id, Some(StyleId(3)));
        assert_eq!(resolved.name.as_deref(), Some("Renamed"));
        assert_eq!(resolved.enabled, Some(false));
        assert_eq!(resolved.reason, Some(Reason::Update));
        assert_eq!(resolved.source_code.as_deref(), Some(SOURCE));
        assert_eq!(resolved.usercss_data.unwrap().namespace, "bar");
    }

    #[tokio::test]
    async fn test_missing_source() {
        let err = resolve(&UsercssCompiler, Style::default()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::MetadataParse);
    }

    #[tokio::test]
    async fn test_parse_failure_propagates() {
        let err = resolve(&UsercssCompiler, Style::from_source("a { }")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::MetadataParse);
    }
}
