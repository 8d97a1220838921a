use crate::vars::VariableSet;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identity assigned to a style by storage.
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleId(pub u64);

/// Why a style is being written to storage.
///
/// Only [`Config`](Self::Config) changes pipeline behaviour: it marks a
/// variables-only update whose variable set must not be overwritten by
/// duplicate reconciliation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Reason {
    #[display("install")]
    Install,
    #[display("update")]
    Update,
    #[display("editSave")]
    EditSave,
    #[display("config")]
    Config,
}

/// Metadata parsed from the `==UserStyle==` block of a usercss document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsercssData {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, rename = "homepageURL", skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(default, rename = "updateURL", skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<String>,
    #[serde(default)]
    pub vars: VariableSet,
}

/// A block of compiled CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub code: String,
}

/// A style record as it travels through the build pipeline.
///
/// Every field is optional because the pipeline receives partial records:
/// new styles have no `id`, metadata-only transfers strip `source_code`, and
/// unresolved styles have no `usercss_data` yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StyleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usercss_data: Option<UsercssData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(default, rename = "updateUrl", skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Style {
    /// A new, unresolved style holding only its source text.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self { source_code: Some(source.into()), ..Default::default() }
    }

    pub fn with_id(mut self, id: StyleId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Whether parsed metadata is attached.
    pub fn is_resolved(&self) -> bool {
        self.usercss_data.is_some()
    }

    /// Layers this (caller-supplied) record over a freshly `parsed` one.
    ///
    /// Fields set on `self` win; anything `self` left unset is taken from
    /// `parsed`. Sections are only inherited when `self` carries none.
    pub fn merged_over(self, parsed: Style) -> Style {
        Style {
            id: self.id.or(parsed.id),
            name: self.name.or(parsed.name),
            enabled: self.enabled.or(parsed.enabled),
            source_code: self.source_code.or(parsed.source_code),
            usercss_data: self.usercss_data.or(parsed.usercss_data),
            reason: self.reason.or(parsed.reason),
            update_url: self.update_url.or(parsed.update_url),
            sections: if self.sections.is_empty() { parsed.sections } else { self.sections },
        }
    }

    /// Variables declared by the parsed metadata, if resolved.
    pub fn vars(&self) -> Option<&VariableSet> {
        self.usercss_data.as_ref().map(|data| &data.vars)
    }

    pub fn vars_mut(&mut self) -> Option<&mut VariableSet> {
        self.usercss_data.as_mut().map(|data| &mut data.vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed() -> Style {
        Style {
            name: Some("Parsed".into()),
            enabled: Some(true),
            source_code: Some("/* normalized */".into()),
            usercss_data: Some(UsercssData { name: "Parsed".into(), namespace: "ns".into(), ..Default::default() }),
            ..Default::default()
        }
    }

    #[test]
    fn test_caller_fields_take_precedence() {
        let caller = Style {
            id: Some(StyleId(4)),
            enabled: Some(false),
            reason: Some(Reason::Update),
            ..Default::default()
        };
        let merged = caller.merged_over(parsed());
        assert_eq!(merged.id, Some(StyleId(4)));
        assert_eq!(merged.enabled, Some(false));
        assert_eq!(merged.reason, Some(Reason::Update));
        // Unset on the caller, so inherited.
        assert_eq!(merged.name.as_deref(), Some("Parsed"));
        assert_eq!(merged.source_code.as_deref(), Some("/* normalized */"));
        assert!(merged.is_resolved());
    }

    #[test]
    fn test_serializes_camel_case() {
        let style = Style {
            id: Some(StyleId(1)),
            source_code: Some("code".into()),
            update_url: Some("https://example.com/a.user.css".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["sourceCode"], "code");
        assert_eq!(json["updateUrl"], "https://example.com/a.user.css");
        assert!(json.get("usercssData").is_none());
        let back: Style = serde_json::from_value(json).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(Reason::Config.to_string(), "config");
        assert_eq!(Reason::EditSave.to_string(), "editSave");
    }
}
