use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared variables of a usercss style, keyed by variable name.
pub type VariableSet = BTreeMap<String, Var>;

/// The control type a variable was declared with.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    #[display("color")]
    Color,
    #[display("text")]
    Text,
    #[display("checkbox")]
    Checkbox,
    #[display("number")]
    Number,
    #[display("range")]
    Range,
    #[display("select")]
    Select,
}

impl VarKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "color" => Self::Color,
            "text" => Self::Text,
            "checkbox" => Self::Checkbox,
            "number" => Self::Number,
            "range" => Self::Range,
            "select" => Self::Select,
            _ => return None,
        })
    }
}

/// A single `@var` declaration plus the user's chosen value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Var {
    #[serde(rename = "type")]
    pub kind: VarKind,
    pub label: String,
    pub default: String,
    /// Set once the user customizes the variable; `None` means "use default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Var {
    pub fn new(kind: VarKind, label: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            default: default.into(),
            value: None,
            options: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// The effective value: the user's choice, falling back to the default.
    pub fn current(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }
}

/// Copies user-chosen values from `source` into `target`.
///
/// Only variables declared in both sets are touched, and only a value the
/// user actually set is copied: kind, label, default and options stay as
/// `target` declared them. A source variable still on its default leaves the
/// target on its own (possibly newer) default. Variables missing from
/// `target` are never added.
///
/// Returns the number of variables updated.
pub fn assign_vars(target: &mut VariableSet, source: &VariableSet) -> usize {
    let mut assigned = 0;
    for (name, var) in target.iter_mut() {
        if let Some(value) = source.get(name).and_then(|old| old.value.as_ref()) {
            var.value = Some(value.clone());
            assigned += 1;
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn set(vars: &[(&str, Var)]) -> VariableSet {
        vars.iter().map(|(name, var)| (name.to_string(), var.clone())).collect()
    }

    #[test]
    fn test_assign_vars_copies_shared_values_only() {
        let mut fresh = set(&[
            ("accent", Var::new(VarKind::Color, "Accent", "#000000")),
            ("font", Var::new(VarKind::Text, "Font", "serif")),
        ]);
        let old = set(&[
            ("accent", Var::new(VarKind::Color, "Old accent", "#ffffff").with_value("red")),
            ("removed", Var::new(VarKind::Text, "Gone", "x").with_value("y")),
        ]);
        assert_eq!(assign_vars(&mut fresh, &old), 1);

        assert_eq!(fresh["accent"].current(), "red");
        // Declaration metadata is not copied over.
        assert_eq!(fresh["accent"].label, "Accent");
        assert_eq!(fresh["accent"].default, "#000000");
        assert_eq!(fresh["font"].value, None);
        assert_eq!(fresh["font"].current(), "serif");
        assert!(!fresh.contains_key("removed"));
    }

    #[test]
    fn test_assign_vars_keeps_new_default_when_unset() {
        let mut fresh = set(&[("size", Var::new(VarKind::Number, "Size", "12"))]);
        let old = set(&[("size", Var::new(VarKind::Number, "Size", "14"))]);
        assert_eq!(assign_vars(&mut fresh, &old), 0);
        assert_eq!(fresh["size"].value, None);
        assert_eq!(fresh["size"].current(), "12");
    }

    #[test]
    fn test_assign_vars_unset_source_keeps_target_value() {
        let mut fresh = set(&[("size", Var::new(VarKind::Number, "Size", "12").with_value("16"))]);
        let old = set(&[("size", Var::new(VarKind::Number, "Size", "14"))]);
        assign_vars(&mut fresh, &old);
        assert_eq!(fresh["size"].current(), "16");
    }

    #[rstest]
    #[case("color", Some(VarKind::Color))]
    #[case("checkbox", Some(VarKind::Checkbox))]
    #[case("select", Some(VarKind::Select))]
    #[case("dropdown", None)]
    #[case("Color", None)]
    fn test_kind_from_keyword(#[case] keyword: &str, #[case] expected: Option<VarKind>) {
        assert_eq!(VarKind::from_keyword(keyword), expected);
    }

    #[test]
    fn test_var_serializes_kind_as_type() {
        let var = Var::new(VarKind::Select, "Theme", "dark").with_options(["light", "dark"]);
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"][1], "dark");
        assert!(json.get("value").is_none());
    }
}
