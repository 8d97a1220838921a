use crate::style::{Style, StyleId, UsercssData};
use derive_more::Display;

/// How a previously installed style is recognized as "the same" style.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Storage-assigned id, looked up directly.
    #[display("#{_0}")]
    ById(StyleId),
    /// Natural key taken from the usercss metadata. Matched exactly.
    #[display("{name} ({namespace})")]
    ByNameNamespace { name: String, namespace: String },
}

impl Identity {
    pub fn by_name(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::ByNameNamespace { name: name.into(), namespace: namespace.into() }
    }

    /// Derives the identity of a style: its id when storage assigned one,
    /// otherwise its metadata name and namespace. Returns `None` for a style
    /// that has neither.
    pub fn of(style: &Style) -> Option<Self> {
        match (style.id, &style.usercss_data) {
            (Some(id), _) => Some(Self::ById(id)),
            (None, Some(data)) => Some(data.into()),
            (None, None) => None,
        }
    }

    /// Whether `data` carries this name/namespace pair. Always `false` for
    /// [`ById`](Self::ById).
    pub fn matches(&self, data: &UsercssData) -> bool {
        match self {
            Self::ById(_) => false,
            Self::ByNameNamespace { name, namespace } => data.name == *name && data.namespace == *namespace,
        }
    }
}

impl From<&UsercssData> for Identity {
    fn from(data: &UsercssData) -> Self {
        Self::by_name(&data.name, &data.namespace)
    }
}
