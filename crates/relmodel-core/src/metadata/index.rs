//! Index definitions.

use std::fmt;

use serde::Serialize;

use crate::source::{ConfigurationSource, Tracked};

/// Identifier of an index within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IndexId(pub(crate) u64);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index#{}", self.0)
    }
}

/// An index over an ordered set of properties.
#[derive(Debug, Clone, Serialize)]
pub struct Index {
    pub(crate) id: IndexId,
    /// Optional user-assigned name; generated indexes stay unnamed.
    pub(crate) name: Option<String>,
    pub(crate) properties: Vec<String>,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) unique: Tracked<bool>,
}

impl Index {
    pub(crate) fn new(
        id: IndexId,
        properties: Vec<String>,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            id,
            name: None,
            properties,
            configuration_source: source,
            unique: Tracked::unset(),
        }
    }

    /// Index id.
    pub fn id(&self) -> IndexId {
        self.id
    }

    /// Optional user-assigned name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Ordered property names the index spans.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Whether the index enforces uniqueness.
    pub fn is_unique(&self) -> bool {
        self.unique.get_or(false)
    }

    /// Source that created or last upgraded this index.
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.configuration_source
    }

    pub(crate) fn update_configuration_source(&mut self, source: ConfigurationSource) {
        self.configuration_source = source.max(Some(self.configuration_source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_defaults() {
        let index = Index::new(
            IndexId(2),
            vec!["author_id".into()],
            ConfigurationSource::Convention,
        );
        assert_eq!(index.id().to_string(), "index#2");
        assert!(index.name().is_none());
        assert!(!index.is_unique());
    }
}
