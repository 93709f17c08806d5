//! Key definitions.

use std::fmt;

use serde::Serialize;

use crate::source::ConfigurationSource;

/// Identifier of a key within its model. Non-owning references to keys
/// (foreign keys, the primary-key slot) hold this id and resolve it against
/// the model at access time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyId(pub(crate) u64);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key#{}", self.0)
    }
}

/// A candidate or primary key over an ordered set of properties.
///
/// The properties remain owned by the declaring entity type; the key holds
/// their names.
#[derive(Debug, Clone, Serialize)]
pub struct Key {
    pub(crate) id: KeyId,
    pub(crate) properties: Vec<String>,
    pub(crate) configuration_source: ConfigurationSource,
}

impl Key {
    pub(crate) fn new(
        id: KeyId,
        properties: Vec<String>,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            id,
            properties,
            configuration_source: source,
        }
    }

    /// Key id.
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// Ordered property names the key spans.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Source that created or last upgraded this key.
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
    fn test_key_id_display() {
        assert_eq!(KeyId(3).to_string(), "key#3");
    }

    #[test]
    fn test_key_properties_ordered() {
        let key = Key::new(
            KeyId(1),
            vec!["user_id".into(), "tag_id".into()],
            ConfigurationSource::Convention,
        );
        assert_eq!(key.properties(), ["user_id", "tag_id"]);
    }
}
