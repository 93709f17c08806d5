//! Foreign key definitions.

use std::fmt;

use serde::Serialize;

use super::key::KeyId;
use super::types::DeleteBehavior;
use crate::source::{ConfigurationSource, Tracked};

/// Identifier of a foreign key within its model. Navigations and skip
/// navigations reference foreign keys by id and resolve them against the
/// model at access time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ForeignKeyId(pub(crate) u64);

impl fmt::Display for ForeignKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fk#{}", self.0)
    }
}

/// A foreign key from the declaring (dependent) entity type into a principal
/// key.
///
/// The dependent properties remain owned by the declaring entity type; the
/// principal entity type and key are referenced by name and id.
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKey {
    pub(crate) id: ForeignKeyId,
    pub(crate) properties: Vec<String>,
    pub(crate) principal_entity: String,
    pub(crate) principal_key: KeyId,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) required: Tracked<bool>,
    pub(crate) unique: Tracked<bool>,
    pub(crate) on_delete: Tracked<DeleteBehavior>,
}

impl ForeignKey {
    pub(crate) fn new(
        id: ForeignKeyId,
        properties: Vec<String>,
        principal_entity: impl Into<String>,
        principal_key: KeyId,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            id,
            properties,
            principal_entity: principal_entity.into(),
            principal_key,
            configuration_source: source,
            required: Tracked::unset(),
            unique: Tracked::unset(),
            on_delete: Tracked::unset(),
        }
    }

    /// Foreign key id.
    pub fn id(&self) -> ForeignKeyId {
        self.id
    }

    /// Ordered dependent-end property names.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Principal entity type name.
    pub fn principal_entity(&self) -> &str {
        &self.principal_entity
    }

    /// Principal key id.
    pub fn principal_key(&self) -> KeyId {
        self.principal_key
    }

    /// Whether the dependent end is required.
    pub fn is_required(&self) -> bool {
        self.required.get_or(false)
    }

    /// Whether the foreign key is unique (one-to-one).
    pub fn is_unique(&self) -> bool {
        self.unique.get_or(false)
    }

    /// Effective delete behavior.
    pub fn on_delete(&self) -> DeleteBehavior {
        self.on_delete.get_or(DeleteBehavior::Restrict)
    }

    /// Source that created or last upgraded this foreign key.
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
    fn test_foreign_key_id_display() {
        assert_eq!(ForeignKeyId(7).to_string(), "fk#7");
    }

    #[test]
    fn test_foreign_key_defaults() {
        let fk = ForeignKey::new(
            ForeignKeyId(1),
            vec!["author_id".into()],
            "User",
            KeyId(1),
            ConfigurationSource::Convention,
        );
        assert!(!fk.is_required());
        assert!(!fk.is_unique());
        assert_eq!(fk.on_delete(), DeleteBehavior::Restrict);
        assert_eq!(fk.principal_entity(), "User");
    }
}
