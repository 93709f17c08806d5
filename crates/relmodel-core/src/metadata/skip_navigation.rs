//! Skip navigation definitions.

use serde::Serialize;

use super::foreign_key::ForeignKeyId;
use super::types::AccessMode;
use crate::source::{ConfigurationSource, Tracked};

/// A many-to-many endpoint that skips over the intermediate association
/// entity type.
///
/// The inverse is the navigation name on the target entity type; the foreign
/// key points from the association entity type back to the declaring one.
/// Both are non-owning and resolved against the model at access time. A
/// fully resolved many-to-many relationship has both endpoints' foreign keys
/// landing in the same association entity type with a symmetric inverse.
#[derive(Debug, Clone, Serialize)]
pub struct SkipNavigation {
    pub(crate) name: String,
    pub(crate) declaring_entity: String,
    pub(crate) target: String,
    pub(crate) collection: bool,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) inverse: Tracked<String>,
    pub(crate) foreign_key: Tracked<ForeignKeyId>,
    pub(crate) eager_loaded: Tracked<bool>,
    pub(crate) field: Tracked<String>,
    pub(crate) access_mode: Tracked<AccessMode>,
}

impl SkipNavigation {
    pub(crate) fn new(
        name: impl Into<String>,
        declaring_entity: impl Into<String>,
        target: impl Into<String>,
        collection: bool,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_entity: declaring_entity.into(),
            target: target.into(),
            collection,
            configuration_source: source,
            inverse: Tracked::unset(),
            foreign_key: Tracked::unset(),
            eager_loaded: Tracked::unset(),
            field: Tracked::unset(),
            access_mode: Tracked::unset(),
        }
    }

    /// Navigation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaring entity type name.
    pub fn declaring_entity(&self) -> &str {
        &self.declaring_entity
    }

    /// Target entity type name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the navigation holds a collection.
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    /// Inverse skip navigation name on the target entity type, if set.
    pub fn inverse(&self) -> Option<&str> {
        self.inverse.get().map(String::as_str)
    }

    /// Foreign key into the association entity type, if assigned.
    pub fn foreign_key(&self) -> Option<ForeignKeyId> {
        self.foreign_key.get().copied()
    }

    /// Whether the navigation is loaded eagerly.
    pub fn is_eager_loaded(&self) -> bool {
        self.eager_loaded.get_or(false)
    }

    /// Configured backing field member, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.get().map(String::as_str)
    }

    /// Effective access mode.
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode.get_or(AccessMode::Property)
    }

    /// Source that created or last upgraded this navigation.
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.configuration_source
    }

    pub(crate) fn update_configuration_source(&mut self, source: ConfigurationSource) {
        self.configuration_source = source.max(Some(self.configuration_source));
    }
}
