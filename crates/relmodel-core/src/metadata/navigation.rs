//! Reference navigation definitions.

use serde::Serialize;

use super::foreign_key::ForeignKeyId;
use super::types::AccessMode;
use crate::source::{ConfigurationSource, Tracked};

/// A reference navigation bound to one end of a foreign key.
#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    pub(crate) name: String,
    /// Entity type the navigation points at.
    pub(crate) target: String,
    pub(crate) foreign_key: ForeignKeyId,
    /// Whether the navigation is declared on the dependent end (pointing at
    /// the principal).
    pub(crate) on_dependent: bool,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) eager_loaded: Tracked<bool>,
    pub(crate) field: Tracked<String>,
    pub(crate) access_mode: Tracked<AccessMode>,
}

impl Navigation {
    pub(crate) fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: ForeignKeyId,
        on_dependent: bool,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            foreign_key,
            on_dependent,
            configuration_source: source,
            eager_loaded: Tracked::unset(),
            field: Tracked::unset(),
            access_mode: Tracked::unset(),
        }
    }

    /// Navigation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target entity type name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Foreign key the navigation traverses.
    pub fn foreign_key(&self) -> ForeignKeyId {
        self.foreign_key
    }

    /// Whether the navigation sits on the dependent end.
    pub fn is_on_dependent(&self) -> bool {
        self.on_dependent
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
