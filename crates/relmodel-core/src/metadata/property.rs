//! Property definitions.

use serde::Serialize;

use super::types::{AccessMode, SaveBehavior, ScalarType, ValueConverter, ValueGenerated};
use crate::source::{ConfigurationSource, Tracked};

/// A scalar property declared on an entity type.
///
/// Every configurable attribute is a [`Tracked`] pair; the recorded source is
/// always the highest-precedence source that set the attribute and has not
/// since been cleared. Mutation happens only through
/// [`PropertyBuilder`](crate::builder::PropertyBuilder).
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub(crate) name: String,
    pub(crate) ty: ScalarType,
    /// Nullability of the backing shape member, when the declaring entity
    /// type has a shape and the member exists. Shadow properties have none.
    pub(crate) shape_nullable: Option<bool>,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) nullable: Tracked<bool>,
    pub(crate) field: Tracked<String>,
    pub(crate) access_mode: Tracked<AccessMode>,
    pub(crate) value_generated: Tracked<ValueGenerated>,
    pub(crate) before_save: Tracked<SaveBehavior>,
    pub(crate) after_save: Tracked<SaveBehavior>,
    pub(crate) concurrency_token: Tracked<bool>,
    pub(crate) converter: Tracked<ValueConverter>,
}

impl Property {
    pub(crate) fn new(
        name: impl Into<String>,
        ty: ScalarType,
        shape_nullable: Option<bool>,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            shape_nullable,
            configuration_source: source,
            nullable: Tracked::unset(),
            field: Tracked::unset(),
            access_mode: Tracked::unset(),
            value_generated: Tracked::unset(),
            before_save: Tracked::unset(),
            after_save: Tracked::unset(),
            concurrency_token: Tracked::unset(),
            converter: Tracked::unset(),
        }
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar data type.
    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// Whether the property is a shadow property (no backing shape member).
    pub fn is_shadow(&self) -> bool {
        self.shape_nullable.is_none()
    }

    /// Effective nullability: the configured value, else the shape member's
    /// nullability, else nullable (shadow default).
    pub fn is_nullable(&self) -> bool {
        self.nullable.get_or(self.shape_nullable.unwrap_or(true))
    }

    /// Source that configured nullability, if any.
    pub fn nullability_source(&self) -> Option<ConfigurationSource> {
        self.nullable.source()
    }

    /// Configured backing field member, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.get().map(String::as_str)
    }

    /// Effective access mode.
    pub fn access_mode(&self) -> AccessMode {
        self.access_mode.get_or(AccessMode::Property)
    }

    /// Effective value-generation strategy.
    pub fn value_generated(&self) -> ValueGenerated {
        self.value_generated.get_or(ValueGenerated::Never)
    }

    /// Effective before-save behavior.
    pub fn before_save(&self) -> SaveBehavior {
        self.before_save.get_or(SaveBehavior::Save)
    }

    /// Effective after-save behavior.
    pub fn after_save(&self) -> SaveBehavior {
        self.after_save.get_or(SaveBehavior::Save)
    }

    /// Whether the property participates in concurrency detection.
    pub fn is_concurrency_token(&self) -> bool {
        self.concurrency_token.get_or(false)
    }

    /// Configured value converter, if any.
    pub fn converter(&self) -> Option<&ValueConverter> {
        self.converter.get()
    }

    /// Source that created or last upgraded this property.
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
    fn test_shadow_property_defaults() {
        let prop = Property::new("note", ScalarType::String, None, ConfigurationSource::Convention);
        assert!(prop.is_shadow());
        assert!(prop.is_nullable());
        assert_eq!(prop.nullability_source(), None);
        assert_eq!(prop.access_mode(), AccessMode::Property);
        assert_eq!(prop.value_generated(), ValueGenerated::Never);
        assert!(!prop.is_concurrency_token());
    }

    #[test]
    fn test_shape_member_nullability_default() {
        let prop = Property::new(
            "id",
            ScalarType::Uuid,
            Some(false),
            ConfigurationSource::Explicit,
        );
        assert!(!prop.is_shadow());
        assert!(!prop.is_nullable());
    }

    #[test]
    fn test_configuration_source_only_upgrades() {
        let mut prop =
            Property::new("id", ScalarType::Uuid, None, ConfigurationSource::DataAnnotation);
        prop.update_configuration_source(ConfigurationSource::Convention);
        assert_eq!(
            prop.configuration_source(),
            ConfigurationSource::DataAnnotation
        );
        prop.update_configuration_source(ConfigurationSource::Explicit);
        assert_eq!(prop.configuration_source(), ConfigurationSource::Explicit);
    }
}
