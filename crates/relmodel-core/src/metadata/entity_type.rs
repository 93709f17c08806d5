//! Entity type definitions.

use indexmap::IndexMap;
use serde::Serialize;

use super::foreign_key::{ForeignKey, ForeignKeyId};
use super::index::{Index, IndexId};
use super::key::{Key, KeyId};
use super::navigation::Navigation;
use super::property::Property;
use super::skip_navigation::SkipNavigation;
use super::types::TypeShape;
use crate::source::{ConfigurationSource, Tracked};

/// An entity type in the conceptual model.
///
/// Owns its declared properties, navigations, keys, foreign keys, and
/// indexes. The base type is a non-owning name into the model's entity-type
/// map, resolved at access time. Declared-member maps preserve insertion
/// order for enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct EntityType {
    pub(crate) name: String,
    pub(crate) shape: Option<TypeShape>,
    /// Set for association entity types generated to host a many-to-many
    /// relationship; such a type is removed with its last foreign key.
    pub(crate) association: bool,
    pub(crate) configuration_source: ConfigurationSource,
    pub(crate) base_type: Tracked<String>,
    pub(crate) properties: IndexMap<String, Property>,
    pub(crate) navigations: IndexMap<String, Navigation>,
    pub(crate) skip_navigations: IndexMap<String, SkipNavigation>,
    pub(crate) keys: Vec<Key>,
    pub(crate) primary_key: Tracked<KeyId>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
    pub(crate) indexes: Vec<Index>,
}

impl EntityType {
    pub(crate) fn new(
        name: impl Into<String>,
        shape: Option<TypeShape>,
        association: bool,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            name: name.into(),
            shape,
            association,
            configuration_source: source,
            base_type: Tracked::unset(),
            properties: IndexMap::new(),
            navigations: IndexMap::new(),
            skip_navigations: IndexMap::new(),
            keys: Vec::new(),
            primary_key: Tracked::unset(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Entity type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing shape descriptor, if declared.
    pub fn shape(&self) -> Option<&TypeShape> {
        self.shape.as_ref()
    }

    /// Whether this is a generated association entity type.
    pub fn is_association(&self) -> bool {
        self.association
    }

    /// Base type name, if configured.
    pub fn base_type(&self) -> Option<&str> {
        self.base_type.get().map(String::as_str)
    }

    /// Source that configured the base type, if any.
    pub fn base_type_source(&self) -> Option<ConfigurationSource> {
        self.base_type.source()
    }

    /// Get a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Get a declared navigation by name.
    pub fn navigation(&self, name: &str) -> Option<&Navigation> {
        self.navigations.get(name)
    }

    /// Declared navigations in declaration order.
    pub fn navigations(&self) -> impl Iterator<Item = &Navigation> {
        self.navigations.values()
    }

    /// Get a declared skip navigation by name.
    pub fn skip_navigation(&self, name: &str) -> Option<&SkipNavigation> {
        self.skip_navigations.get(name)
    }

    /// Declared skip navigations in declaration order.
    pub fn skip_navigations(&self) -> impl Iterator<Item = &SkipNavigation> {
        self.skip_navigations.values()
    }

    /// Get a declared key by id.
    pub fn key(&self, id: KeyId) -> Option<&Key> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Find a declared key spanning exactly `properties`, in order.
    pub fn find_key(&self, properties: &[&str]) -> Option<&Key> {
        self.keys.iter().find(|k| k.properties == properties)
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter()
    }

    /// Primary key id, if set.
    pub fn primary_key_id(&self) -> Option<KeyId> {
        self.primary_key.get().copied()
    }

    /// Source that configured the primary key, if any.
    pub fn primary_key_source(&self) -> Option<ConfigurationSource> {
        self.primary_key.source()
    }

    /// Resolved primary key, if set.
    pub fn primary_key(&self) -> Option<&Key> {
        self.primary_key_id().and_then(|id| self.key(id))
    }

    /// Get a declared foreign key by id.
    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.id == id)
    }

    /// Find a declared foreign key by dependent properties and principal.
    pub fn find_foreign_key(&self, properties: &[&str], principal: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.properties == properties && fk.principal_entity == principal)
    }

    /// Declared foreign keys in declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.iter()
    }

    /// Get a declared index by id.
    pub fn index(&self, id: IndexId) -> Option<&Index> {
        self.indexes.iter().find(|i| i.id == id)
    }

    /// Find a declared index spanning exactly `properties`, in order.
    pub fn find_index(&self, properties: &[&str]) -> Option<&Index> {
        self.indexes.iter().find(|i| i.properties == properties)
    }

    /// Declared indexes in declaration order.
    pub fn indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter()
    }

    /// Source that created or last upgraded this entity type.
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.configuration_source
    }

    pub(crate) fn update_configuration_source(&mut self, source: ConfigurationSource) {
        self.configuration_source = source.max(Some(self.configuration_source));
    }

    pub(crate) fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    pub(crate) fn navigation_mut(&mut self, name: &str) -> Option<&mut Navigation> {
        self.navigations.get_mut(name)
    }

    pub(crate) fn skip_navigation_mut(&mut self, name: &str) -> Option<&mut SkipNavigation> {
        self.skip_navigations.get_mut(name)
    }

    pub(crate) fn key_mut(&mut self, id: KeyId) -> Option<&mut Key> {
        self.keys.iter_mut().find(|k| k.id == id)
    }

    pub(crate) fn foreign_key_mut(&mut self, id: ForeignKeyId) -> Option<&mut ForeignKey> {
        self.foreign_keys.iter_mut().find(|fk| fk.id == id)
    }

    pub(crate) fn index_mut(&mut self, id: IndexId) -> Option<&mut Index> {
        self.indexes.iter_mut().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ScalarType;
    use crate::source::ConfigurationSource;

    fn sample_entity() -> EntityType {
        let mut et = EntityType::new("User", None, false, ConfigurationSource::Explicit);
        et.properties.insert(
            "id".into(),
            Property::new("id", ScalarType::Uuid, None, ConfigurationSource::Explicit),
        );
        et.properties.insert(
            "email".into(),
            Property::new("email", ScalarType::String, None, ConfigurationSource::Explicit),
        );
        et.keys.push(Key::new(
            KeyId(1),
            vec!["id".into()],
            ConfigurationSource::Explicit,
        ));
        et
    }

    #[test]
    fn test_property_lookup_and_order() {
        let et = sample_entity();
        assert!(et.property("id").is_some());
        assert!(et.property("missing").is_none());
        let names: Vec<_> = et.properties().map(Property::name).collect();
        assert_eq!(names, ["id", "email"]);
    }

    #[test]
    fn test_primary_key_resolves_through_id() {
        let mut et = sample_entity();
        assert!(et.primary_key().is_none());
        et.primary_key
            .set(Some(KeyId(1)), ConfigurationSource::Convention);
        assert_eq!(et.primary_key().unwrap().properties(), ["id"]);
        assert_eq!(
            et.primary_key_source(),
            Some(ConfigurationSource::Convention)
        );
    }

    #[test]
    fn test_find_key_by_properties() {
        let et = sample_entity();
        assert!(et.find_key(&["id"]).is_some());
        assert!(et.find_key(&["email"]).is_none());
    }
}
