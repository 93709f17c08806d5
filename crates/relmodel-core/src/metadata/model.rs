//! The model root: owner of all entity types and the convention dispatcher.

use indexmap::IndexMap;
use serde::Serialize;

use super::entity_type::EntityType;
use super::foreign_key::{ForeignKey, ForeignKeyId};
use super::key::{Key, KeyId};
use super::property::Property;
use super::types::TypeShape;
use crate::convention::{ConventionDispatcher, ConventionSet};
use crate::error::ModelError;
use crate::source::ConfigurationSource;

/// Tunables for model building.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    max_identifier_length: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_identifier_length: 128,
        }
    }
}

impl ModelConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap generated identifiers (entity type and property names) at
    /// `max_len` bytes.
    pub fn with_max_identifier_length(mut self, max_len: usize) -> Self {
        self.max_identifier_length = max_len;
        self
    }

    /// Maximum length of generated identifiers.
    pub fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }
}

/// The root container of the conceptual model.
///
/// Owns every entity type by name and the convention dispatcher, whose
/// lifetime is tied to the model's own. All cross-references inside the
/// graph are names or ids resolved against this container at access time.
/// The model is mutated only through [`ModelBuilder`](crate::builder::ModelBuilder)
/// and the builders reachable from it.
#[derive(Debug)]
pub struct Model {
    pub(crate) config: ModelConfig,
    pub(crate) entity_types: IndexMap<String, EntityType>,
    pub(crate) dispatcher: ConventionDispatcher,
    next_key: u64,
    next_foreign_key: u64,
    next_index: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a model with the standard convention set and default config.
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    /// Create a model with the standard convention set.
    pub fn with_config(config: ModelConfig) -> Self {
        Self::with_conventions(config, ConventionSet::standard())
    }

    /// Create a model with a custom convention set.
    pub fn with_conventions(config: ModelConfig, conventions: ConventionSet) -> Self {
        Self {
            config,
            entity_types: IndexMap::new(),
            dispatcher: ConventionDispatcher::new(conventions),
            next_key: 0,
            next_foreign_key: 0,
            next_index: 0,
        }
    }

    /// Model config.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The model's convention dispatcher.
    pub fn dispatcher(&self) -> &ConventionDispatcher {
        &self.dispatcher
    }

    /// Get an entity type by name.
    pub fn entity_type(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.get(name)
    }

    /// Entity types in creation order.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entity_types.values()
    }

    /// All entity type names.
    pub fn entity_type_names(&self) -> Vec<&str> {
        self.entity_types.keys().map(String::as_str).collect()
    }

    /// Find a property declared on `entity` or inherited from its base
    /// chain.
    pub fn find_property(&self, entity: &str, property: &str) -> Option<&Property> {
        let mut current = self.entity_type(entity)?;
        let mut hops = 0usize;
        loop {
            if let Some(prop) = current.property(property) {
                return Some(prop);
            }
            let base = current.base_type()?;
            current = self.entity_type(base)?;
            hops += 1;
            if hops > self.entity_types.len() {
                // Defensive bound; the builders reject base-type cycles.
                return None;
            }
        }
    }

    /// Find a key anywhere in the model.
    pub fn find_key(&self, id: KeyId) -> Option<(&EntityType, &Key)> {
        self.entity_types
            .values()
            .find_map(|et| et.key(id).map(|k| (et, k)))
    }

    /// Find a foreign key anywhere in the model.
    pub fn find_foreign_key(&self, id: ForeignKeyId) -> Option<(&EntityType, &ForeignKey)> {
        self.entity_types
            .values()
            .find_map(|et| et.foreign_key(id).map(|fk| (et, fk)))
    }

    /// All foreign keys referencing the given principal key, as
    /// (declaring entity, foreign key id) pairs.
    pub fn foreign_keys_referencing(&self, key: KeyId) -> Vec<(String, ForeignKeyId)> {
        self.entity_types
            .values()
            .flat_map(|et| {
                et.foreign_keys()
                    .filter(|fk| fk.principal_key() == key)
                    .map(|fk| (et.name().to_string(), fk.id()))
            })
            .collect()
    }

    /// All foreign keys whose principal is the given entity type.
    pub fn foreign_keys_targeting(&self, entity: &str) -> Vec<(String, ForeignKeyId)> {
        self.entity_types
            .values()
            .flat_map(|et| {
                et.foreign_keys()
                    .filter(|fk| fk.principal_entity() == entity)
                    .map(|fk| (et.name().to_string(), fk.id()))
            })
            .collect()
    }

    /// All skip navigations whose assigned foreign key is `fk`, as
    /// (declaring entity, navigation name) pairs.
    pub fn skip_navigations_using(&self, fk: ForeignKeyId) -> Vec<(String, String)> {
        self.entity_types
            .values()
            .flat_map(|et| {
                et.skip_navigations()
                    .filter(move |nav| nav.foreign_key() == Some(fk))
                    .map(|nav| (nav.declaring_entity().to_string(), nav.name().to_string()))
            })
            .collect()
    }

    /// All skip navigations targeting the given entity type.
    pub fn skip_navigations_targeting(&self, entity: &str) -> Vec<(String, String)> {
        self.entity_types
            .values()
            .flat_map(|et| {
                et.skip_navigations()
                    .filter(|nav| nav.target() == entity)
                    .map(|nav| (nav.declaring_entity().to_string(), nav.name().to_string()))
            })
            .collect()
    }

    /// All navigations traversing the given foreign key, as
    /// (declaring entity, navigation name) pairs.
    pub fn navigations_using(&self, fk: ForeignKeyId) -> Vec<(String, String)> {
        self.entity_types
            .values()
            .flat_map(|et| {
                et.navigations()
                    .filter(move |nav| nav.foreign_key() == fk)
                    .map(|nav| (et.name().to_string(), nav.name().to_string()))
            })
            .collect()
    }

    /// All entity types whose configured base type is `entity`.
    pub fn derived_types(&self, entity: &str) -> Vec<String> {
        self.entity_types
            .values()
            .filter(|et| et.base_type() == Some(entity))
            .map(|et| et.name().to_string())
            .collect()
    }

    /// Read-only serializable view of the model graph.
    pub fn snapshot(&self) -> ModelSnapshot<'_> {
        ModelSnapshot {
            entity_types: self.entity_types.values().collect(),
        }
    }

    /// Serialize the model graph to JSON for diagnostics.
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| ModelError::Serialization(e.to_string()))
    }

    pub(crate) fn entity_type_mut(&mut self, name: &str) -> Option<&mut EntityType> {
        self.entity_types.get_mut(name)
    }

    pub(crate) fn insert_entity_type(
        &mut self,
        name: &str,
        shape: Option<TypeShape>,
        association: bool,
        source: ConfigurationSource,
    ) -> &mut EntityType {
        self.entity_types
            .entry(name.to_string())
            .or_insert_with(|| EntityType::new(name, shape, association, source))
    }

    pub(crate) fn remove_entity_type_entry(&mut self, name: &str) -> Option<EntityType> {
        self.entity_types.shift_remove(name)
    }

    pub(crate) fn next_key_id(&mut self) -> KeyId {
        self.next_key += 1;
        KeyId(self.next_key)
    }

    pub(crate) fn next_foreign_key_id(&mut self) -> ForeignKeyId {
        self.next_foreign_key += 1;
        ForeignKeyId(self.next_foreign_key)
    }

    pub(crate) fn next_index_id(&mut self) -> super::index::IndexId {
        self.next_index += 1;
        super::index::IndexId(self.next_index)
    }
}

/// Read-only serializable view of a model, for logging and introspection.
#[derive(Debug, Serialize)]
pub struct ModelSnapshot<'a> {
    /// Entity types in creation order.
    pub entity_types: Vec<&'a EntityType>,
}
