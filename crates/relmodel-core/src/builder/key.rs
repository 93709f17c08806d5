//! Key builder.

use crate::error::ModelError;
use crate::metadata::{Key, KeyId, Model};
use crate::source::ConfigurationSource;

/// Builder over one key. Keys have no configurable attributes of their own;
/// the builder upgrades provenance and hands out metadata. Removal goes
/// through the owning [`EntityTypeBuilder`](super::EntityTypeBuilder), which
/// cascades through dependent foreign keys.
pub struct KeyBuilder<'m> {
    model: &'m mut Model,
    entity: String,
    key: KeyId,
}

impl<'m> KeyBuilder<'m> {
    /// Wrap a key for mutation.
    pub fn new(model: &'m mut Model, entity: &str, key: KeyId) -> Self {
        Self {
            model,
            entity: entity.to_string(),
            key,
        }
    }

    /// Id of the key under construction.
    pub fn id(&self) -> KeyId {
        self.key
    }

    /// The key, if it still exists.
    pub fn metadata(&self) -> Option<&Key> {
        self.model
            .entity_type(&self.entity)
            .and_then(|et| et.key(self.key))
    }

    /// Record that `source` re-declared the key; provenance only upgrades.
    pub fn update_configuration_source(
        &mut self,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let Self { model, entity, key } = self;
        let Some(key) = model
            .entity_type_mut(entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(entity.clone()))?
            .key_mut(*key)
        else {
            return Ok(false);
        };
        key.update_configuration_source(source);
        Ok(true)
    }
}
