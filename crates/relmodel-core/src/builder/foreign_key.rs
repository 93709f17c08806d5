//! Foreign-key builder.

use crate::error::ModelError;
use crate::metadata::{DeleteBehavior, ForeignKey, ForeignKeyId, Model};
use crate::source::ConfigurationSource;

/// Builder over one foreign key.
pub struct ForeignKeyBuilder<'m> {
    model: &'m mut Model,
    entity: String,
    foreign_key: ForeignKeyId,
}

impl<'m> ForeignKeyBuilder<'m> {
    /// Wrap a foreign key for mutation.
    pub fn new(model: &'m mut Model, entity: &str, foreign_key: ForeignKeyId) -> Self {
        Self {
            model,
            entity: entity.to_string(),
            foreign_key,
        }
    }

    /// Id of the foreign key under construction.
    pub fn id(&self) -> ForeignKeyId {
        self.foreign_key
    }

    /// The foreign key, if it still exists.
    pub fn metadata(&self) -> Option<&ForeignKey> {
        self.model
            .entity_type(&self.entity)
            .and_then(|et| et.foreign_key(self.foreign_key))
    }

    fn foreign_key_mut(&mut self) -> Result<&mut ForeignKey, ModelError> {
        let Self {
            model,
            entity,
            foreign_key,
        } = self;
        model
            .entity_type_mut(entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(entity.clone()))?
            .foreign_key_mut(*foreign_key)
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                entity: entity.clone(),
                foreign_key: *foreign_key,
            })
    }

    /// Probe whether `source` may configure requiredness.
    pub fn can_set_required(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|fk| fk.required.can_set(source))
    }

    /// Configure whether the dependent end is required.
    pub fn is_required(
        &mut self,
        required: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.foreign_key_mut()?.required.set(required, source))
    }

    /// Probe whether `source` may configure uniqueness.
    pub fn can_set_unique(&self, source: ConfigurationSource) -> bool {
        self.metadata().is_some_and(|fk| fk.unique.can_set(source))
    }

    /// Configure whether the foreign key is unique (one-to-one).
    pub fn is_unique(
        &mut self,
        unique: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.foreign_key_mut()?.unique.set(unique, source))
    }

    /// Probe whether `source` may configure the delete behavior.
    pub fn can_set_on_delete(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|fk| fk.on_delete.can_set(source))
    }

    /// Configure what happens to dependents when the principal is deleted.
    pub fn on_delete(
        &mut self,
        behavior: Option<DeleteBehavior>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.foreign_key_mut()?.on_delete.set(behavior, source))
    }

    /// Record that `source` re-declared the foreign key; provenance only
    /// upgrades.
    pub fn update_configuration_source(
        &mut self,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        match self.foreign_key_mut() {
            Ok(fk) => {
                fk.update_configuration_source(source);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}
