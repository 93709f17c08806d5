//! Property builder: precedence-gated attribute configuration and
//! re-parenting.

use super::model::force_remove_property;
use super::reject;
use crate::convention::{self, ModelEvent};
use crate::error::ModelError;
use crate::metadata::{AccessMode, Model, Property, SaveBehavior, ValueConverter, ValueGenerated};
use crate::source::ConfigurationSource;

/// Builder over one property.
pub struct PropertyBuilder<'m> {
    model: &'m mut Model,
    entity: String,
    property: String,
}

impl<'m> PropertyBuilder<'m> {
    /// Wrap a property for mutation.
    pub fn new(model: &'m mut Model, entity: &str, property: &str) -> Self {
        Self {
            model,
            entity: entity.to_string(),
            property: property.to_string(),
        }
    }

    /// Name of the property under construction.
    pub fn name(&self) -> &str {
        &self.property
    }

    /// The property, if it still exists.
    pub fn metadata(&self) -> Option<&Property> {
        self.model
            .entity_type(&self.entity)
            .and_then(|et| et.property(&self.property))
    }

    fn property(&self) -> Result<&Property, ModelError> {
        self.model
            .entity_type(&self.entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(self.entity.clone()))?
            .property(&self.property)
            .ok_or_else(|| ModelError::PropertyNotFound {
                entity: self.entity.clone(),
                property: self.property.clone(),
            })
    }

    fn property_mut(&mut self) -> Result<&mut Property, ModelError> {
        let Self {
            model,
            entity,
            property,
        } = self;
        model
            .entity_type_mut(entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(entity.clone()))?
            .property_mut(property)
            .ok_or_else(|| ModelError::PropertyNotFound {
                entity: entity.clone(),
                property: property.clone(),
            })
    }

    /// Probe whether `source` may configure requiredness to `required`.
    pub fn can_set_required(&self, required: Option<bool>, source: ConfigurationSource) -> bool {
        let Some(property) = self.metadata() else {
            return false;
        };
        if !property.nullable.can_set(source) {
            return false;
        }
        !matches!(required, Some(false) if property.shape_nullable == Some(false))
    }

    /// Configure whether the property is required (`Some(true)`), optional
    /// (`Some(false)`), or reverts to its shape default (`None`). Making a
    /// property optional against a non-nullable shape member is invalid.
    pub fn is_required(
        &mut self,
        required: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let property = self.property()?;
        if required == Some(false) && property.shape_nullable == Some(false) {
            return reject(source, || {
                format!(
                    "property '{}' on entity type '{}' is backed by a non-nullable member and cannot be optional",
                    self.property, self.entity
                )
            });
        }
        let old = property.is_nullable();
        let applied = self
            .property_mut()?
            .nullable
            .set(required.map(|required| !required), source);
        if !applied {
            return Ok(false);
        }
        let new = self.property()?.is_nullable();
        if new != old {
            convention::raise(
                self.model,
                ModelEvent::PropertyNullabilityChanged {
                    entity: self.entity.clone(),
                    property: self.property.clone(),
                    old,
                    new,
                },
            )?;
        }
        Ok(true)
    }

    /// Probe whether `source` may associate the backing field.
    pub fn can_set_field(&self, field: Option<&str>, source: ConfigurationSource) -> bool {
        let Some(property) = self.metadata() else {
            return false;
        };
        if !property.field.can_set(source) {
            return false;
        }
        match field {
            Some(field) => self.field_incompatibility(field).is_none(),
            None => true,
        }
    }

    /// Associate a backing field member with the property, validating name
    /// and type compatibility against the declaring entity type's shape.
    pub fn has_field(
        &mut self,
        field: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        self.property()?;
        if let Some(field) = field {
            if let Some(message) = self.field_incompatibility(field) {
                return reject(source, || message);
            }
        }
        Ok(self
            .property_mut()?
            .field
            .set(field.map(str::to_string), source))
    }

    /// Probe whether `source` may configure the access mode.
    pub fn can_set_access_mode(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|p| p.access_mode.can_set(source))
    }

    /// Configure how the property is read and written.
    pub fn access_mode(
        &mut self,
        mode: Option<AccessMode>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.access_mode.set(mode, source))
    }

    /// Probe whether `source` may configure value generation.
    pub fn can_set_value_generated(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|p| p.value_generated.can_set(source))
    }

    /// Configure when the store generates the property's value.
    pub fn value_generated(
        &mut self,
        generated: Option<ValueGenerated>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.value_generated.set(generated, source))
    }

    /// Probe whether `source` may configure the before-save behavior.
    pub fn can_set_before_save(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|p| p.before_save.can_set(source))
    }

    /// Configure how a configured value is treated on insert.
    pub fn before_save(
        &mut self,
        behavior: Option<SaveBehavior>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.before_save.set(behavior, source))
    }

    /// Probe whether `source` may configure the after-save behavior.
    pub fn can_set_after_save(&self, source: ConfigurationSource) -> bool {
        self.metadata().is_some_and(|p| p.after_save.can_set(source))
    }

    /// Configure how a configured value is treated on update.
    pub fn after_save(
        &mut self,
        behavior: Option<SaveBehavior>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.after_save.set(behavior, source))
    }

    /// Probe whether `source` may configure the concurrency-token flag.
    pub fn can_set_concurrency_token(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|p| p.concurrency_token.can_set(source))
    }

    /// Configure whether the property participates in concurrency detection.
    pub fn concurrency_token(
        &mut self,
        token: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.concurrency_token.set(token, source))
    }

    /// Probe whether `source` may configure the value converter.
    pub fn can_set_converter(&self, source: ConfigurationSource) -> bool {
        self.metadata().is_some_and(|p| p.converter.can_set(source))
    }

    /// Configure a value conversion to a store representation.
    pub fn has_converter(
        &mut self,
        converter: Option<ValueConverter>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.property_mut()?.converter.set(converter, source))
    }

    /// Re-parent the property onto `target`, preserving per-attribute
    /// configuration sources: each recorded (attribute, source) pair is
    /// replayed onto the new definition, attributes never recorded stay at
    /// their defaults, and attributes the new owner's shape cannot honor are
    /// dropped. The old declaration and everything spanning it are removed.
    pub fn attach(&mut self, target: &str) -> Result<Option<PropertyBuilder<'_>>, ModelError> {
        let property = self.property()?.clone();
        let Some(target_et) = self.model.entity_type(target) else {
            return Err(ModelError::EntityTypeNotFound(target.to_string()));
        };
        if target_et.property(&property.name).is_some() {
            return Ok(None);
        }
        let target_shape_nullable = match target_et.shape().and_then(|s| s.member(&property.name)) {
            Some(member) if member.ty != property.ty => return Ok(None),
            Some(member) => Some(member.nullable),
            None => None,
        };

        let name = property.name.clone();
        let old_entity = self.entity.clone();
        convention::batch(self.model, |model| {
            let mut fresh =
                Property::new(&name, property.ty, target_shape_nullable, property.configuration_source);
            if let Some((value, source)) = property.nullable.recorded() {
                if !(target_shape_nullable == Some(false) && *value) {
                    fresh.nullable.set(Some(*value), source);
                }
            }
            if let Some((field, source)) = property.field.recorded() {
                let honored = match model.entity_type(target).and_then(|et| et.shape()) {
                    Some(shape) => shape
                        .member(field)
                        .is_some_and(|m| m.ty == property.ty && (m.nullable || !fresh.is_nullable())),
                    None => true,
                };
                if honored {
                    fresh.field.set(Some(field.clone()), source);
                }
            }
            if let Some((value, source)) = property.access_mode.recorded() {
                fresh.access_mode.set(Some(*value), source);
            }
            if let Some((value, source)) = property.value_generated.recorded() {
                fresh.value_generated.set(Some(*value), source);
            }
            if let Some((value, source)) = property.before_save.recorded() {
                fresh.before_save.set(Some(*value), source);
            }
            if let Some((value, source)) = property.after_save.recorded() {
                fresh.after_save.set(Some(*value), source);
            }
            if let Some((value, source)) = property.concurrency_token.recorded() {
                fresh.concurrency_token.set(Some(*value), source);
            }
            if let Some((value, source)) = property.converter.recorded() {
                fresh.converter.set(Some(value.clone()), source);
            }

            if let Some(et) = model.entity_type_mut(target) {
                et.properties.insert(name.clone(), fresh);
            }
            convention::raise(
                model,
                ModelEvent::PropertyAdded {
                    entity: target.to_string(),
                    property: name.clone(),
                },
            )?;
            force_remove_property(model, &old_entity, &name)
        })?;
        Ok(Some(PropertyBuilder::new(self.model, target, &self.property)))
    }

    fn field_incompatibility(&self, field: &str) -> Option<String> {
        let et = self.model.entity_type(&self.entity)?;
        let property = et.property(&self.property)?;
        let shape = et.shape()?;
        let Some(member) = shape.member(field) else {
            return Some(format!(
                "entity type '{}' has no shape member named '{field}'",
                self.entity
            ));
        };
        if member.ty != property.scalar_type() {
            return Some(format!(
                "shape member '{field}' on entity type '{}' does not match the type of property '{}'",
                self.entity, self.property
            ));
        }
        if !member.nullable && property.is_nullable() {
            return Some(format!(
                "shape member '{field}' on entity type '{}' is non-nullable and cannot back optional property '{}'",
                self.entity, self.property
            ));
        }
        None
    }
}
