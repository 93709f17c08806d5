//! Model-level builder and the referential-integrity cascade core.

use tracing::debug;

use super::entity_type::EntityTypeBuilder;
use super::reject_opt;
use crate::convention::{self, ModelEvent};
use crate::error::ModelError;
use crate::metadata::{ForeignKeyId, IndexId, KeyId, Model, TypeShape};
use crate::source::ConfigurationSource;

/// Builder over the model root.
pub struct ModelBuilder<'m> {
    model: &'m mut Model,
}

impl<'m> ModelBuilder<'m> {
    /// Wrap a model for mutation.
    pub fn new(model: &'m mut Model) -> Self {
        Self { model }
    }

    /// Read access to the underlying model.
    pub fn model(&self) -> &Model {
        self.model
    }

    /// Run `f` inside a convention batch: change events raised while the
    /// batch is open are deferred and drained, in order, when the outermost
    /// batch closes.
    pub fn batch<R>(
        &mut self,
        f: impl FnOnce(&mut ModelBuilder<'_>) -> Result<R, ModelError>,
    ) -> Result<R, ModelError> {
        convention::batch(self.model, |model| f(&mut ModelBuilder::new(model)))
    }

    /// Get or create a shape-less entity type. An existing entity type's
    /// configuration source is upgraded, never downgraded.
    pub fn entity(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<EntityTypeBuilder<'_>, ModelError> {
        if let Some(et) = self.model.entity_type_mut(name) {
            et.update_configuration_source(source);
            return Ok(EntityTypeBuilder::new(self.model, name));
        }
        self.model.insert_entity_type(name, None, false, source);
        convention::raise(
            self.model,
            ModelEvent::EntityTypeAdded {
                entity: name.to_string(),
            },
        )?;
        Ok(EntityTypeBuilder::new(self.model, name))
    }

    /// Get or create an entity type backed by a shape descriptor. Rejected
    /// when an entity type of the same name already carries a different
    /// shape.
    pub fn entity_with_shape(
        &mut self,
        shape: TypeShape,
        source: ConfigurationSource,
    ) -> Result<Option<EntityTypeBuilder<'_>>, ModelError> {
        let name = shape.name.clone();
        if let Some(et) = self.model.entity_type(&name) {
            match et.shape() {
                Some(existing) if *existing != shape => {
                    return reject_opt(source, || {
                        format!("entity type '{name}' already has a conflicting shape")
                    });
                }
                // Attaching a shape to a shape-less entity type re-grounds
                // every shadow property; only allow it from a source that
                // overrides the type's own.
                None if !source.overrides(Some(et.configuration_source())) => {
                    return Ok(None);
                }
                _ => {}
            }
            if let Some(et) = self.model.entity_type_mut(&name) {
                if et.shape.is_none() {
                    et.shape = Some(shape);
                }
                et.update_configuration_source(source);
            }
            return Ok(Some(EntityTypeBuilder::new(self.model, &name)));
        }
        self.model
            .insert_entity_type(&name, Some(shape), false, source);
        convention::raise(
            self.model,
            ModelEvent::EntityTypeAdded {
                entity: name.clone(),
            },
        )?;
        Ok(Some(EntityTypeBuilder::new(self.model, &name)))
    }

    /// Create an association entity type to host a many-to-many
    /// relationship. Association entity types are removed with their last
    /// foreign key.
    pub fn association_entity(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<EntityTypeBuilder<'_>, ModelError> {
        if self.model.entity_type(name).is_none() {
            self.model.insert_entity_type(name, None, true, source);
            convention::raise(
                self.model,
                ModelEvent::EntityTypeAdded {
                    entity: name.to_string(),
                },
            )?;
        }
        Ok(EntityTypeBuilder::new(self.model, name))
    }

    /// Builder over an existing entity type.
    pub fn find_entity(&mut self, name: &str) -> Option<EntityTypeBuilder<'_>> {
        if self.model.entity_type(name).is_some() {
            Some(EntityTypeBuilder::new(self.model, name))
        } else {
            None
        }
    }

    /// Probe whether `source` may remove the entity type.
    pub fn can_remove_entity_type(&self, name: &str, source: ConfigurationSource) -> bool {
        self.model
            .entity_type(name)
            .is_some_and(|et| source.overrides(Some(et.configuration_source())))
    }

    /// Remove an entity type, eagerly detaching everything that references
    /// it: inbound foreign keys, skip navigations targeting it, and base
    /// type references.
    pub fn remove_entity_type(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        if !self.can_remove_entity_type(name, source) {
            return Ok(false);
        }
        convention::batch(self.model, |model| force_remove_entity_type(model, name))?;
        Ok(true)
    }
}

/// Remove a foreign key with no precedence gate, detaching navigations and
/// skip navigations bound to it. When `collect_association` is set, an
/// association entity type left with no foreign keys is removed as well.
pub(crate) fn remove_foreign_key_core(
    model: &mut Model,
    entity: &str,
    fk_id: ForeignKeyId,
    collect_association: bool,
) -> Result<(), ModelError> {
    let Some(fk) = model.entity_type(entity).and_then(|et| et.foreign_key(fk_id)) else {
        return Ok(());
    };
    let properties = fk.properties().to_vec();

    for (nav_entity, nav_name) in model.navigations_using(fk_id) {
        if let Some(et) = model.entity_type_mut(&nav_entity) {
            et.navigations.shift_remove(&nav_name);
        }
    }

    for (skip_entity, skip_name) in model.skip_navigations_using(fk_id) {
        if let Some(nav) = model
            .entity_type_mut(&skip_entity)
            .and_then(|et| et.skip_navigation_mut(&skip_name))
        {
            nav.foreign_key.force_clear();
        }
        convention::raise(
            model,
            ModelEvent::SkipNavigationForeignKeyChanged {
                entity: skip_entity,
                navigation: skip_name,
                old: Some(fk_id),
                new: None,
            },
        )?;
    }

    if let Some(et) = model.entity_type_mut(entity) {
        et.foreign_keys.retain(|fk| fk.id() != fk_id);
    }
    convention::raise(
        model,
        ModelEvent::ForeignKeyRemoved {
            entity: entity.to_string(),
            foreign_key: fk_id,
            properties,
        },
    )?;

    if collect_association {
        let orphaned = model
            .entity_type(entity)
            .is_some_and(|et| et.is_association() && et.foreign_keys().next().is_none());
        if orphaned {
            debug!(
                target: "relmodel::builder",
                entity,
                "removing association entity type with no remaining foreign keys"
            );
            force_remove_entity_type(model, entity)?;
        }
    }
    Ok(())
}

/// [`remove_foreign_key_core`] with association collection enabled.
pub(crate) fn force_remove_foreign_key(
    model: &mut Model,
    entity: &str,
    fk_id: ForeignKeyId,
) -> Result<(), ModelError> {
    remove_foreign_key_core(model, entity, fk_id, true)
}

/// Remove an entity type with no precedence gate, cascading through every
/// inbound reference.
pub(crate) fn force_remove_entity_type(model: &mut Model, name: &str) -> Result<(), ModelError> {
    if model.entity_type(name).is_none() {
        return Ok(());
    }

    // Inbound foreign keys from dependents elsewhere in the model.
    for (dependent, fk) in model.foreign_keys_targeting(name) {
        if dependent != name {
            force_remove_foreign_key(model, &dependent, fk)?;
        }
    }
    if model.entity_type(name).is_none() {
        // A cascade above already collected this type.
        return Ok(());
    }

    // Own foreign keys; no association collection for the type being removed.
    let own: Vec<ForeignKeyId> = model
        .entity_type(name)
        .map(|et| et.foreign_keys().map(|fk| fk.id()).collect())
        .unwrap_or_default();
    for fk in own {
        remove_foreign_key_core(model, name, fk, false)?;
    }

    // Skip navigations declared elsewhere that target this type.
    for (declaring, nav) in model.skip_navigations_targeting(name) {
        if declaring != name {
            force_remove_skip_navigation(model, &declaring, &nav)?;
        }
    }

    // Inverse pointers on partners of this type's own skip navigations.
    let own_skips: Vec<(String, String, String)> = model
        .entity_type(name)
        .map(|et| {
            et.skip_navigations()
                .filter_map(|nav| {
                    nav.inverse().map(|inv| {
                        (
                            nav.target().to_string(),
                            inv.to_string(),
                            nav.name().to_string(),
                        )
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    for (target, inverse, own_nav) in own_skips {
        let points_back = model
            .entity_type(&target)
            .and_then(|et| et.skip_navigation(&inverse))
            .is_some_and(|nav| nav.inverse() == Some(own_nav.as_str()));
        if points_back {
            if let Some(nav) = model
                .entity_type_mut(&target)
                .and_then(|et| et.skip_navigation_mut(&inverse))
            {
                nav.inverse.force_clear();
            }
            convention::raise(
                model,
                ModelEvent::SkipNavigationInverseChanged {
                    entity: target,
                    navigation: inverse,
                    old: Some(own_nav),
                    new: None,
                },
            )?;
        }
    }

    // Base type references from derived types.
    for derived in model.derived_types(name) {
        if let Some(et) = model.entity_type_mut(&derived) {
            et.base_type.force_clear();
        }
        convention::raise(
            model,
            ModelEvent::BaseTypeChanged {
                entity: derived,
                old: Some(name.to_string()),
                new: None,
            },
        )?;
    }

    model.remove_entity_type_entry(name);
    convention::raise(
        model,
        ModelEvent::EntityTypeRemoved {
            entity: name.to_string(),
        },
    )?;
    Ok(())
}

/// Remove a key with no precedence gate; foreign keys referencing it are
/// removed first.
pub(crate) fn force_remove_key(
    model: &mut Model,
    entity: &str,
    key_id: KeyId,
) -> Result<(), ModelError> {
    let Some(key) = model.entity_type(entity).and_then(|et| et.key(key_id)) else {
        return Ok(());
    };
    let properties = key.properties().to_vec();

    for (dependent, fk) in model.foreign_keys_referencing(key_id) {
        force_remove_foreign_key(model, &dependent, fk)?;
    }
    let Some(et) = model.entity_type(entity) else {
        // A self-referencing cascade collected the declaring type.
        return Ok(());
    };

    if et.primary_key_id() == Some(key_id) {
        if let Some(et) = model.entity_type_mut(entity) {
            et.primary_key.force_clear();
        }
        convention::raise(
            model,
            ModelEvent::PrimaryKeyChanged {
                entity: entity.to_string(),
                old: Some(key_id),
                new: None,
            },
        )?;
    }

    if let Some(et) = model.entity_type_mut(entity) {
        et.keys.retain(|k| k.id() != key_id);
    }
    convention::raise(
        model,
        ModelEvent::KeyRemoved {
            entity: entity.to_string(),
            key: key_id,
            properties,
        },
    )?;
    Ok(())
}

/// Remove an index with no precedence gate.
pub(crate) fn force_remove_index(
    model: &mut Model,
    entity: &str,
    index_id: IndexId,
) -> Result<(), ModelError> {
    let Some(index) = model.entity_type(entity).and_then(|et| et.index(index_id)) else {
        return Ok(());
    };
    let properties = index.properties().to_vec();
    if let Some(et) = model.entity_type_mut(entity) {
        et.indexes.retain(|i| i.id() != index_id);
    }
    convention::raise(
        model,
        ModelEvent::IndexRemoved {
            entity: entity.to_string(),
            index: index_id,
            properties,
        },
    )?;
    Ok(())
}

/// Remove a skip navigation with no precedence gate, clearing a symmetric
/// inverse pointer on the partner.
pub(crate) fn force_remove_skip_navigation(
    model: &mut Model,
    entity: &str,
    nav_name: &str,
) -> Result<(), ModelError> {
    let Some(nav) = model
        .entity_type(entity)
        .and_then(|et| et.skip_navigation(nav_name))
    else {
        return Ok(());
    };
    let target = nav.target().to_string();
    let inverse = nav.inverse().map(str::to_string);

    if let Some(inverse) = inverse {
        let points_back = model
            .entity_type(&target)
            .and_then(|et| et.skip_navigation(&inverse))
            .is_some_and(|other| other.inverse() == Some(nav_name));
        if points_back {
            if let Some(other) = model
                .entity_type_mut(&target)
                .and_then(|et| et.skip_navigation_mut(&inverse))
            {
                other.inverse.force_clear();
            }
            convention::raise(
                model,
                ModelEvent::SkipNavigationInverseChanged {
                    entity: target,
                    navigation: inverse,
                    old: Some(nav_name.to_string()),
                    new: None,
                },
            )?;
        }
    }

    if let Some(et) = model.entity_type_mut(entity) {
        et.skip_navigations.shift_remove(nav_name);
    }
    convention::raise(
        model,
        ModelEvent::SkipNavigationRemoved {
            entity: entity.to_string(),
            navigation: nav_name.to_string(),
        },
    )?;
    Ok(())
}

/// Remove a property with no precedence gate; keys, foreign keys, and
/// indexes spanning it are removed first.
pub(crate) fn force_remove_property(
    model: &mut Model,
    entity: &str,
    property: &str,
) -> Result<(), ModelError> {
    if model
        .entity_type(entity)
        .and_then(|et| et.property(property))
        .is_none()
    {
        return Ok(());
    }

    let keys: Vec<KeyId> = model
        .entity_type(entity)
        .map(|et| {
            et.keys()
                .filter(|k| k.properties().iter().any(|p| p == property))
                .map(|k| k.id())
                .collect()
        })
        .unwrap_or_default();
    for key in keys {
        force_remove_key(model, entity, key)?;
        if model.entity_type(entity).is_none() {
            return Ok(());
        }
    }

    let fks: Vec<ForeignKeyId> = model
        .entity_type(entity)
        .map(|et| {
            et.foreign_keys()
                .filter(|fk| fk.properties().iter().any(|p| p == property))
                .map(|fk| fk.id())
                .collect()
        })
        .unwrap_or_default();
    for fk in fks {
        force_remove_foreign_key(model, entity, fk)?;
        if model.entity_type(entity).is_none() {
            return Ok(());
        }
    }

    let indexes: Vec<IndexId> = model
        .entity_type(entity)
        .map(|et| {
            et.indexes()
                .filter(|i| i.properties().iter().any(|p| p == property))
                .map(|i| i.id())
                .collect()
        })
        .unwrap_or_default();
    for index in indexes {
        force_remove_index(model, entity, index)?;
    }

    if let Some(et) = model.entity_type_mut(entity) {
        et.properties.shift_remove(property);
    }
    convention::raise(
        model,
        ModelEvent::PropertyRemoved {
            entity: entity.to_string(),
            property: property.to_string(),
        },
    )?;
    Ok(())
}
