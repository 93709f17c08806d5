//! Skip-navigation builder: inverse pairing, foreign-key assignment, and
//! re-parenting.

use super::model::force_remove_skip_navigation;
use super::reject;
use crate::convention::{self, ModelEvent};
use crate::error::ModelError;
use crate::metadata::{AccessMode, ForeignKeyId, Model, SkipNavigation};
use crate::source::ConfigurationSource;

/// Builder over one skip navigation.
pub struct SkipNavigationBuilder<'m> {
    model: &'m mut Model,
    entity: String,
    navigation: String,
}

impl<'m> SkipNavigationBuilder<'m> {
    /// Wrap a skip navigation for mutation.
    pub fn new(model: &'m mut Model, entity: &str, navigation: &str) -> Self {
        Self {
            model,
            entity: entity.to_string(),
            navigation: navigation.to_string(),
        }
    }

    /// Name of the navigation under construction.
    pub fn name(&self) -> &str {
        &self.navigation
    }

    /// The navigation, if it still exists.
    pub fn metadata(&self) -> Option<&SkipNavigation> {
        self.model
            .entity_type(&self.entity)
            .and_then(|et| et.skip_navigation(&self.navigation))
    }

    fn navigation(&self) -> Result<&SkipNavigation, ModelError> {
        self.model
            .entity_type(&self.entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(self.entity.clone()))?
            .skip_navigation(&self.navigation)
            .ok_or_else(|| ModelError::NavigationNotFound {
                entity: self.entity.clone(),
                navigation: self.navigation.clone(),
            })
    }

    /// Probe whether `source` may pair the navigation with `inverse`.
    pub fn can_set_inverse(&self, inverse: Option<&str>, source: ConfigurationSource) -> bool {
        let Some(nav) = self.metadata() else {
            return false;
        };
        if !nav.inverse.can_set(source) {
            return false;
        }
        match inverse {
            None => true,
            Some(inverse) => self
                .model
                .entity_type(nav.target())
                .and_then(|et| et.skip_navigation(inverse))
                .is_some_and(|other| {
                    other.target() == self.entity && other.inverse.can_set(source)
                }),
        }
    }

    /// Pair the navigation with its inverse on the target entity type. The
    /// relation is kept symmetric: both ends are written (or cleared)
    /// together, and the write only happens when the gate passes on both.
    pub fn has_inverse(
        &mut self,
        inverse: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let nav = self.navigation()?;
        let old = nav.inverse().map(str::to_string);
        let target = nav.target().to_string();
        if !nav.inverse.can_set(source) {
            return Ok(false);
        }

        let Some(inverse) = inverse else {
            let Some(old_inverse) = old else {
                return Ok(true);
            };
            let points_back = self
                .model
                .entity_type(&target)
                .and_then(|et| et.skip_navigation(&old_inverse))
                .is_some_and(|other| other.inverse() == Some(self.navigation.as_str()));
            if points_back {
                let other_gate = self
                    .model
                    .entity_type(&target)
                    .and_then(|et| et.skip_navigation(&old_inverse))
                    .is_some_and(|other| other.inverse.can_set(source));
                if !other_gate {
                    return Ok(false);
                }
            }
            if let Some(nav) = self
                .model
                .entity_type_mut(&self.entity)
                .and_then(|et| et.skip_navigation_mut(&self.navigation))
            {
                nav.inverse.set(None, source);
            }
            convention::raise(
                self.model,
                ModelEvent::SkipNavigationInverseChanged {
                    entity: self.entity.clone(),
                    navigation: self.navigation.clone(),
                    old: Some(old_inverse.clone()),
                    new: None,
                },
            )?;
            if points_back {
                if let Some(other) = self
                    .model
                    .entity_type_mut(&target)
                    .and_then(|et| et.skip_navigation_mut(&old_inverse))
                {
                    other.inverse.set(None, source);
                }
                convention::raise(
                    self.model,
                    ModelEvent::SkipNavigationInverseChanged {
                        entity: target,
                        navigation: old_inverse,
                        old: Some(self.navigation.clone()),
                        new: None,
                    },
                )?;
            }
            return Ok(true);
        };

        if old.as_deref() == Some(inverse) {
            // Idempotent; still record a stronger source on both ends.
            if let Some(nav) = self
                .model
                .entity_type_mut(&self.entity)
                .and_then(|et| et.skip_navigation_mut(&self.navigation))
            {
                nav.inverse.set(Some(inverse.to_string()), source);
            }
            if let Some(other) = self
                .model
                .entity_type_mut(&target)
                .and_then(|et| et.skip_navigation_mut(inverse))
            {
                if other.inverse.can_set(source) {
                    other.inverse.set(Some(self.navigation.clone()), source);
                }
            }
            return Ok(true);
        }

        let Some(other) = self
            .model
            .entity_type(&target)
            .and_then(|et| et.skip_navigation(inverse))
        else {
            if source.is_explicit() {
                return Err(ModelError::NavigationNotFound {
                    entity: target,
                    navigation: inverse.to_string(),
                });
            }
            return Ok(false);
        };
        if other.target() != self.entity {
            return reject(source, || {
                format!(
                    "skip navigation '{inverse}' on entity type '{target}' does not target '{}'",
                    self.entity
                )
            });
        }
        if !other.inverse.can_set(source) {
            return Ok(false);
        }
        let other_old = other.inverse().map(str::to_string);

        if let Some(nav) = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|et| et.skip_navigation_mut(&self.navigation))
        {
            nav.inverse.set(Some(inverse.to_string()), source);
        }
        if let Some(other) = self
            .model
            .entity_type_mut(&target)
            .and_then(|et| et.skip_navigation_mut(inverse))
        {
            other.inverse.set(Some(self.navigation.clone()), source);
        }
        convention::raise(
            self.model,
            ModelEvent::SkipNavigationInverseChanged {
                entity: self.entity.clone(),
                navigation: self.navigation.clone(),
                old,
                new: Some(inverse.to_string()),
            },
        )?;
        convention::raise(
            self.model,
            ModelEvent::SkipNavigationInverseChanged {
                entity: target,
                navigation: inverse.to_string(),
                old: other_old,
                new: Some(self.navigation.clone()),
            },
        )?;
        Ok(true)
    }

    /// Probe whether `source` may assign the foreign key.
    pub fn can_set_foreign_key(
        &self,
        foreign_key: Option<ForeignKeyId>,
        source: ConfigurationSource,
    ) -> bool {
        let Some(nav) = self.metadata() else {
            return false;
        };
        if !nav.foreign_key.can_set(source) {
            return false;
        }
        match foreign_key {
            None => true,
            Some(id) => self
                .model
                .find_foreign_key(id)
                .is_some_and(|(_, fk)| fk.principal_entity() == self.entity),
        }
    }

    /// Assign the foreign key tying this navigation to its association
    /// entity type. The foreign key's principal must be the declaring
    /// entity type.
    pub fn has_foreign_key(
        &mut self,
        foreign_key: Option<ForeignKeyId>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let nav = self.navigation()?;
        let old = nav.foreign_key();
        if !nav.foreign_key.can_set(source) {
            return Ok(false);
        }

        if let Some(id) = foreign_key {
            let Some((_, fk)) = self.model.find_foreign_key(id) else {
                return reject(source, || format!("{id} does not exist in the model"));
            };
            if fk.principal_entity() != self.entity {
                return reject(source, || {
                    format!(
                        "{id} does not reference entity type '{}' as principal",
                        self.entity
                    )
                });
            }
        }

        if let Some(nav) = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|et| et.skip_navigation_mut(&self.navigation))
        {
            nav.foreign_key.set(foreign_key, source);
        }
        if old != foreign_key {
            convention::raise(
                self.model,
                ModelEvent::SkipNavigationForeignKeyChanged {
                    entity: self.entity.clone(),
                    navigation: self.navigation.clone(),
                    old,
                    new: foreign_key,
                },
            )?;
        }
        Ok(true)
    }

    /// Probe whether `source` may configure eager loading.
    pub fn can_set_eager_loaded(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|nav| nav.eager_loaded.can_set(source))
    }

    /// Configure whether the navigation is loaded eagerly.
    pub fn eager_loaded(
        &mut self,
        eager: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let applied = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|et| et.skip_navigation_mut(&self.navigation))
            .map(|nav| nav.eager_loaded.set(eager, source));
        match applied {
            Some(applied) => Ok(applied),
            None => Err(ModelError::NavigationNotFound {
                entity: self.entity.clone(),
                navigation: self.navigation.clone(),
            }),
        }
    }

    /// Probe whether `source` may associate the backing field.
    pub fn can_set_field(&self, source: ConfigurationSource) -> bool {
        self.metadata().is_some_and(|nav| nav.field.can_set(source))
    }

    /// Associate a backing field member with the navigation.
    pub fn has_field(
        &mut self,
        field: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let applied = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|et| et.skip_navigation_mut(&self.navigation))
            .map(|nav| nav.field.set(field.map(str::to_string), source));
        match applied {
            Some(applied) => Ok(applied),
            None => Err(ModelError::NavigationNotFound {
                entity: self.entity.clone(),
                navigation: self.navigation.clone(),
            }),
        }
    }

    /// Probe whether `source` may configure the access mode.
    pub fn can_set_access_mode(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|nav| nav.access_mode.can_set(source))
    }

    /// Configure how the navigation is read and written.
    pub fn access_mode(
        &mut self,
        mode: Option<AccessMode>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let applied = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|et| et.skip_navigation_mut(&self.navigation))
            .map(|nav| nav.access_mode.set(mode, source));
        match applied {
            Some(applied) => Ok(applied),
            None => Err(ModelError::NavigationNotFound {
                entity: self.entity.clone(),
                navigation: self.navigation.clone(),
            }),
        }
    }

    /// Re-parent the navigation onto `target_entity`, preserving recorded
    /// per-attribute sources. The inverse and foreign-key assignments are
    /// replayed only when they still hold for the new owner and are dropped
    /// otherwise; the old declaration is removed.
    pub fn attach(
        &mut self,
        target_entity: &str,
    ) -> Result<Option<SkipNavigationBuilder<'_>>, ModelError> {
        let nav = self.navigation()?.clone();
        if self.model.entity_type(target_entity).is_none() {
            return Err(ModelError::EntityTypeNotFound(target_entity.to_string()));
        }
        if self
            .model
            .entity_type(target_entity)
            .and_then(|et| et.skip_navigation(&nav.name))
            .is_some()
        {
            return Ok(None);
        }

        let old_entity = self.entity.clone();
        let name = nav.name.clone();
        convention::batch(self.model, |model| {
            let mut fresh = SkipNavigation::new(
                &name,
                target_entity,
                nav.target.clone(),
                nav.collection,
                nav.configuration_source,
            );
            if let Some((value, source)) = nav.eager_loaded.recorded() {
                fresh.eager_loaded.set(Some(*value), source);
            }
            if let Some((value, source)) = nav.field.recorded() {
                fresh.field.set(Some(value.clone()), source);
            }
            if let Some((value, source)) = nav.access_mode.recorded() {
                fresh.access_mode.set(Some(*value), source);
            }
            if let Some((inverse, source)) = nav.inverse.recorded() {
                let still_valid = model
                    .entity_type(&nav.target)
                    .and_then(|et| et.skip_navigation(inverse))
                    .is_some_and(|other| other.target() == target_entity);
                if still_valid {
                    fresh.inverse.set(Some(inverse.clone()), source);
                }
            }
            if let Some((fk, source)) = nav.foreign_key.recorded() {
                let still_valid = model
                    .find_foreign_key(*fk)
                    .is_some_and(|(_, f)| f.principal_entity() == target_entity);
                if still_valid {
                    fresh.foreign_key.set(Some(*fk), source);
                }
            }

            force_remove_skip_navigation(model, &old_entity, &name)?;
            if let Some(et) = model.entity_type_mut(target_entity) {
                et.skip_navigations.insert(name.clone(), fresh);
            }
            convention::raise(
                model,
                ModelEvent::SkipNavigationAdded {
                    entity: target_entity.to_string(),
                    navigation: name.clone(),
                },
            )
        })?;
        Ok(Some(SkipNavigationBuilder::new(
            self.model,
            target_entity,
            &self.navigation,
        )))
    }
}
