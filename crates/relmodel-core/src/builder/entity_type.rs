//! Entity-type builder: properties, navigations, keys, foreign keys, and
//! indexes.

use tracing::warn;

use super::foreign_key::ForeignKeyBuilder;
use super::key::KeyBuilder;
use super::model::{
    force_remove_foreign_key, force_remove_index, force_remove_key, force_remove_property,
    force_remove_skip_navigation,
};
use super::navigation::NavigationBuilder;
use super::property::PropertyBuilder;
use super::skip_navigation::SkipNavigationBuilder;
use super::{reject, reject_opt};
use crate::convention::{self, ModelEvent};
use crate::error::ModelError;
use crate::metadata::{
    EntityType, ForeignKey, ForeignKeyId, Index, IndexId, Key, KeyId, Model, Navigation, Property,
    ScalarType, SkipNavigation,
};
use crate::naming;
use crate::source::ConfigurationSource;

/// Builder over one entity type.
pub struct EntityTypeBuilder<'m> {
    model: &'m mut Model,
    entity: String,
}

impl<'m> EntityTypeBuilder<'m> {
    /// Wrap an entity type for mutation.
    pub fn new(model: &'m mut Model, entity: &str) -> Self {
        Self {
            model,
            entity: entity.to_string(),
        }
    }

    /// Name of the entity type under construction.
    pub fn name(&self) -> &str {
        &self.entity
    }

    /// Read access to the underlying model.
    pub fn model(&self) -> &Model {
        self.model
    }

    /// The entity type, if it still exists. A cascade triggered through this
    /// builder can remove the entity type out from under it.
    pub fn metadata(&self) -> Option<&EntityType> {
        self.model.entity_type(&self.entity)
    }

    fn entity(&self) -> Result<&EntityType, ModelError> {
        self.model
            .entity_type(&self.entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(self.entity.clone()))
    }

    // ---- properties ----

    /// Probe whether `source` may declare (or re-declare) the property.
    pub fn can_add_property(&self, name: &str, ty: ScalarType, source: ConfigurationSource) -> bool {
        let Some(et) = self.metadata() else {
            return false;
        };
        if let Some(member) = et.shape().and_then(|s| s.member(name)) {
            if member.ty != ty {
                return false;
            }
        }
        match et.property(name) {
            Some(existing) => {
                existing.scalar_type() == ty
                    || source.overrides(Some(existing.configuration_source()))
            }
            None => true,
        }
    }

    /// Get or create a property. The declared type must agree with the
    /// backing shape member when one exists; a conflicting re-declaration is
    /// gated on the property's own configuration source.
    pub fn property(
        &mut self,
        name: &str,
        ty: ScalarType,
        source: ConfigurationSource,
    ) -> Result<Option<PropertyBuilder<'_>>, ModelError> {
        let et = self.entity()?;
        let shape_nullable = match et.shape().and_then(|s| s.member(name)) {
            Some(member) => {
                if member.ty != ty {
                    return reject_opt(source, || {
                        format!(
                            "property '{name}' on entity type '{}' conflicts with the declared shape member type",
                            self.entity
                        )
                    });
                }
                Some(member.nullable)
            }
            None => None,
        };

        if let Some(existing) = et.property(name) {
            if existing.scalar_type() != ty
                && !source.overrides(Some(existing.configuration_source()))
            {
                return Ok(None);
            }
            let entity = self.entity.clone();
            if let Some(prop) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.property_mut(name))
            {
                prop.ty = ty;
                prop.update_configuration_source(source);
            }
            return Ok(Some(PropertyBuilder::new(self.model, &entity, name)));
        }

        let entity = self.entity.clone();
        let property = Property::new(name, ty, shape_nullable, source);
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.properties.insert(name.to_string(), property);
        }
        convention::raise(
            self.model,
            ModelEvent::PropertyAdded {
                entity: entity.clone(),
                property: name.to_string(),
            },
        )?;
        Ok(Some(PropertyBuilder::new(self.model, &entity, name)))
    }

    /// Builder over an existing declared property.
    pub fn property_builder(&mut self, name: &str) -> Option<PropertyBuilder<'_>> {
        if self.metadata()?.property(name).is_some() {
            Some(PropertyBuilder::new(self.model, &self.entity, name))
        } else {
            None
        }
    }

    /// Remove a declared property and everything spanning it.
    pub fn remove_property(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let Some(property) = self.metadata().and_then(|et| et.property(name)) else {
            return Ok(false);
        };
        if !source.overrides(Some(property.configuration_source())) {
            return Ok(false);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| {
            force_remove_property(model, &entity, name)
        })?;
        Ok(true)
    }

    // ---- keys ----

    /// Probe whether `source` may declare a key over `properties`.
    pub fn can_have_key(&self, properties: &[&str], _source: ConfigurationSource) -> bool {
        !properties.is_empty()
            && self.metadata().is_some()
            && properties
                .iter()
                .all(|p| self.model.find_property(&self.entity, p).is_some())
    }

    /// Get or declare a key over the given declared-or-inherited properties.
    pub fn has_key(
        &mut self,
        properties: &[&str],
        source: ConfigurationSource,
    ) -> Result<Option<KeyId>, ModelError> {
        self.entity()?;
        if properties.is_empty() {
            return reject_opt(source, || {
                format!("a key on entity type '{}' requires at least one property", self.entity)
            });
        }
        for property in properties {
            if self.model.find_property(&self.entity, property).is_none() {
                if source.is_explicit() {
                    return Err(ModelError::PropertyNotFound {
                        entity: self.entity.clone(),
                        property: (*property).to_string(),
                    });
                }
                return Ok(None);
            }
        }

        if let Some(existing) = self.metadata().and_then(|et| et.find_key(properties)) {
            let id = existing.id();
            let entity = self.entity.clone();
            if let Some(key) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.key_mut(id))
            {
                key.update_configuration_source(source);
            }
            return Ok(Some(id));
        }

        let id = self.model.next_key_id();
        let key = Key::new(
            id,
            properties.iter().map(|p| (*p).to_string()).collect(),
            source,
        );
        let entity = self.entity.clone();
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.keys.push(key);
        }
        convention::raise(self.model, ModelEvent::KeyAdded { entity, key: id })?;
        Ok(Some(id))
    }

    /// Probe whether `source` may set the primary key over `properties`.
    pub fn can_set_primary_key(&self, properties: &[&str], source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|et| et.primary_key.can_set(source))
            && self.can_have_key(properties, source)
    }

    /// Declare (or find) a key over `properties` and make it the primary
    /// key. The key creation and primary-key change run as one batch.
    pub fn primary_key(
        &mut self,
        properties: &[&str],
        source: ConfigurationSource,
    ) -> Result<Option<KeyId>, ModelError> {
        let et = self.entity()?;
        if !et.primary_key.can_set(source) {
            return Ok(None);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| {
            let Some(key) = EntityTypeBuilder::new(model, &entity).has_key(properties, source)?
            else {
                return Ok(None);
            };
            let old = model.entity_type(&entity).and_then(|et| et.primary_key_id());
            if let Some(et) = model.entity_type_mut(&entity) {
                et.primary_key.set(Some(key), source);
            }
            if old != Some(key) {
                convention::raise(
                    model,
                    ModelEvent::PrimaryKeyChanged {
                        entity: entity.clone(),
                        old,
                        new: Some(key),
                    },
                )?;
            }
            Ok(Some(key))
        })
    }

    /// Clear the primary key, reverting it to unset.
    pub fn clear_primary_key(&mut self, source: ConfigurationSource) -> Result<bool, ModelError> {
        let et = self.entity()?;
        if !et.primary_key.can_set(source) {
            return Ok(false);
        }
        let old = et.primary_key_id();
        let entity = self.entity.clone();
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.primary_key.set(None, source);
        }
        if old.is_some() {
            convention::raise(
                self.model,
                ModelEvent::PrimaryKeyChanged {
                    entity,
                    old,
                    new: None,
                },
            )?;
        }
        Ok(true)
    }

    /// Remove a key; foreign keys referencing it are removed first, and an
    /// association entity type losing its last foreign key goes with them.
    pub fn remove_key(&mut self, key: KeyId, source: ConfigurationSource) -> Result<bool, ModelError> {
        let Some(existing) = self.metadata().and_then(|et| et.key(key)) else {
            return Ok(false);
        };
        if !source.overrides(Some(existing.configuration_source())) {
            return Ok(false);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| force_remove_key(model, &entity, key))?;
        Ok(true)
    }

    /// Builder over an existing key.
    pub fn key_builder(&mut self, key: KeyId) -> Option<KeyBuilder<'_>> {
        if self.metadata()?.key(key).is_some() {
            Some(KeyBuilder::new(self.model, &self.entity, key))
        } else {
            None
        }
    }

    // ---- indexes ----

    /// Get or declare an index over the given properties.
    pub fn has_index(
        &mut self,
        properties: &[&str],
        source: ConfigurationSource,
    ) -> Result<Option<IndexId>, ModelError> {
        self.entity()?;
        if properties.is_empty() {
            return reject_opt(source, || {
                format!(
                    "an index on entity type '{}' requires at least one property",
                    self.entity
                )
            });
        }
        for property in properties {
            if self.model.find_property(&self.entity, property).is_none() {
                if source.is_explicit() {
                    return Err(ModelError::PropertyNotFound {
                        entity: self.entity.clone(),
                        property: (*property).to_string(),
                    });
                }
                return Ok(None);
            }
        }

        if let Some(existing) = self.metadata().and_then(|et| et.find_index(properties)) {
            let id = existing.id();
            let entity = self.entity.clone();
            if let Some(index) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.index_mut(id))
            {
                index.update_configuration_source(source);
            }
            return Ok(Some(id));
        }

        let id = self.model.next_index_id();
        let index = Index::new(
            id,
            properties.iter().map(|p| (*p).to_string()).collect(),
            source,
        );
        let entity = self.entity.clone();
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.indexes.push(index);
        }
        convention::raise(self.model, ModelEvent::IndexAdded { entity, index: id })?;
        Ok(Some(id))
    }

    /// [`has_index`](Self::has_index) with a user-assigned name.
    pub fn has_named_index(
        &mut self,
        name: &str,
        properties: &[&str],
        source: ConfigurationSource,
    ) -> Result<Option<IndexId>, ModelError> {
        let Some(id) = self.has_index(properties, source)? else {
            return Ok(None);
        };
        if let Some(index) = self
            .model
            .entity_type_mut(&self.entity)
            .and_then(|e| e.index_mut(id))
        {
            index.name = Some(name.to_string());
        }
        Ok(Some(id))
    }

    /// Remove an index.
    pub fn remove_index(
        &mut self,
        index: IndexId,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let Some(existing) = self.metadata().and_then(|et| et.index(index)) else {
            return Ok(false);
        };
        if !source.overrides(Some(existing.configuration_source())) {
            return Ok(false);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| {
            force_remove_index(model, &entity, index)
        })?;
        Ok(true)
    }

    // ---- foreign keys ----

    /// Probe whether a relationship to `principal` can be derived: the
    /// principal must exist and have a primary key.
    pub fn can_have_relationship(&self, principal: &str, _source: ConfigurationSource) -> bool {
        self.metadata().is_some()
            && self
                .model
                .entity_type(principal)
                .is_some_and(|et| et.primary_key().is_some())
    }

    /// Get or declare a foreign key over explicit dependent properties,
    /// referencing the principal's primary key. Property count, order, and
    /// types must match the principal key.
    pub fn has_foreign_key(
        &mut self,
        principal: &str,
        properties: &[&str],
        source: ConfigurationSource,
    ) -> Result<Option<ForeignKeyId>, ModelError> {
        self.entity()?;
        let Some(principal_et) = self.model.entity_type(principal) else {
            if source.is_explicit() {
                return Err(ModelError::EntityTypeNotFound(principal.to_string()));
            }
            return Ok(None);
        };
        let Some(pk) = principal_et.primary_key() else {
            return reject_opt(source, || {
                format!("principal entity type '{principal}' has no primary key")
            });
        };
        let pk_id = pk.id();
        let pk_properties = pk.properties().to_vec();
        if properties.len() != pk_properties.len() {
            return reject_opt(source, || {
                format!(
                    "foreign key property count ({}) does not match the primary key of '{principal}' ({})",
                    properties.len(),
                    pk_properties.len()
                )
            });
        }
        for (dependent, pk_property) in properties.iter().zip(&pk_properties) {
            let Some(dependent_prop) = self.model.find_property(&self.entity, dependent) else {
                if source.is_explicit() {
                    return Err(ModelError::PropertyNotFound {
                        entity: self.entity.clone(),
                        property: (*dependent).to_string(),
                    });
                }
                return Ok(None);
            };
            let Some(principal_prop) = self.model.find_property(principal, pk_property) else {
                return Ok(None);
            };
            if dependent_prop.scalar_type() != principal_prop.scalar_type() {
                return reject_opt(source, || {
                    format!(
                        "foreign key property '{dependent}' does not match the type of principal key property '{pk_property}'"
                    )
                });
            }
        }

        if let Some(existing) = self
            .metadata()
            .and_then(|et| et.find_foreign_key(properties, principal))
        {
            let id = existing.id();
            let entity = self.entity.clone();
            if let Some(fk) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.foreign_key_mut(id))
            {
                fk.update_configuration_source(source);
            }
            return Ok(Some(id));
        }

        let id = self.model.next_foreign_key_id();
        let fk = ForeignKey::new(
            id,
            properties.iter().map(|p| (*p).to_string()).collect(),
            principal,
            pk_id,
            source,
        );
        let entity = self.entity.clone();
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.foreign_keys.push(fk);
        }
        convention::raise(
            self.model,
            ModelEvent::ForeignKeyAdded {
                entity,
                foreign_key: id,
            },
        )?;
        Ok(Some(id))
    }

    /// Declare a relationship to `principal`, deriving dependent shadow
    /// properties from the principal's primary key (count, order, and types
    /// copied; names uniquified from the principal name and key property
    /// names). The whole operation is atomic: if any step fails, properties
    /// created along the way are removed again.
    pub fn has_relationship(
        &mut self,
        principal: &str,
        source: ConfigurationSource,
    ) -> Result<Option<ForeignKeyId>, ModelError> {
        self.entity()?;
        let Some(principal_et) = self.model.entity_type(principal) else {
            if source.is_explicit() {
                return Err(ModelError::EntityTypeNotFound(principal.to_string()));
            }
            return Ok(None);
        };
        let Some(pk) = principal_et.primary_key() else {
            return reject_opt(source, || {
                format!("principal entity type '{principal}' has no primary key")
            });
        };
        let mut pk_properties: Vec<(String, ScalarType)> = Vec::new();
        for name in pk.properties() {
            let Some(property) = self.model.find_property(principal, name) else {
                return Ok(None);
            };
            pk_properties.push((name.clone(), property.scalar_type()));
        }

        let principal = principal.to_string();
        let entity = self.entity.clone();
        let max_len = self.model.config().max_identifier_length();
        convention::batch(self.model, |model| {
            let mut created: Vec<String> = Vec::new();
            for (pk_property, ty) in &pk_properties {
                let candidate = naming::foreign_key_property_name(&principal, pk_property);
                let name = match model.entity_type(&entity) {
                    Some(et) => naming::uniquify_capped(
                        &candidate,
                        |n| et.property(n).is_some() || created.iter().any(|c| c == n),
                        max_len,
                    ),
                    None => {
                        rollback_derived_properties(model, &entity, &created)?;
                        return Ok(None);
                    }
                };
                let added = EntityTypeBuilder::new(model, &entity)
                    .property(&name, *ty, source)?
                    .is_some();
                if !added {
                    rollback_derived_properties(model, &entity, &created)?;
                    return Ok(None);
                }
                created.push(name);
            }
            let refs: Vec<&str> = created.iter().map(String::as_str).collect();
            match EntityTypeBuilder::new(model, &entity).has_foreign_key(&principal, &refs, source)?
            {
                Some(fk) => Ok(Some(fk)),
                None => {
                    rollback_derived_properties(model, &entity, &created)?;
                    Ok(None)
                }
            }
        })
    }

    /// Remove a foreign key, detaching navigations bound to it. An
    /// association entity type losing its last foreign key is removed too.
    pub fn remove_foreign_key(
        &mut self,
        foreign_key: ForeignKeyId,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let Some(existing) = self.metadata().and_then(|et| et.foreign_key(foreign_key)) else {
            return Ok(false);
        };
        if !source.overrides(Some(existing.configuration_source())) {
            return Ok(false);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| {
            force_remove_foreign_key(model, &entity, foreign_key)
        })?;
        Ok(true)
    }

    /// Builder over an existing foreign key.
    pub fn foreign_key_builder(&mut self, foreign_key: ForeignKeyId) -> Option<ForeignKeyBuilder<'_>> {
        if self.metadata()?.foreign_key(foreign_key).is_some() {
            Some(ForeignKeyBuilder::new(self.model, &self.entity, foreign_key))
        } else {
            None
        }
    }

    // ---- navigations ----

    /// Get or create a reference navigation over one end of an existing
    /// foreign key. Declared on the dependent end it points at the
    /// principal, and vice versa.
    pub fn navigation(
        &mut self,
        name: &str,
        foreign_key: ForeignKeyId,
        source: ConfigurationSource,
    ) -> Result<Option<NavigationBuilder<'_>>, ModelError> {
        self.entity()?;
        let Some((declaring, fk)) = self.model.find_foreign_key(foreign_key) else {
            return reject_opt(source, || {
                format!("{foreign_key} does not exist in the model")
            });
        };
        let declaring_name = declaring.name().to_string();
        let principal = fk.principal_entity().to_string();
        let (target, on_dependent) = if declaring_name == self.entity {
            (principal, true)
        } else if principal == self.entity {
            (declaring_name, false)
        } else {
            return reject_opt(source, || {
                format!(
                    "{foreign_key} does not connect entity type '{}'",
                    self.entity
                )
            });
        };

        if let Some(existing) = self.metadata().and_then(|et| et.navigation(name)) {
            if existing.foreign_key() != foreign_key {
                return reject_opt(source, || {
                    format!(
                        "navigation '{name}' on entity type '{}' already traverses {}",
                        self.entity,
                        existing.foreign_key()
                    )
                });
            }
            let entity = self.entity.clone();
            if let Some(nav) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.navigation_mut(name))
            {
                nav.update_configuration_source(source);
            }
            return Ok(Some(NavigationBuilder::new(self.model, &entity, name)));
        }

        let entity = self.entity.clone();
        let navigation = Navigation::new(name, target, foreign_key, on_dependent, source);
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.navigations.insert(name.to_string(), navigation);
        }
        convention::raise(
            self.model,
            ModelEvent::NavigationAdded {
                entity: entity.clone(),
                navigation: name.to_string(),
            },
        )?;
        Ok(Some(NavigationBuilder::new(self.model, &entity, name)))
    }

    /// Builder over an existing reference navigation.
    pub fn navigation_builder(&mut self, name: &str) -> Option<NavigationBuilder<'_>> {
        if self.metadata()?.navigation(name).is_some() {
            Some(NavigationBuilder::new(self.model, &self.entity, name))
        } else {
            None
        }
    }

    // ---- skip navigations ----

    /// Get or create a skip navigation to `target`. A conflicting
    /// re-declaration (different target or collection shape) is rejected.
    pub fn skip_navigation(
        &mut self,
        name: &str,
        target: &str,
        collection: bool,
        source: ConfigurationSource,
    ) -> Result<Option<SkipNavigationBuilder<'_>>, ModelError> {
        self.entity()?;
        if self.model.entity_type(target).is_none() {
            if source.is_explicit() {
                return Err(ModelError::EntityTypeNotFound(target.to_string()));
            }
            return Ok(None);
        }

        if let Some(existing) = self.metadata().and_then(|et| et.skip_navigation(name)) {
            if existing.target() != target || existing.is_collection() != collection {
                return reject_opt(source, || {
                    format!(
                        "skip navigation '{name}' on entity type '{}' already has a conflicting definition",
                        self.entity
                    )
                });
            }
            let entity = self.entity.clone();
            if let Some(nav) = self
                .model
                .entity_type_mut(&entity)
                .and_then(|e| e.skip_navigation_mut(name))
            {
                nav.update_configuration_source(source);
            }
            return Ok(Some(SkipNavigationBuilder::new(self.model, &entity, name)));
        }

        let entity = self.entity.clone();
        let navigation = SkipNavigation::new(name, &entity, target, collection, source);
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.skip_navigations.insert(name.to_string(), navigation);
        }
        convention::raise(
            self.model,
            ModelEvent::SkipNavigationAdded {
                entity: entity.clone(),
                navigation: name.to_string(),
            },
        )?;
        Ok(Some(SkipNavigationBuilder::new(self.model, &entity, name)))
    }

    /// Builder over an existing skip navigation.
    pub fn skip_navigation_builder(&mut self, name: &str) -> Option<SkipNavigationBuilder<'_>> {
        if self.metadata()?.skip_navigation(name).is_some() {
            Some(SkipNavigationBuilder::new(self.model, &self.entity, name))
        } else {
            None
        }
    }

    /// Remove a skip navigation, clearing a symmetric inverse pointer on the
    /// partner.
    pub fn remove_skip_navigation(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let Some(existing) = self.metadata().and_then(|et| et.skip_navigation(name)) else {
            return Ok(false);
        };
        if !source.overrides(Some(existing.configuration_source())) {
            return Ok(false);
        }
        let entity = self.entity.clone();
        convention::batch(self.model, |model| {
            force_remove_skip_navigation(model, &entity, name)
        })?;
        Ok(true)
    }

    // ---- base type ----

    /// Probe whether `source` may change the base type.
    pub fn can_set_base_type(&self, base: Option<&str>, source: ConfigurationSource) -> bool {
        let Some(et) = self.metadata() else {
            return false;
        };
        if !et.base_type.can_set(source) {
            return false;
        }
        match base {
            None => true,
            Some(base) => self.model.entity_type(base).is_some(),
        }
    }

    /// Set or clear the base type. The base must exist, the chain must stay
    /// acyclic, and declared properties must not collide with inherited
    /// ones.
    pub fn has_base_type(
        &mut self,
        base: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        let et = self.entity()?;
        if !et.base_type.can_set(source) {
            return Ok(false);
        }
        let old = et.base_type().map(str::to_string);

        let Some(base) = base else {
            if old.is_none() {
                return Ok(true);
            }
            let entity = self.entity.clone();
            if let Some(et) = self.model.entity_type_mut(&entity) {
                et.base_type.set(None, source);
            }
            convention::raise(
                self.model,
                ModelEvent::BaseTypeChanged {
                    entity,
                    old,
                    new: None,
                },
            )?;
            return Ok(true);
        };

        if old.as_deref() == Some(base) {
            let entity = self.entity.clone();
            if let Some(et) = self.model.entity_type_mut(&entity) {
                et.base_type.set(Some(base.to_string()), source);
            }
            return Ok(true);
        }
        if self.model.entity_type(base).is_none() {
            if source.is_explicit() {
                return Err(ModelError::EntityTypeNotFound(base.to_string()));
            }
            return Ok(false);
        }

        // The chain from the new base must not loop back here.
        let mut current = Some(base.to_string());
        let mut hops = 0usize;
        while let Some(name) = current {
            if name == self.entity {
                return reject(source, || {
                    format!(
                        "setting base type '{base}' on entity type '{}' would create a cycle",
                        self.entity
                    )
                });
            }
            current = self
                .model
                .entity_type(&name)
                .and_then(|et| et.base_type())
                .map(str::to_string);
            hops += 1;
            if hops > self.model.entity_types.len() {
                break;
            }
        }

        // Declared members must not shadow inherited ones.
        let declared: Vec<String> = self
            .entity()?
            .properties()
            .map(|p| p.name().to_string())
            .collect();
        for name in &declared {
            if self.model.find_property(base, name).is_some() {
                return reject(source, || {
                    format!(
                        "property '{name}' on entity type '{}' collides with a property inherited from '{base}'",
                        self.entity
                    )
                });
            }
        }

        let entity = self.entity.clone();
        if let Some(et) = self.model.entity_type_mut(&entity) {
            et.base_type.set(Some(base.to_string()), source);
        }
        convention::raise(
            self.model,
            ModelEvent::BaseTypeChanged {
                entity,
                old,
                new: Some(base.to_string()),
            },
        )?;
        Ok(true)
    }
}

fn rollback_derived_properties(
    model: &mut Model,
    entity: &str,
    created: &[String],
) -> Result<(), ModelError> {
    if !created.is_empty() {
        warn!(
            target: "relmodel::builder",
            entity,
            count = created.len(),
            "rolling back derived foreign key properties"
        );
    }
    for name in created.iter().rev() {
        force_remove_property(model, entity, name)?;
    }
    Ok(())
}
