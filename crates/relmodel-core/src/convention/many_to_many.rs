//! Association entity type generation for many-to-many relationships.

use tracing::debug;

use super::{dispatcher, Convention, ConventionContext, ModelEvent};
use crate::builder::{
    force_remove_entity_type, EntityTypeBuilder, ForeignKeyBuilder, ModelBuilder,
    SkipNavigationBuilder,
};
use crate::diagnostics::NavigationEventData;
use crate::error::ModelError;
use crate::metadata::{DeleteBehavior, Model};
use crate::naming;
use crate::source::ConfigurationSource;

/// Resolves a pair of mutually inverse collection skip navigations into a
/// generated association entity type with a foreign key to each endpoint
/// and a composite primary key over both.
///
/// Preconditions, checked against live state: the triggering navigation is
/// a collection with no foreign key, targets a different entity type, and
/// has an inverse that is also a collection with no foreign key. Anything
/// else is a silent no-op. If either foreign key cannot be derived (an
/// endpoint without a primary key), everything created so far is removed
/// again and the model is left exactly as it was.
pub struct ManyToManyAssociationConvention;

impl Convention for ManyToManyAssociationConvention {
    fn name(&self) -> &'static str {
        "many_to_many_association"
    }

    fn process(
        &self,
        model: &mut Model,
        event: &ModelEvent,
        _ctx: &mut ConventionContext,
    ) -> Result<(), ModelError> {
        let (entity, navigation) = match event {
            ModelEvent::SkipNavigationAdded { entity, navigation } => (entity, navigation),
            ModelEvent::SkipNavigationInverseChanged {
                entity,
                navigation,
                new: Some(_),
                ..
            } => (entity, navigation),
            _ => return Ok(()),
        };
        create_association(model, entity, navigation)
    }
}

fn create_association(model: &mut Model, entity: &str, navigation: &str) -> Result<(), ModelError> {
    let (left, right, inverse) = {
        let Some(nav) = model
            .entity_type(entity)
            .and_then(|et| et.skip_navigation(navigation))
        else {
            return Ok(());
        };
        if !nav.is_collection() || nav.foreign_key().is_some() || nav.target() == entity {
            return Ok(());
        }
        let Some(inverse) = nav.inverse() else {
            return Ok(());
        };
        let target = nav.target().to_string();
        let Some(other) = model
            .entity_type(&target)
            .and_then(|et| et.skip_navigation(inverse))
        else {
            return Ok(());
        };
        if !other.is_collection() || other.foreign_key().is_some() {
            return Ok(());
        }
        (entity.to_string(), target, inverse.to_string())
    };

    let max_len = model.config().max_identifier_length();
    let association = naming::uniquify_capped(
        &format!("{left}{right}"),
        |name| model.entity_type(name).is_some(),
        max_len,
    );
    let navigation = navigation.to_string();
    debug!(
        target: "relmodel::conventions",
        payload = ?NavigationEventData::new(&left, &navigation),
        association = %association,
        "resolving many-to-many relationship"
    );

    dispatcher::batch(model, |model| {
        ModelBuilder::new(model).association_entity(&association, ConfigurationSource::Convention)?;

        let left_fk = EntityTypeBuilder::new(model, &association)
            .has_relationship(&left, ConfigurationSource::Convention)?;
        let Some(left_fk) = left_fk else {
            debug!(
                target: "relmodel::conventions",
                association = %association,
                principal = %left,
                "association rolled back: foreign key derivation failed"
            );
            return force_remove_entity_type(model, &association);
        };
        let right_fk = EntityTypeBuilder::new(model, &association)
            .has_relationship(&right, ConfigurationSource::Convention)?;
        let Some(right_fk) = right_fk else {
            debug!(
                target: "relmodel::conventions",
                association = %association,
                principal = %right,
                "association rolled back: foreign key derivation failed"
            );
            return force_remove_entity_type(model, &association);
        };

        // Association rows exist only for the relationship; they go with
        // either endpoint.
        ForeignKeyBuilder::new(model, &association, left_fk)
            .on_delete(Some(DeleteBehavior::Cascade), ConfigurationSource::Convention)?;
        ForeignKeyBuilder::new(model, &association, right_fk)
            .on_delete(Some(DeleteBehavior::Cascade), ConfigurationSource::Convention)?;

        SkipNavigationBuilder::new(model, &left, &navigation)
            .has_foreign_key(Some(left_fk), ConfigurationSource::Convention)?;
        SkipNavigationBuilder::new(model, &right, &inverse)
            .has_foreign_key(Some(right_fk), ConfigurationSource::Convention)?;

        // Composite primary key: left foreign key properties, then right.
        let mut pk_properties: Vec<String> = Vec::new();
        if let Some(et) = model.entity_type(&association) {
            if let Some(fk) = et.foreign_key(left_fk) {
                pk_properties.extend(fk.properties().iter().cloned());
            }
            if let Some(fk) = et.foreign_key(right_fk) {
                pk_properties.extend(fk.properties().iter().cloned());
            }
        }
        let refs: Vec<&str> = pk_properties.iter().map(String::as_str).collect();
        EntityTypeBuilder::new(model, &association)
            .primary_key(&refs, ConfigurationSource::Convention)?;
        Ok(())
    })
}
