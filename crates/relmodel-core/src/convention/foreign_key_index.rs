//! Index maintenance over foreign key properties.

use tracing::debug;

use super::{Convention, ConventionContext, ModelEvent};
use crate::builder::EntityTypeBuilder;
use crate::diagnostics::ForeignKeyEventData;
use crate::error::ModelError;
use crate::metadata::{EntityType, Model};
use crate::source::ConfigurationSource;

/// Keeps a convention-source index over each foreign key's dependent
/// properties, unless those properties are already a prefix of the primary
/// key or of another index. The index follows the foreign key's lifetime
/// and yields to a primary key that supersedes it.
pub struct ForeignKeyIndexConvention;

impl ForeignKeyIndexConvention {
    fn is_covered(et: &EntityType, properties: &[String]) -> bool {
        if let Some(pk) = et.primary_key() {
            if starts_with(pk.properties(), properties) {
                return true;
            }
        }
        et.indexes()
            .any(|index| starts_with(index.properties(), properties))
    }
}

fn starts_with(haystack: &[String], prefix: &[String]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()] == prefix[..]
}

impl Convention for ForeignKeyIndexConvention {
    fn name(&self) -> &'static str {
        "foreign_key_index"
    }

    fn process(
        &self,
        model: &mut Model,
        event: &ModelEvent,
        _ctx: &mut ConventionContext,
    ) -> Result<(), ModelError> {
        match event {
            ModelEvent::ForeignKeyAdded {
                entity,
                foreign_key,
            } => {
                let entity = entity.clone();
                let (properties, principal) = {
                    let Some(fk) = model
                        .entity_type(&entity)
                        .and_then(|et| et.foreign_key(*foreign_key))
                    else {
                        return Ok(());
                    };
                    (fk.properties().to_vec(), fk.principal_entity().to_string())
                };
                let covered = model
                    .entity_type(&entity)
                    .is_some_and(|et| Self::is_covered(et, &properties));
                if covered {
                    return Ok(());
                }
                debug!(
                    target: "relmodel::conventions",
                    payload = ?ForeignKeyEventData::new(&entity, &properties, &principal),
                    "indexing foreign key properties"
                );
                let refs: Vec<&str> = properties.iter().map(String::as_str).collect();
                EntityTypeBuilder::new(model, &entity)
                    .has_index(&refs, ConfigurationSource::Convention)?;
            }

            ModelEvent::ForeignKeyRemoved {
                entity, properties, ..
            } => {
                let entity = entity.clone();
                let still_needed = model.entity_type(&entity).is_some_and(|et| {
                    et.foreign_keys()
                        .any(|fk| fk.properties() == properties.as_slice())
                });
                if still_needed {
                    return Ok(());
                }
                let index = model.entity_type(&entity).and_then(|et| {
                    et.find_index(
                        &properties.iter().map(String::as_str).collect::<Vec<_>>(),
                    )
                    .filter(|i| i.configuration_source() == ConfigurationSource::Convention)
                    .map(|i| i.id())
                });
                if let Some(index) = index {
                    EntityTypeBuilder::new(model, &entity)
                        .remove_index(index, ConfigurationSource::Convention)?;
                }
            }

            ModelEvent::PrimaryKeyChanged { entity, .. } => {
                // A new primary key supersedes convention indexes it covers.
                let entity = entity.clone();
                let superseded: Vec<_> = model
                    .entity_type(&entity)
                    .map(|et| {
                        et.indexes()
                            .filter(|index| {
                                index.configuration_source() == ConfigurationSource::Convention
                                    && et.primary_key().is_some_and(|pk| {
                                        starts_with(pk.properties(), index.properties())
                                    })
                            })
                            .map(|index| index.id())
                            .collect()
                    })
                    .unwrap_or_default();
                for index in superseded {
                    EntityTypeBuilder::new(model, &entity)
                        .remove_index(index, ConfigurationSource::Convention)?;
                }
            }

            ModelEvent::IndexRemoved { entity, .. } => {
                // Re-create indexes for foreign keys the removed index was
                // covering.
                let entity = entity.clone();
                let uncovered: Vec<Vec<String>> = model
                    .entity_type(&entity)
                    .map(|et| {
                        et.foreign_keys()
                            .filter(|fk| !Self::is_covered(et, fk.properties()))
                            .map(|fk| fk.properties().to_vec())
                            .collect()
                    })
                    .unwrap_or_default();
                for properties in uncovered {
                    let refs: Vec<&str> = properties.iter().map(String::as_str).collect();
                    EntityTypeBuilder::new(model, &entity)
                        .has_index(&refs, ConfigurationSource::Convention)?;
                }
            }

            _ => {}
        }
        Ok(())
    }
}
