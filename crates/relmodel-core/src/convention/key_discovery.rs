//! Primary-key discovery by property naming.

use tracing::debug;

use super::{Convention, ConventionContext, ModelEvent};
use crate::builder::EntityTypeBuilder;
use crate::diagnostics::EntityTypeEventData;
use crate::error::ModelError;
use crate::metadata::Model;
use crate::naming;
use crate::source::ConfigurationSource;

/// Sets the primary key of an entity type that has none, from a declared
/// property named `id` or `<entity>_id` (snake case). Association entity
/// types are skipped; the many-to-many convention owns their keys.
pub struct KeyDiscoveryConvention;

impl Convention for KeyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "key_discovery"
    }

    fn process(
        &self,
        model: &mut Model,
        event: &ModelEvent,
        _ctx: &mut ConventionContext,
    ) -> Result<(), ModelError> {
        let entity = event.entity().to_string();
        let candidate = {
            let Some(et) = model.entity_type(&entity) else {
                return Ok(());
            };
            if et.is_association() || et.primary_key_id().is_some() {
                return Ok(());
            }
            let snake = naming::entity_snake_case(et.name());
            [String::from("id"), format!("{snake}_id")]
                .into_iter()
                .find(|name| et.property(name).is_some())
        };
        let Some(candidate) = candidate else {
            return Ok(());
        };

        debug!(
            target: "relmodel::conventions",
            payload = ?EntityTypeEventData::new(&entity),
            property = %candidate,
            "discovered primary key"
        );
        EntityTypeBuilder::new(model, &entity)
            .primary_key(&[candidate.as_str()], ConfigurationSource::Convention)?;
        Ok(())
    }
}
