//! The mutation API over the model graph.
//!
//! One builder per metadata element, each borrowing the model mutably plus
//! the name or id of its subject. Every setter is guarded by the
//! configuration-source precedence gate: `can_*` methods probe without side
//! effects, mutators return `Ok(false)` / `Ok(None)` on a precedence or
//! structural rejection, and a hard error only for invalid explicit
//! configuration. Structural removals cascade eagerly so the graph never
//! holds dangling references.

mod entity_type;
mod foreign_key;
mod key;
mod model;
mod navigation;
mod property;
mod skip_navigation;

pub(crate) use model::force_remove_entity_type;

pub use entity_type::EntityTypeBuilder;
pub use foreign_key::ForeignKeyBuilder;
pub use key::KeyBuilder;
pub use model::ModelBuilder;
pub use navigation::NavigationBuilder;
pub use property::PropertyBuilder;
pub use skip_navigation::SkipNavigationBuilder;

use crate::error::ModelError;
use crate::source::ConfigurationSource;

/// Reject an attribute write: a hard error at `Explicit` precedence, a
/// silent `Ok(false)` below it, so conventions can keep probing.
pub(crate) fn reject(
    source: ConfigurationSource,
    message: impl FnOnce() -> String,
) -> Result<bool, ModelError> {
    if source.is_explicit() {
        Err(ModelError::Configuration(message()))
    } else {
        Ok(false)
    }
}

/// [`reject`] for structural operations returning an id or builder.
pub(crate) fn reject_opt<T>(
    source: ConfigurationSource,
    message: impl FnOnce() -> String,
) -> Result<Option<T>, ModelError> {
    if source.is_explicit() {
        Err(ModelError::Configuration(message()))
    } else {
        Ok(None)
    }
}
