//! The convention pipeline: change events, batching dispatcher, and the
//! built-in conventions.
//!
//! A convention is an automated rule reacting to one kind of model-change
//! event, possibly issuing further builder mutations that feed the same
//! dispatcher. Conventions always probe at `Convention` precedence and
//! absorb failures by rolling back locally; they never surface errors to the
//! user.

mod context;
mod dispatcher;
mod events;
mod foreign_key_index;
mod key_discovery;
mod many_to_many;
mod set;

pub use context::ConventionContext;
pub use dispatcher::{batch, ConventionDispatcher};
pub use events::{EventKind, ModelEvent};
pub use foreign_key_index::ForeignKeyIndexConvention;
pub use key_discovery::KeyDiscoveryConvention;
pub use many_to_many::ManyToManyAssociationConvention;
pub use set::ConventionSet;

pub(crate) use dispatcher::raise;

use crate::error::ModelError;
use crate::metadata::Model;

/// An automated model-building rule.
///
/// The callback receives the live model, not a snapshot: the graph may have
/// changed since the event was queued, so implementations re-fetch current
/// state and no-op when their preconditions no longer hold. A hard error
/// aborts the current batch and propagates to the original caller.
pub trait Convention {
    /// Stable name, for logging and debugging.
    fn name(&self) -> &'static str;

    /// React to one model-change event.
    fn process(
        &self,
        model: &mut Model,
        event: &ModelEvent,
        ctx: &mut ConventionContext,
    ) -> Result<(), ModelError>;
}
