//! The mutable conceptual-model graph.
//!
//! Metadata elements are created by builder factory methods at a given
//! configuration source, mutated only through builders, and removed only by
//! builder removal calls, which cascade to keep referential integrity eager.

mod entity_type;
mod foreign_key;
mod index;
mod key;
mod model;
mod navigation;
mod property;
mod skip_navigation;
mod types;

pub use entity_type::EntityType;
pub use foreign_key::{ForeignKey, ForeignKeyId};
pub use index::{Index, IndexId};
pub use key::{Key, KeyId};
pub use model::{Model, ModelConfig, ModelSnapshot};
pub use navigation::Navigation;
pub use property::Property;
pub use skip_navigation::SkipNavigation;
pub use types::{
    AccessMode, DeleteBehavior, SaveBehavior, ScalarType, ShapeMember, TypeShape, ValueConverter,
    ValueGenerated,
};
