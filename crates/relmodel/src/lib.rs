//! Relmodel - conceptual model building with convention-driven
//! configuration.
//!
//! This crate is the public face of the relmodel workspace: it re-exports
//! the model graph, the internal builders, and the convention engine from
//! `relmodel-core`.
//!
//! # Example
//!
//! ```
//! use relmodel::{ConfigurationSource, Model, ModelBuilder, ScalarType};
//!
//! let mut model = Model::new();
//! let mut builder = ModelBuilder::new(&mut model);
//!
//! let mut user = builder.entity("User", ConfigurationSource::Explicit)?;
//! user.property("id", ScalarType::Uuid, ConfigurationSource::Explicit)?;
//! user.property("email", ScalarType::String, ConfigurationSource::Explicit)?;
//!
//! // Key discovery already promoted `id` to the primary key.
//! let user = model.entity_type("User").unwrap();
//! assert_eq!(user.primary_key().unwrap().properties(), ["id"]);
//! # Ok::<(), relmodel::ModelError>(())
//! ```

pub use relmodel_core::*;

/// Commonly used types, importable as a unit.
pub mod prelude {
    pub use relmodel_core::{
        ConfigurationSource, EntityTypeBuilder, Model, ModelBuilder, ModelError, PropertyBuilder,
        ScalarType, SkipNavigationBuilder, TypeShape,
    };
}
