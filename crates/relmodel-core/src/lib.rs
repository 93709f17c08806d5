//! Relmodel Core - Conceptual model graph, builders, and convention engine.
//!
//! This crate provides the metadata-modeling core for relmodel: a mutable
//! in-memory model of entity types, properties, navigations, keys, and
//! foreign keys, built from explicit configuration, data annotations, and
//! automated conventions, with per-attribute configuration-source tracking
//! adjudicating between them.

pub mod builder;
pub mod convention;
pub mod diagnostics;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod source;

pub use builder::{
    EntityTypeBuilder, ForeignKeyBuilder, KeyBuilder, ModelBuilder, NavigationBuilder,
    PropertyBuilder, SkipNavigationBuilder,
};
pub use convention::{
    Convention, ConventionContext, ConventionDispatcher, ConventionSet, EventKind,
    ForeignKeyIndexConvention, KeyDiscoveryConvention, ManyToManyAssociationConvention,
    ModelEvent,
};
pub use error::ModelError;
pub use metadata::{
    AccessMode, DeleteBehavior, EntityType, ForeignKey, ForeignKeyId, Index, IndexId, Key, KeyId,
    Model, ModelConfig, ModelSnapshot, Navigation, Property, SaveBehavior, ScalarType,
    ShapeMember, SkipNavigation, TypeShape, ValueConverter, ValueGenerated,
};
pub use source::{ConfigurationSource, Tracked};
