//! Core error types.
//!
//! Expected failures (a lower-precedence source losing to a recorded one, a
//! convention probing a shape that does not fit) are reported as `Ok(false)`
//! or `Ok(None)` results, never as errors. `ModelError` is reserved for
//! caller misuse: invalid explicit configuration and structural lookups that
//! reference metadata not present in the model.

use thiserror::Error;

/// Model-building errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The named entity type is not part of the model.
    #[error("entity type '{0}' is not part of the model")]
    EntityTypeNotFound(String),

    /// The named property does not exist on the entity type.
    #[error("property '{property}' does not exist on entity type '{entity}'")]
    PropertyNotFound {
        /// Entity type that was searched.
        entity: String,
        /// Missing property name.
        property: String,
    },

    /// The named navigation does not exist on the entity type.
    #[error("navigation '{navigation}' does not exist on entity type '{entity}'")]
    NavigationNotFound {
        /// Entity type that was searched.
        entity: String,
        /// Missing navigation name.
        navigation: String,
    },

    /// The referenced key does not exist on the entity type.
    #[error("{key} does not exist on entity type '{entity}'")]
    KeyNotFound {
        /// Entity type that was searched.
        entity: String,
        /// Missing key id.
        key: crate::metadata::KeyId,
    },

    /// The referenced foreign key does not exist on the entity type.
    #[error("{foreign_key} does not exist on entity type '{entity}'")]
    ForeignKeyNotFound {
        /// Entity type that was searched.
        entity: String,
        /// Missing foreign key id.
        foreign_key: crate::metadata::ForeignKeyId,
    },

    /// The referenced index does not exist on the entity type.
    #[error("{index} does not exist on entity type '{entity}'")]
    IndexNotFound {
        /// Entity type that was searched.
        entity: String,
        /// Missing index id.
        index: crate::metadata::IndexId,
    },

    /// Invalid explicit configuration. Raised only for writes at `Explicit`
    /// precedence; the same probe from a convention or annotation is a
    /// silent rejection.
    #[error("configuration conflict: {0}")]
    Configuration(String),

    /// Snapshot serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
