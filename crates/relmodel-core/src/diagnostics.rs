//! Read-only diagnostic event payloads.
//!
//! Thin data carriers identifying the metadata involved in a model change,
//! constructed by the dispatcher and conventions and handed to the tracing
//! layer. The core never interprets them.

use serde::Serialize;

/// Identifies an entity type.
#[derive(Debug, Clone, Serialize)]
pub struct EntityTypeEventData {
    /// Entity type name.
    pub entity_type: String,
}

impl EntityTypeEventData {
    /// Payload for an entity-type-level event.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
        }
    }
}

/// Identifies a navigation or skip navigation.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationEventData {
    /// Declaring entity type name.
    pub entity_type: String,
    /// Navigation name.
    pub navigation: String,
}

impl NavigationEventData {
    /// Payload for a navigation-level event.
    pub fn new(entity_type: impl Into<String>, navigation: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            navigation: navigation.into(),
        }
    }
}

/// Identifies a foreign key by its dependent end.
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKeyEventData {
    /// Declaring (dependent) entity type name.
    pub entity_type: String,
    /// Dependent property names.
    pub properties: Vec<String>,
    /// Principal entity type name.
    pub principal_entity_type: String,
}

impl ForeignKeyEventData {
    /// Payload for a foreign-key-level event.
    pub fn new(
        entity_type: impl Into<String>,
        properties: &[String],
        principal_entity_type: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties: properties.to_vec(),
            principal_entity_type: principal_entity_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_serialize() {
        let payload = ForeignKeyEventData::new("Post", &["author_id".to_string()], "User");
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("author_id"));
        assert!(json.contains("principal_entity_type"));
    }
}
