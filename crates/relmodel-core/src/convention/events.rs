//! Model-change events raised by builders and consumed by conventions.

use crate::metadata::{ForeignKeyId, IndexId, KeyId};

/// The kind of a model-change event, used for convention registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An entity type was added to the model.
    EntityTypeAdded,
    /// An entity type was removed from the model.
    EntityTypeRemoved,
    /// An entity type's base type changed.
    BaseTypeChanged,
    /// A property was declared.
    PropertyAdded,
    /// A property was removed.
    PropertyRemoved,
    /// A property's effective nullability changed.
    PropertyNullabilityChanged,
    /// A key was declared.
    KeyAdded,
    /// A key was removed.
    KeyRemoved,
    /// The primary key changed.
    PrimaryKeyChanged,
    /// A foreign key was declared.
    ForeignKeyAdded,
    /// A foreign key was removed.
    ForeignKeyRemoved,
    /// A reference navigation was declared.
    NavigationAdded,
    /// A skip navigation was declared.
    SkipNavigationAdded,
    /// A skip navigation was removed.
    SkipNavigationRemoved,
    /// A skip navigation's inverse changed.
    SkipNavigationInverseChanged,
    /// A skip navigation's foreign key changed.
    SkipNavigationForeignKeyChanged,
    /// An index was declared.
    IndexAdded,
    /// An index was removed.
    IndexRemoved,
}

/// A model-change notification.
///
/// Events carry enough identity to re-fetch current state from the model,
/// never a frozen copy: by the time a queued event is dispatched the graph
/// may have changed again, and conventions must observe the live state.
/// Removal events additionally carry the removed element's property names,
/// since that state is no longer reachable.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// An entity type was added.
    EntityTypeAdded {
        /// Entity type name.
        entity: String,
    },
    /// An entity type was removed.
    EntityTypeRemoved {
        /// Entity type name.
        entity: String,
    },
    /// An entity type's base type changed.
    BaseTypeChanged {
        /// Entity type name.
        entity: String,
        /// Previous base type.
        old: Option<String>,
        /// New base type.
        new: Option<String>,
    },
    /// A property was declared.
    PropertyAdded {
        /// Declaring entity type.
        entity: String,
        /// Property name.
        property: String,
    },
    /// A property was removed.
    PropertyRemoved {
        /// Declaring entity type.
        entity: String,
        /// Property name.
        property: String,
    },
    /// A property's effective nullability changed.
    PropertyNullabilityChanged {
        /// Declaring entity type.
        entity: String,
        /// Property name.
        property: String,
        /// Previous nullability.
        old: bool,
        /// New nullability.
        new: bool,
    },
    /// A key was declared.
    KeyAdded {
        /// Declaring entity type.
        entity: String,
        /// Key id.
        key: KeyId,
    },
    /// A key was removed.
    KeyRemoved {
        /// Declaring entity type.
        entity: String,
        /// Key id.
        key: KeyId,
        /// Properties the key spanned.
        properties: Vec<String>,
    },
    /// The primary key changed.
    PrimaryKeyChanged {
        /// Declaring entity type.
        entity: String,
        /// Previous primary key.
        old: Option<KeyId>,
        /// New primary key.
        new: Option<KeyId>,
    },
    /// A foreign key was declared.
    ForeignKeyAdded {
        /// Declaring (dependent) entity type.
        entity: String,
        /// Foreign key id.
        foreign_key: ForeignKeyId,
    },
    /// A foreign key was removed.
    ForeignKeyRemoved {
        /// Declaring (dependent) entity type.
        entity: String,
        /// Foreign key id.
        foreign_key: ForeignKeyId,
        /// Dependent properties the foreign key spanned.
        properties: Vec<String>,
    },
    /// A reference navigation was declared.
    NavigationAdded {
        /// Declaring entity type.
        entity: String,
        /// Navigation name.
        navigation: String,
    },
    /// A skip navigation was declared.
    SkipNavigationAdded {
        /// Declaring entity type.
        entity: String,
        /// Navigation name.
        navigation: String,
    },
    /// A skip navigation was removed.
    SkipNavigationRemoved {
        /// Declaring entity type.
        entity: String,
        /// Navigation name.
        navigation: String,
    },
    /// A skip navigation's inverse changed.
    SkipNavigationInverseChanged {
        /// Declaring entity type.
        entity: String,
        /// Navigation name.
        navigation: String,
        /// Previous inverse.
        old: Option<String>,
        /// New inverse.
        new: Option<String>,
    },
    /// A skip navigation's foreign key changed.
    SkipNavigationForeignKeyChanged {
        /// Declaring entity type.
        entity: String,
        /// Navigation name.
        navigation: String,
        /// Previous foreign key.
        old: Option<ForeignKeyId>,
        /// New foreign key.
        new: Option<ForeignKeyId>,
    },
    /// An index was declared.
    IndexAdded {
        /// Declaring entity type.
        entity: String,
        /// Index id.
        index: IndexId,
    },
    /// An index was removed.
    IndexRemoved {
        /// Declaring entity type.
        entity: String,
        /// Index id.
        index: IndexId,
        /// Properties the index spanned.
        properties: Vec<String>,
    },
}

impl ModelEvent {
    /// The event's kind, for registration lookup.
    pub fn kind(&self) -> EventKind {
        match self {
            ModelEvent::EntityTypeAdded { .. } => EventKind::EntityTypeAdded,
            ModelEvent::EntityTypeRemoved { .. } => EventKind::EntityTypeRemoved,
            ModelEvent::BaseTypeChanged { .. } => EventKind::BaseTypeChanged,
            ModelEvent::PropertyAdded { .. } => EventKind::PropertyAdded,
            ModelEvent::PropertyRemoved { .. } => EventKind::PropertyRemoved,
            ModelEvent::PropertyNullabilityChanged { .. } => {
                EventKind::PropertyNullabilityChanged
            }
            ModelEvent::KeyAdded { .. } => EventKind::KeyAdded,
            ModelEvent::KeyRemoved { .. } => EventKind::KeyRemoved,
            ModelEvent::PrimaryKeyChanged { .. } => EventKind::PrimaryKeyChanged,
            ModelEvent::ForeignKeyAdded { .. } => EventKind::ForeignKeyAdded,
            ModelEvent::ForeignKeyRemoved { .. } => EventKind::ForeignKeyRemoved,
            ModelEvent::NavigationAdded { .. } => EventKind::NavigationAdded,
            ModelEvent::SkipNavigationAdded { .. } => EventKind::SkipNavigationAdded,
            ModelEvent::SkipNavigationRemoved { .. } => EventKind::SkipNavigationRemoved,
            ModelEvent::SkipNavigationInverseChanged { .. } => {
                EventKind::SkipNavigationInverseChanged
            }
            ModelEvent::SkipNavigationForeignKeyChanged { .. } => {
                EventKind::SkipNavigationForeignKeyChanged
            }
            ModelEvent::IndexAdded { .. } => EventKind::IndexAdded,
            ModelEvent::IndexRemoved { .. } => EventKind::IndexRemoved,
        }
    }

    /// The entity type the event concerns.
    pub fn entity(&self) -> &str {
        match self {
            ModelEvent::EntityTypeAdded { entity }
            | ModelEvent::EntityTypeRemoved { entity }
            | ModelEvent::BaseTypeChanged { entity, .. }
            | ModelEvent::PropertyAdded { entity, .. }
            | ModelEvent::PropertyRemoved { entity, .. }
            | ModelEvent::PropertyNullabilityChanged { entity, .. }
            | ModelEvent::KeyAdded { entity, .. }
            | ModelEvent::KeyRemoved { entity, .. }
            | ModelEvent::PrimaryKeyChanged { entity, .. }
            | ModelEvent::ForeignKeyAdded { entity, .. }
            | ModelEvent::ForeignKeyRemoved { entity, .. }
            | ModelEvent::NavigationAdded { entity, .. }
            | ModelEvent::SkipNavigationAdded { entity, .. }
            | ModelEvent::SkipNavigationRemoved { entity, .. }
            | ModelEvent::SkipNavigationInverseChanged { entity, .. }
            | ModelEvent::SkipNavigationForeignKeyChanged { entity, .. }
            | ModelEvent::IndexAdded { entity, .. }
            | ModelEvent::IndexRemoved { entity, .. } => entity,
        }
    }
}
