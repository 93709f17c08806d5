//! Convention registration.

use std::collections::HashMap;
use std::sync::Arc;

use super::events::EventKind;
use super::foreign_key_index::ForeignKeyIndexConvention;
use super::key_discovery::KeyDiscoveryConvention;
use super::many_to_many::ManyToManyAssociationConvention;
use super::Convention;

/// Conventions registered per event kind, in registration order.
#[derive(Clone, Default)]
pub struct ConventionSet {
    by_kind: HashMap<EventKind, Vec<Arc<dyn Convention>>>,
}

impl std::fmt::Debug for ConventionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, conventions) in &self.by_kind {
            map.entry(
                kind,
                &conventions.iter().map(|c| c.name()).collect::<Vec<_>>(),
            );
        }
        map.finish()
    }
}

impl ConventionSet {
    /// An empty set: builders mutate the graph with no automated reactions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in conventions.
    pub fn standard() -> Self {
        let mut set = Self::empty();

        let key_discovery = Arc::new(KeyDiscoveryConvention);
        set.add(EventKind::EntityTypeAdded, key_discovery.clone());
        set.add(EventKind::PropertyAdded, key_discovery.clone());
        set.add(EventKind::KeyRemoved, key_discovery);

        let fk_index = Arc::new(ForeignKeyIndexConvention);
        set.add(EventKind::ForeignKeyAdded, fk_index.clone());
        set.add(EventKind::ForeignKeyRemoved, fk_index.clone());
        set.add(EventKind::PrimaryKeyChanged, fk_index.clone());
        set.add(EventKind::IndexRemoved, fk_index);

        let many_to_many = Arc::new(ManyToManyAssociationConvention);
        set.add(EventKind::SkipNavigationAdded, many_to_many.clone());
        set.add(EventKind::SkipNavigationInverseChanged, many_to_many);

        set
    }

    /// Register a convention for an event kind. Conventions run in
    /// registration order.
    pub fn add(&mut self, kind: EventKind, convention: Arc<dyn Convention>) {
        self.by_kind.entry(kind).or_default().push(convention);
    }

    /// Conventions registered for `kind`, in registration order.
    pub fn for_kind(&self, kind: EventKind) -> &[Arc<dyn Convention>] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }
}
