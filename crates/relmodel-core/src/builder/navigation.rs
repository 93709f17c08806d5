//! Reference-navigation builder.

use crate::error::ModelError;
use crate::metadata::{AccessMode, Model, Navigation};
use crate::source::ConfigurationSource;

/// Builder over one reference navigation.
pub struct NavigationBuilder<'m> {
    model: &'m mut Model,
    entity: String,
    navigation: String,
}

impl<'m> NavigationBuilder<'m> {
    /// Wrap a navigation for mutation.
    pub fn new(model: &'m mut Model, entity: &str, navigation: &str) -> Self {
        Self {
            model,
            entity: entity.to_string(),
            navigation: navigation.to_string(),
        }
    }

    /// Name of the navigation under construction.
    pub fn name(&self) -> &str {
        &self.navigation
    }

    /// The navigation, if it still exists.
    pub fn metadata(&self) -> Option<&Navigation> {
        self.model
            .entity_type(&self.entity)
            .and_then(|et| et.navigation(&self.navigation))
    }

    fn navigation_mut(&mut self) -> Result<&mut Navigation, ModelError> {
        let Self {
            model,
            entity,
            navigation,
        } = self;
        model
            .entity_type_mut(entity)
            .ok_or_else(|| ModelError::EntityTypeNotFound(entity.clone()))?
            .navigation_mut(navigation)
            .ok_or_else(|| ModelError::NavigationNotFound {
                entity: entity.clone(),
                navigation: navigation.clone(),
            })
    }

    /// Probe whether `source` may configure eager loading.
    pub fn can_set_eager_loaded(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|nav| nav.eager_loaded.can_set(source))
    }

    /// Configure whether the navigation is loaded eagerly.
    pub fn eager_loaded(
        &mut self,
        eager: Option<bool>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.navigation_mut()?.eager_loaded.set(eager, source))
    }

    /// Probe whether `source` may associate the backing field.
    pub fn can_set_field(&self, source: ConfigurationSource) -> bool {
        self.metadata().is_some_and(|nav| nav.field.can_set(source))
    }

    /// Associate a backing field member with the navigation.
    pub fn has_field(
        &mut self,
        field: Option<&str>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self
            .navigation_mut()?
            .field
            .set(field.map(str::to_string), source))
    }

    /// Probe whether `source` may configure the access mode.
    pub fn can_set_access_mode(&self, source: ConfigurationSource) -> bool {
        self.metadata()
            .is_some_and(|nav| nav.access_mode.can_set(source))
    }

    /// Configure how the navigation is read and written.
    pub fn access_mode(
        &mut self,
        mode: Option<AccessMode>,
        source: ConfigurationSource,
    ) -> Result<bool, ModelError> {
        Ok(self.navigation_mut()?.access_mode.set(mode, source))
    }
}
