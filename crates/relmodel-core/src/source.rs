//! Configuration-source precedence tracking.
//!
//! Every piece of metadata in the model records which kind of input last set
//! it: an automated convention, a data annotation, or explicit user
//! configuration. Later writes are adjudicated against that record so a
//! lower-priority source never silently clobbers a higher-priority one.

use serde::Serialize;

/// The provenance of a metadata value, ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ConfigurationSource {
    /// Set by an automated convention.
    Convention,
    /// Set by a data annotation on the backing type.
    DataAnnotation,
    /// Set by explicit user configuration.
    Explicit,
}

impl ConfigurationSource {
    /// Whether a write from this source may replace a value recorded at
    /// `existing`. Ties are allowed so re-application by the same source
    /// succeeds; an unset source is overridden by anything.
    pub fn overrides(self, existing: Option<ConfigurationSource>) -> bool {
        match existing {
            None => true,
            Some(other) => self >= other,
        }
    }

    /// Whether this is explicit user configuration.
    pub fn is_explicit(self) -> bool {
        self == ConfigurationSource::Explicit
    }

    /// The stronger of this source and an optional recorded one.
    pub fn max(self, other: Option<ConfigurationSource>) -> ConfigurationSource {
        match other {
            Some(other) if other > self => other,
            _ => self,
        }
    }
}

/// A configurable attribute paired with the source that last set it.
///
/// This is the single implementation of the precedence gate: builders compose
/// one `Tracked` per configurable attribute instead of re-deriving the check
/// per field. Clearing the value (a `None` write at sufficient precedence)
/// also clears the recorded source, reverting the attribute to its
/// convention default.
#[derive(Debug, Clone, Serialize)]
pub struct Tracked<T> {
    value: Option<T>,
    source: Option<ConfigurationSource>,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            value: None,
            source: None,
        }
    }
}

impl<T> Tracked<T> {
    /// An unset attribute.
    pub fn unset() -> Self {
        Self::default()
    }

    /// The configured value, if any.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The recorded configuration source, if the attribute was ever set.
    pub fn source(&self) -> Option<ConfigurationSource> {
        self.source
    }

    /// Whether a value is currently configured.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// The recorded (value, source) pair, used when replaying configuration
    /// onto a re-parented definition.
    pub fn recorded(&self) -> Option<(&T, ConfigurationSource)> {
        match (&self.value, self.source) {
            (Some(value), Some(source)) => Some((value, source)),
            _ => None,
        }
    }

    /// Side-effect-free precedence probe for a write from `source`.
    pub fn can_set(&self, source: ConfigurationSource) -> bool {
        source.overrides(self.source)
    }

    /// Clear value and source unconditionally. Used by referential-integrity
    /// cascades, where the referenced metadata is being removed and the gate
    /// does not apply.
    pub(crate) fn force_clear(&mut self) {
        self.value = None;
        self.source = None;
    }

    /// Apply a write from `source`. Returns `false` and mutates nothing when
    /// the gate rejects it. A `None` value clears both the value and the
    /// recorded source.
    pub fn set(&mut self, value: Option<T>, source: ConfigurationSource) -> bool {
        if !self.can_set(source) {
            return false;
        }
        match value {
            Some(value) => {
                self.value = Some(value);
                self.source = Some(source);
            }
            None => {
                self.value = None;
                self.source = None;
            }
        }
        true
    }
}

impl<T: Copy> Tracked<T> {
    /// The configured value, or `default` when unset.
    pub fn get_or(&self, default: T) -> T {
        self.value.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ordering() {
        assert!(ConfigurationSource::Explicit > ConfigurationSource::DataAnnotation);
        assert!(ConfigurationSource::DataAnnotation > ConfigurationSource::Convention);
    }

    #[test]
    fn test_overrides_unset() {
        assert!(ConfigurationSource::Convention.overrides(None));
        assert!(ConfigurationSource::Explicit.overrides(None));
    }

    #[test]
    fn test_overrides_ties() {
        assert!(ConfigurationSource::Convention.overrides(Some(ConfigurationSource::Convention)));
        assert!(!ConfigurationSource::Convention
            .overrides(Some(ConfigurationSource::DataAnnotation)));
        assert!(ConfigurationSource::Explicit.overrides(Some(ConfigurationSource::DataAnnotation)));
    }

    #[test]
    fn test_monotonic_precedence() {
        let mut attr = Tracked::unset();

        assert!(attr.set(Some(1), ConfigurationSource::Convention));
        assert_eq!(attr.get(), Some(&1));
        assert_eq!(attr.source(), Some(ConfigurationSource::Convention));

        assert!(attr.set(Some(2), ConfigurationSource::DataAnnotation));
        assert_eq!(attr.get(), Some(&2));
        assert_eq!(attr.source(), Some(ConfigurationSource::DataAnnotation));

        // A lower source is rejected and leaves value and source unchanged.
        assert!(!attr.set(Some(3), ConfigurationSource::Convention));
        assert_eq!(attr.get(), Some(&2));
        assert_eq!(attr.source(), Some(ConfigurationSource::DataAnnotation));
    }

    #[test]
    fn test_idempotent_reapplication() {
        let mut attr = Tracked::unset();
        assert!(attr.set(Some("a"), ConfigurationSource::DataAnnotation));
        assert!(attr.set(Some("a"), ConfigurationSource::DataAnnotation));
        assert_eq!(attr.source(), Some(ConfigurationSource::DataAnnotation));
    }

    #[test]
    fn test_same_source_may_change_value() {
        let mut attr = Tracked::unset();
        assert!(attr.set(Some(true), ConfigurationSource::DataAnnotation));
        assert!(attr.set(Some(false), ConfigurationSource::DataAnnotation));
        assert_eq!(attr.get(), Some(&false));
    }

    #[test]
    fn test_clear_resets_source() {
        let mut attr = Tracked::unset();
        assert!(attr.set(Some(7), ConfigurationSource::DataAnnotation));

        // Clearing from below is rejected.
        assert!(!attr.set(None, ConfigurationSource::Convention));
        assert!(attr.is_set());

        // Clearing at or above the recorded source removes value and source.
        assert!(attr.set(None, ConfigurationSource::DataAnnotation));
        assert_eq!(attr.get(), None);
        assert_eq!(attr.source(), None);

        // The attribute is writable by anything again.
        assert!(attr.set(Some(9), ConfigurationSource::Convention));
    }
}
