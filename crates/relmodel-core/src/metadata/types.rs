//! Core value vocabularies for the conceptual model.

use serde::Serialize;

/// Scalar data types a property can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Number of digits after decimal point.
        scale: u8,
    },
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
                | ScalarType::Decimal { .. }
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Bytes)
    }
}

/// Declared member of a backing shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeMember {
    /// Member name.
    pub name: String,
    /// Member data type.
    pub ty: ScalarType,
    /// Whether the member admits null at the shape level. A non-nullable
    /// member can never back an optional property.
    pub nullable: bool,
}

/// Optional descriptor of the backing struct behind an entity type.
///
/// Entity types without a shape hold only shadow state; entity types with a
/// shape validate property and backing-field configuration against the
/// declared members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeShape {
    /// Shape (and default entity type) name.
    pub name: String,
    /// Declared members.
    pub members: Vec<ShapeMember>,
}

impl TypeShape {
    /// Create an empty shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a non-nullable member.
    pub fn with_member(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.members.push(ShapeMember {
            name: name.into(),
            ty,
            nullable: false,
        });
        self
    }

    /// Add a nullable member.
    pub fn with_nullable_member(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.members.push(ShapeMember {
            name: name.into(),
            ty,
            nullable: true,
        });
        self
    }

    /// Get a member by name.
    pub fn member(&self, name: &str) -> Option<&ShapeMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// How generated code reads and writes a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    /// Through the member accessor.
    Property,
    /// Through the backing field.
    Field,
    /// Through the backing field during materialization only.
    FieldDuringConstruction,
}

/// When a value is generated by the store rather than supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueGenerated {
    /// Never generated.
    Never,
    /// Generated when the entity is first saved.
    OnAdd,
    /// Generated on every update.
    OnUpdate,
    /// Generated on insert and update.
    OnAddOrUpdate,
}

/// How a configured value participates in a save operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SaveBehavior {
    /// The value is sent to the store.
    Save,
    /// The value is ignored.
    Ignore,
    /// Supplying a value is a caller error.
    Reject,
}

/// Behavior when a referenced entity is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteBehavior {
    /// Delete related entities.
    Cascade,
    /// Prevent deletion if related entities exist.
    Restrict,
    /// Set foreign key to null.
    SetNull,
}

/// A named conversion between the model type and a store representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueConverter {
    /// Converter name, resolved by the (out-of-scope) provider.
    pub name: String,
    /// Scalar type the store sees.
    pub store_type: ScalarType,
}

impl ValueConverter {
    /// Create a converter descriptor.
    pub fn new(name: impl Into<String>, store_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            store_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_checks() {
        assert!(ScalarType::Int32.is_numeric());
        assert!(ScalarType::Decimal {
            precision: 10,
            scale: 2
        }
        .is_numeric());
        assert!(!ScalarType::String.is_numeric());

        assert!(ScalarType::String.is_string_like());
        assert!(ScalarType::Bytes.is_string_like());
        assert!(!ScalarType::Int32.is_string_like());
    }

    #[test]
    fn test_shape_builder() {
        let shape = TypeShape::new("User")
            .with_member("id", ScalarType::Uuid)
            .with_member("name", ScalarType::String)
            .with_nullable_member("email", ScalarType::String);

        assert_eq!(shape.members.len(), 3);
        assert!(!shape.member("id").unwrap().nullable);
        assert!(shape.member("email").unwrap().nullable);
        assert!(shape.member("missing").is_none());
    }
}
