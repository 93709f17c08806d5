//! Integration tests for builders and configuration-source tracking.

use relmodel_core::{
    ConfigurationSource, ConventionSet, EntityTypeBuilder, Model, ModelBuilder, ModelConfig,
    ModelError, PropertyBuilder, ScalarType, TypeShape,
};

/// A model with no conventions registered, so tests observe builder
/// behavior in isolation.
fn bare_model() -> Model {
    Model::with_conventions(ModelConfig::default(), ConventionSet::empty())
}

fn setup_blog_model(model: &mut Model) {
    let mut builder = ModelBuilder::new(model);

    let mut user = builder.entity("User", ConfigurationSource::Explicit).unwrap();
    user.property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap();
    user.property("email", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap();
    user.primary_key(&["id"], ConfigurationSource::Explicit)
        .unwrap();

    let mut post = builder.entity("Post", ConfigurationSource::Explicit).unwrap();
    post.property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap();
    post.property("title", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap();
    post.primary_key(&["id"], ConfigurationSource::Explicit)
        .unwrap();
}

#[test]
fn test_monotonic_precedence_on_nullability() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut email = PropertyBuilder::new(&mut model, "User", "email");

    // Starts nullable with no recorded source.
    assert!(email.metadata().unwrap().is_nullable());
    assert_eq!(email.metadata().unwrap().nullability_source(), None);

    // A data annotation makes it required.
    assert!(email
        .is_required(Some(true), ConfigurationSource::DataAnnotation)
        .unwrap());
    assert!(!email.metadata().unwrap().is_nullable());
    assert_eq!(
        email.metadata().unwrap().nullability_source(),
        Some(ConfigurationSource::DataAnnotation)
    );

    // A convention cannot relax it.
    assert!(!email
        .is_required(Some(false), ConfigurationSource::Convention)
        .unwrap());
    assert!(!email.metadata().unwrap().is_nullable());
    assert_eq!(
        email.metadata().unwrap().nullability_source(),
        Some(ConfigurationSource::DataAnnotation)
    );

    // The same source can.
    assert!(email
        .is_required(Some(false), ConfigurationSource::DataAnnotation)
        .unwrap());
    assert!(email.metadata().unwrap().is_nullable());
}

#[test]
fn test_idempotent_reapplication() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut email = PropertyBuilder::new(&mut model, "User", "email");

    assert!(email
        .is_required(Some(true), ConfigurationSource::DataAnnotation)
        .unwrap());
    assert!(email
        .is_required(Some(true), ConfigurationSource::DataAnnotation)
        .unwrap());
    assert_eq!(
        email.metadata().unwrap().nullability_source(),
        Some(ConfigurationSource::DataAnnotation)
    );
}

#[test]
fn test_clear_resets_recorded_source() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut email = PropertyBuilder::new(&mut model, "User", "email");

    assert!(email
        .is_required(Some(true), ConfigurationSource::DataAnnotation)
        .unwrap());

    // Clearing from below is rejected.
    assert!(!email.is_required(None, ConfigurationSource::Convention).unwrap());
    assert!(!email.metadata().unwrap().is_nullable());

    // Clearing at the recorded source removes value and source, and the
    // attribute is writable by a convention again.
    assert!(email
        .is_required(None, ConfigurationSource::DataAnnotation)
        .unwrap());
    assert!(email.metadata().unwrap().is_nullable());
    assert_eq!(email.metadata().unwrap().nullability_source(), None);
    assert!(email
        .is_required(Some(true), ConfigurationSource::Convention)
        .unwrap());
}

#[test]
fn test_explicit_incompatible_nullability_is_hard_error() {
    let mut model = bare_model();
    let shape = TypeShape::new("Account")
        .with_member("id", ScalarType::Uuid)
        .with_nullable_member("alias", ScalarType::String);
    ModelBuilder::new(&mut model)
        .entity_with_shape(shape, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap()
        .property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap();

    let mut id = PropertyBuilder::new(&mut model, "Account", "id");
    assert!(!id.metadata().unwrap().is_nullable());

    // A lower-precedence source probing the same change fails silently.
    assert!(!id
        .is_required(Some(false), ConfigurationSource::DataAnnotation)
        .unwrap());

    // The user forcing it is a configuration error.
    let err = id
        .is_required(Some(false), ConfigurationSource::Explicit)
        .unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_has_field_validates_against_shape() {
    let mut model = bare_model();
    let shape = TypeShape::new("Account")
        .with_nullable_member("alias", ScalarType::String)
        .with_nullable_member("alias_storage", ScalarType::String);
    ModelBuilder::new(&mut model)
        .entity_with_shape(shape, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap()
        .property("alias", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap();

    let mut alias = PropertyBuilder::new(&mut model, "Account", "alias");
    assert!(alias
        .has_field(Some("alias_storage"), ConfigurationSource::DataAnnotation)
        .unwrap());
    assert_eq!(alias.metadata().unwrap().field(), Some("alias_storage"));

    // Unknown member: silent below Explicit, hard error at Explicit.
    assert!(!alias
        .has_field(Some("missing"), ConfigurationSource::DataAnnotation)
        .unwrap());
    let err = alias
        .has_field(Some("missing"), ConfigurationSource::Explicit)
        .unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_has_key_requires_resolvable_properties() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut user = EntityTypeBuilder::new(&mut model, "User");

    assert!(user
        .has_key(&["missing"], ConfigurationSource::Convention)
        .unwrap()
        .is_none());
    let err = user
        .has_key(&["missing"], ConfigurationSource::Explicit)
        .unwrap_err();
    assert!(matches!(err, ModelError::PropertyNotFound { .. }));
}

#[test]
fn test_primary_key_precedence() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut user = EntityTypeBuilder::new(&mut model, "User");

    // Explicit primary key over email replaces the one from setup.
    let key = user
        .primary_key(&["email"], ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    assert_eq!(user.metadata().unwrap().primary_key_id(), Some(key));

    // A convention cannot take it back.
    assert!(user
        .primary_key(&["id"], ConfigurationSource::Convention)
        .unwrap()
        .is_none());
    assert_eq!(user.metadata().unwrap().primary_key_id(), Some(key));
}

#[test]
fn test_has_relationship_derives_shadow_properties() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let mut post = EntityTypeBuilder::new(&mut model, "Post");

    let fk = post
        .has_relationship("User", ConfigurationSource::Convention)
        .unwrap()
        .unwrap();

    let post_meta = model.entity_type("Post").unwrap();
    let fk_meta = post_meta.foreign_key(fk).unwrap();
    assert_eq!(fk_meta.properties(), ["user_id"]);
    assert_eq!(fk_meta.principal_entity(), "User");

    let user_id = post_meta.property("user_id").unwrap();
    assert!(user_id.is_shadow());
    assert_eq!(user_id.scalar_type(), ScalarType::Uuid);
}

#[test]
fn test_has_relationship_rolls_back_without_principal_key() {
    let mut model = bare_model();
    let mut builder = ModelBuilder::new(&mut model);
    builder.entity("Tag", ConfigurationSource::Explicit).unwrap();
    builder.entity("Post", ConfigurationSource::Explicit).unwrap();

    let mut post = EntityTypeBuilder::new(&mut model, "Post");
    assert!(post
        .has_relationship("Tag", ConfigurationSource::Convention)
        .unwrap()
        .is_none());

    // No stray shadow properties, no foreign keys.
    let post_meta = model.entity_type("Post").unwrap();
    assert_eq!(post_meta.properties().count(), 0);
    assert_eq!(post_meta.foreign_keys().count(), 0);
}

#[test]
fn test_remove_key_cascades_to_foreign_keys() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    EntityTypeBuilder::new(&mut model, "Post")
        .has_relationship("User", ConfigurationSource::Convention)
        .unwrap()
        .unwrap();

    let user_pk = model.entity_type("User").unwrap().primary_key_id().unwrap();
    assert!(EntityTypeBuilder::new(&mut model, "User")
        .remove_key(user_pk, ConfigurationSource::Explicit)
        .unwrap());

    assert!(model.entity_type("User").unwrap().primary_key_id().is_none());
    assert_eq!(model.entity_type("Post").unwrap().foreign_keys().count(), 0);
}

#[test]
fn test_remove_entity_type_detaches_references() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let fk = EntityTypeBuilder::new(&mut model, "Post")
        .has_relationship("User", ConfigurationSource::Convention)
        .unwrap()
        .unwrap();
    EntityTypeBuilder::new(&mut model, "Post")
        .navigation("author", fk, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    assert!(ModelBuilder::new(&mut model)
        .remove_entity_type("User", ConfigurationSource::Explicit)
        .unwrap());

    assert!(model.entity_type("User").is_none());
    let post = model.entity_type("Post").unwrap();
    assert_eq!(post.foreign_keys().count(), 0);
    assert!(post.navigation("author").is_none());
}

#[test]
fn test_remove_is_gated_by_configuration_source() {
    let mut model = bare_model();
    setup_blog_model(&mut model);

    // The entity type was declared explicitly; a convention cannot drop it.
    assert!(!ModelBuilder::new(&mut model)
        .remove_entity_type("User", ConfigurationSource::Convention)
        .unwrap());
    assert!(model.entity_type("User").is_some());
}

#[test]
fn test_navigation_targets_principal_from_dependent() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    let fk = EntityTypeBuilder::new(&mut model, "Post")
        .has_relationship("User", ConfigurationSource::Convention)
        .unwrap()
        .unwrap();

    EntityTypeBuilder::new(&mut model, "Post")
        .navigation("author", fk, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    EntityTypeBuilder::new(&mut model, "User")
        .navigation("posts", fk, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    let author = model.entity_type("Post").unwrap().navigation("author").unwrap();
    assert_eq!(author.target(), "User");
    assert!(author.is_on_dependent());

    let posts = model.entity_type("User").unwrap().navigation("posts").unwrap();
    assert_eq!(posts.target(), "Post");
    assert!(!posts.is_on_dependent());
}

#[test]
fn test_attach_preserves_recorded_sources() {
    let mut model = bare_model();
    setup_blog_model(&mut model);
    ModelBuilder::new(&mut model)
        .entity("Archive", ConfigurationSource::Explicit)
        .unwrap();

    let mut email = PropertyBuilder::new(&mut model, "User", "email");
    email
        .is_required(Some(true), ConfigurationSource::DataAnnotation)
        .unwrap();
    email
        .concurrency_token(Some(true), ConfigurationSource::Explicit)
        .unwrap();

    email.attach("Archive").unwrap().unwrap();

    assert!(model.entity_type("User").unwrap().property("email").is_none());
    let moved = model.entity_type("Archive").unwrap().property("email").unwrap();
    assert!(!moved.is_nullable());
    assert_eq!(
        moved.nullability_source(),
        Some(ConfigurationSource::DataAnnotation)
    );
    assert!(moved.is_concurrency_token());
    // Attributes never recorded stay at their defaults with no source.
    assert!(moved.field().is_none());
    assert_eq!(moved.configuration_source(), ConfigurationSource::Explicit);
}

#[test]
fn test_base_type_inheritance_and_cycles() {
    let mut model = bare_model();
    let mut builder = ModelBuilder::new(&mut model);
    let mut base = builder.entity("Content", ConfigurationSource::Explicit).unwrap();
    base.property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap();
    builder.entity("Article", ConfigurationSource::Explicit).unwrap();

    let mut article = EntityTypeBuilder::new(&mut model, "Article");
    assert!(article
        .has_base_type(Some("Content"), ConfigurationSource::Explicit)
        .unwrap());

    // Inherited properties resolve through the base chain and can carry a
    // key on the derived type.
    assert!(model.find_property("Article", "id").is_some());
    assert!(EntityTypeBuilder::new(&mut model, "Article")
        .has_key(&["id"], ConfigurationSource::Explicit)
        .unwrap()
        .is_some());

    // The reverse edge would create a cycle.
    let err = EntityTypeBuilder::new(&mut model, "Content")
        .has_base_type(Some("Article"), ConfigurationSource::Explicit)
        .unwrap_err();
    assert!(matches!(err, ModelError::Configuration(_)));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let mut model = bare_model();
    setup_blog_model(&mut model);

    let json = model.to_json().unwrap();
    assert!(json.contains("\"User\""));
    assert!(json.contains("\"Post\""));
    assert!(json.contains("\"email\""));
}
