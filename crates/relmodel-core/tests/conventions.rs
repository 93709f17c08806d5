//! Integration tests for the convention dispatcher and built-in conventions.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use relmodel_core::convention::{self, EventKind};
use relmodel_core::{
    ConfigurationSource, Convention, ConventionContext, ConventionSet, EntityTypeBuilder, Model,
    ModelBuilder, ModelConfig, ModelError, ModelEvent, ScalarType, SkipNavigationBuilder,
};

/// Records every property-added callback as `label:property`, optionally
/// opening a nested batch that declares one more property the first time it
/// sees `nest_on`.
struct Recorder {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    nest_on: Option<&'static str>,
    stop_on: Option<&'static str>,
}

impl Recorder {
    fn new(label: &'static str, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            label,
            log,
            nest_on: None,
            stop_on: None,
        }
    }
}

impl Convention for Recorder {
    fn name(&self) -> &'static str {
        self.label
    }

    fn process(
        &self,
        model: &mut Model,
        event: &ModelEvent,
        ctx: &mut ConventionContext,
    ) -> Result<(), ModelError> {
        let ModelEvent::PropertyAdded { property, .. } = event else {
            return Ok(());
        };
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.label, property));
        if self.stop_on == Some(property.as_str()) {
            ctx.stop_processing();
        }
        if self.nest_on == Some(property.as_str()) {
            convention::batch(model, |model| {
                EntityTypeBuilder::new(model, "Blog")
                    .property("p3", ScalarType::String, ConfigurationSource::Convention)
                    .map(|_| ())
            })?;
        }
        Ok(())
    }
}

fn recording_model(
    conventions: Vec<Arc<dyn Convention>>,
) -> Model {
    let mut set = ConventionSet::empty();
    for convention in conventions {
        set.add(EventKind::PropertyAdded, convention);
    }
    Model::with_conventions(ModelConfig::default(), set)
}

fn add_property(model: &mut Model, name: &str) {
    EntityTypeBuilder::new(model, "Blog")
        .property(name, ScalarType::String, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
}

#[test]
fn test_batch_defers_and_replays_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c1: Arc<dyn Convention> = Arc::new(Recorder::new("C1", log.clone()));
    let c2: Arc<dyn Convention> = Arc::new(Recorder::new("C2", log.clone()));
    let mut model = recording_model(vec![c1, c2]);
    ModelBuilder::new(&mut model)
        .entity("Blog", ConfigurationSource::Explicit)
        .unwrap();

    convention::batch(&mut model, |model| {
        add_property(model, "p1");
        assert!(model.dispatcher().in_batch());
        // Nothing dispatched while the batch is open.
        add_property(model, "p2");
        Ok(())
    })
    .unwrap();

    assert_eq!(
        *log.borrow(),
        ["C1:p1", "C2:p1", "C1:p2", "C2:p2"]
    );
}

#[test]
fn test_nested_batch_drains_depth_first() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c1: Arc<dyn Convention> = Arc::new(Recorder {
        label: "C1",
        log: log.clone(),
        nest_on: Some("p1"),
        stop_on: None,
    });
    let c2: Arc<dyn Convention> = Arc::new(Recorder::new("C2", log.clone()));
    let mut model = recording_model(vec![c1, c2]);
    ModelBuilder::new(&mut model)
        .entity("Blog", ConfigurationSource::Explicit)
        .unwrap();

    convention::batch(&mut model, |model| {
        add_property(model, "p1");
        add_property(model, "p2");
        Ok(())
    })
    .unwrap();

    // The nested batch raised while C1 handles p1 drains completely before
    // anything else proceeds, and p2 is untouched until afterwards.
    assert_eq!(
        *log.borrow(),
        ["C1:p1", "C1:p3", "C2:p3", "C2:p1", "C1:p2", "C2:p2"]
    );
}

#[test]
fn test_idle_events_dispatch_immediately() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c1: Arc<dyn Convention> = Arc::new(Recorder::new("C1", log.clone()));
    let mut model = recording_model(vec![c1]);
    ModelBuilder::new(&mut model)
        .entity("Blog", ConfigurationSource::Explicit)
        .unwrap();

    add_property(&mut model, "p1");
    assert_eq!(*log.borrow(), ["C1:p1"]);
    assert_eq!(model.dispatcher().pending_events(), 0);
}

#[test]
fn test_short_circuit_affects_single_event_only() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c1: Arc<dyn Convention> = Arc::new(Recorder {
        label: "C1",
        log: log.clone(),
        nest_on: None,
        stop_on: Some("p1"),
    });
    let c2: Arc<dyn Convention> = Arc::new(Recorder::new("C2", log.clone()));
    let mut model = recording_model(vec![c1, c2]);
    ModelBuilder::new(&mut model)
        .entity("Blog", ConfigurationSource::Explicit)
        .unwrap();

    convention::batch(&mut model, |model| {
        add_property(model, "p1");
        add_property(model, "p2");
        Ok(())
    })
    .unwrap();

    // C2 is skipped for p1 but still runs for p2.
    assert_eq!(*log.borrow(), ["C1:p1", "C1:p2", "C2:p2"]);
}

#[test]
fn test_aborted_batch_discards_pending_events() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let c1: Arc<dyn Convention> = Arc::new(Recorder::new("C1", log.clone()));
    let mut model = recording_model(vec![c1]);
    ModelBuilder::new(&mut model)
        .entity("Blog", ConfigurationSource::Explicit)
        .unwrap();

    let result: Result<(), ModelError> = convention::batch(&mut model, |model| {
        add_property(model, "p1");
        Err(ModelError::Configuration("boom".into()))
    });

    assert!(result.is_err());
    assert!(log.borrow().is_empty());
    assert_eq!(model.dispatcher().pending_events(), 0);
    assert!(!model.dispatcher().in_batch());
}

// ---- built-in conventions ----

fn standard_model() -> Model {
    Model::new()
}

fn setup_entity_with_id(model: &mut Model, name: &str) {
    let mut builder = ModelBuilder::new(model);
    let mut entity = builder.entity(name, ConfigurationSource::Explicit).unwrap();
    entity
        .property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
}

#[test]
fn test_key_discovery_promotes_id_property() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "User");

    let user = model.entity_type("User").unwrap();
    let pk = user.primary_key().unwrap();
    assert_eq!(pk.properties(), ["id"]);
    assert_eq!(user.primary_key_source(), Some(ConfigurationSource::Convention));
}

#[test]
fn test_key_discovery_accepts_entity_qualified_name() {
    let mut model = standard_model();
    let mut builder = ModelBuilder::new(&mut model);
    let mut post = builder.entity("BlogPost", ConfigurationSource::Explicit).unwrap();
    post.property("blog_post_id", ScalarType::Int64, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    let pk = model.entity_type("BlogPost").unwrap().primary_key().unwrap();
    assert_eq!(pk.properties(), ["blog_post_id"]);
}

#[test]
fn test_explicit_primary_key_wins_over_discovery() {
    let mut model = standard_model();
    let mut builder = ModelBuilder::new(&mut model);
    let mut user = builder.entity("User", ConfigurationSource::Explicit).unwrap();
    user.property("email", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    user.primary_key(&["email"], ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    // A later `id` property no longer changes the primary key.
    user.property("id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    let pk = model.entity_type("User").unwrap().primary_key().unwrap();
    assert_eq!(pk.properties(), ["email"]);
}

#[test]
fn test_foreign_key_gets_convention_index() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "User");
    setup_entity_with_id(&mut model, "Post");

    let fk = EntityTypeBuilder::new(&mut model, "Post")
        .has_relationship("User", ConfigurationSource::Convention)
        .unwrap()
        .unwrap();

    let post = model.entity_type("Post").unwrap();
    let index = post.find_index(&["user_id"]).unwrap();
    assert_eq!(index.configuration_source(), ConfigurationSource::Convention);

    // The index follows the foreign key's lifetime.
    EntityTypeBuilder::new(&mut model, "Post")
        .remove_foreign_key(fk, ConfigurationSource::Explicit)
        .unwrap();
    assert!(model.entity_type("Post").unwrap().find_index(&["user_id"]).is_none());
}

#[test]
fn test_no_index_when_covered_by_primary_key() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "User");
    let mut builder = ModelBuilder::new(&mut model);
    let mut membership = builder
        .entity("Membership", ConfigurationSource::Explicit)
        .unwrap();
    membership
        .property("user_id", ScalarType::Uuid, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    membership
        .property("role", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    membership
        .primary_key(&["user_id", "role"], ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    membership
        .has_foreign_key("User", &["user_id"], ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    // `user_id` is a prefix of the primary key, so no extra index appears.
    assert!(model
        .entity_type("Membership")
        .unwrap()
        .find_index(&["user_id"])
        .is_none());
}

#[test]
fn test_many_to_many_builds_association_entity_type() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "Post");
    setup_entity_with_id(&mut model, "Tag");

    EntityTypeBuilder::new(&mut model, "Post")
        .skip_navigation("tags", "Tag", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    EntityTypeBuilder::new(&mut model, "Tag")
        .skip_navigation("posts", "Post", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    SkipNavigationBuilder::new(&mut model, "Post", "tags")
        .has_inverse(Some("posts"), ConfigurationSource::Explicit)
        .unwrap();

    // One association entity type with a foreign key to each endpoint.
    let association = model.entity_type("PostTag").expect("association entity type");
    assert!(association.is_association());
    assert_eq!(association.foreign_keys().count(), 2);

    // Composite primary key: left foreign key properties then right.
    let pk = association.primary_key().unwrap();
    assert_eq!(pk.properties(), ["post_id", "tag_id"]);

    // Both skip navigations resolved to foreign keys into the same type.
    let tags = model.entity_type("Post").unwrap().skip_navigation("tags").unwrap();
    let posts = model.entity_type("Tag").unwrap().skip_navigation("posts").unwrap();
    let (left_owner, _) = model.find_foreign_key(tags.foreign_key().unwrap()).unwrap();
    let (right_owner, _) = model.find_foreign_key(posts.foreign_key().unwrap()).unwrap();
    assert_eq!(left_owner.name(), "PostTag");
    assert_eq!(right_owner.name(), "PostTag");

    // Re-triggering is a no-op: both navigations already have foreign keys.
    SkipNavigationBuilder::new(&mut model, "Post", "tags")
        .has_inverse(Some("posts"), ConfigurationSource::Explicit)
        .unwrap();
    assert_eq!(
        model.entity_types().filter(|et| et.is_association()).count(),
        1
    );
}

#[test]
fn test_many_to_many_rolls_back_without_primary_key() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "Post");
    // Tag has no key-discoverable property and no primary key.
    let mut builder = ModelBuilder::new(&mut model);
    let mut tag = builder.entity("Tag", ConfigurationSource::Explicit).unwrap();
    tag.property("name", ScalarType::String, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();

    EntityTypeBuilder::new(&mut model, "Post")
        .skip_navigation("tags", "Tag", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    EntityTypeBuilder::new(&mut model, "Tag")
        .skip_navigation("posts", "Post", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    SkipNavigationBuilder::new(&mut model, "Post", "tags")
        .has_inverse(Some("posts"), ConfigurationSource::Explicit)
        .unwrap();

    // Net effect is a complete no-op.
    assert!(model.entity_type("PostTag").is_none());
    assert_eq!(model.entity_types().count(), 2);
    let tags = model.entity_type("Post").unwrap().skip_navigation("tags").unwrap();
    let posts = model.entity_type("Tag").unwrap().skip_navigation("posts").unwrap();
    assert!(tags.foreign_key().is_none());
    assert!(posts.foreign_key().is_none());
    assert_eq!(model.entity_type("Post").unwrap().foreign_keys().count(), 0);
}

#[test]
fn test_removing_association_foreign_key_collects_entity_type() {
    let mut model = standard_model();
    setup_entity_with_id(&mut model, "Post");
    setup_entity_with_id(&mut model, "Tag");
    EntityTypeBuilder::new(&mut model, "Post")
        .skip_navigation("tags", "Tag", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    EntityTypeBuilder::new(&mut model, "Tag")
        .skip_navigation("posts", "Post", true, ConfigurationSource::Explicit)
        .unwrap()
        .unwrap();
    SkipNavigationBuilder::new(&mut model, "Post", "tags")
        .has_inverse(Some("posts"), ConfigurationSource::Explicit)
        .unwrap();

    let fks: Vec<_> = model
        .entity_type("PostTag")
        .unwrap()
        .foreign_keys()
        .map(|fk| fk.id())
        .collect();
    for fk in fks {
        EntityTypeBuilder::new(&mut model, "PostTag")
            .remove_foreign_key(fk, ConfigurationSource::Explicit)
            .unwrap();
    }

    // The association entity type went with its last foreign key, and the
    // skip navigations were detached.
    assert!(model.entity_type("PostTag").is_none());
    let tags = model.entity_type("Post").unwrap().skip_navigation("tags").unwrap();
    assert!(tags.foreign_key().is_none());
}
