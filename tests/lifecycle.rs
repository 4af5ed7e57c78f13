//! Draft and publish lifecycle through the public `Engine` API.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use folio::adapters::fixed::FixedClock;
use folio::calver::CalVer;
use folio::context::ServiceContext;
use folio::model::{
    Action, CollectionId, InternalFields, RelationType, ResourceFields, ResourceId, ResourcePatch,
};
use folio::ports::Clock;
use folio::tagging::DeleteOutcome;
use folio::{Engine, Error};

fn engine() -> (Engine, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 2, 18, 10, 0, 0).unwrap()));
    let mut ctx = ServiceContext::in_memory(clock.now());
    ctx.clock = Box::new(Arc::clone(&clock));
    (Engine::new(ctx, Path::new("/store")), clock)
}

fn fields(title: &str) -> ResourceFields {
    ResourceFields {
        title: title.into(),
        description: format!("{title} description"),
        resource_type: "dataset".into(),
        identifier: format!("https://example.org/{title}"),
        identifier_type: "URL".into(),
        version_label: String::new(),
    }
}

fn part_of(target: &ResourceId) -> InternalFields {
    InternalFields {
        target_id: target.clone(),
        relation_type: RelationType::IsPartOf.as_str().into(),
        resource_type: "dataset".into(),
    }
}

/// The staged row standing for published resource `original`.
fn staged_for(engine: &Engine, collection: &CollectionId, original: &ResourceId) -> ResourceId {
    let record = engine.record(collection).unwrap();
    let draft = record.require_draft().unwrap();
    let staged = record
        .resources_in(&draft)
        .find(|r| r.original_resource_id.as_ref() == Some(original))
        .map(|r| r.id.clone())
        .expect("staged clone");
    staged
}

/// A collection with one published version holding `a -IsPartOf-> b`.
fn published_pair(engine: &Engine) -> (CollectionId, ResourceId, ResourceId) {
    let c = engine.create_collection("Atlas", "maps").unwrap().id;
    engine.get_or_create_draft(&c).unwrap();
    let a = engine.add_resource(&c, fields("a")).unwrap().id;
    let b = engine.add_resource(&c, fields("b")).unwrap().id;
    engine.add_internal_relation(&c, &a, part_of(&b)).unwrap();
    engine.publish(&c).unwrap();
    (c, a, b)
}

#[test]
fn end_to_end_scenario() {
    let (engine, clock) = engine();
    let c = engine.create_collection("C", "").unwrap().id;
    assert!(engine.list_versions(&c).unwrap().is_empty());

    let d0 = engine.get_or_create_draft(&c).unwrap();
    assert!(d0.created);
    let r1 = engine.add_resource(&c, fields("A")).unwrap();
    assert_eq!(r1.action, Some(Action::Create));

    let v1 = engine.publish(&c).unwrap();
    assert!(v1.published);
    let record = engine.record(&c).unwrap();
    assert_eq!(record.resource(&r1.id).unwrap().action, None);

    clock.advance(Duration::days(1));
    engine.get_or_create_draft(&c).unwrap();
    let r1_staged = staged_for(&engine, &c, &r1.id);
    let record = engine.record(&c).unwrap();
    assert_eq!(record.resource(&r1_staged).unwrap().action, Some(Action::Clone));

    let patch = ResourcePatch { title: Some("B".into()), ..ResourcePatch::default() };
    let edited = engine.edit_resource(&c, &r1_staged, &patch).unwrap();
    assert_eq!(edited.action, Some(Action::Update));

    let v2 = engine.publish(&c).unwrap();
    let record = engine.record(&c).unwrap();
    let r1_now = record.resource(&r1.id).unwrap();
    assert_eq!(r1_now.fields.title, "B");
    assert!(r1_now.in_version(&v2.id));
    assert!(!record.resources.contains_key(&r1_staged));
    assert!(v2.name.parse::<CalVer>().unwrap() > v1.name.parse::<CalVer>().unwrap());
}

#[test]
fn at_most_one_draft_per_collection() {
    let (engine, _) = engine();
    let (c, _, _) = published_pair(&engine);
    for _ in 0..3 {
        engine.get_or_create_draft(&c).unwrap();
    }
    let drafts = engine.list_versions(&c).unwrap().into_iter().filter(|v| !v.published).count();
    assert_eq!(drafts, 1);
}

#[test]
fn publishing_an_unedited_draft_reproduces_the_version() {
    let (engine, _) = engine();
    let (c, _, _) = published_pair(&engine);
    let before = engine.version_snapshot(&c, None).unwrap();

    engine.get_or_create_draft(&c).unwrap();
    let v2 = engine.publish(&c).unwrap();
    let after = engine.version_snapshot(&c, Some(&v2.identifier)).unwrap();

    let ids = |rows: &[folio::model::Resource]| rows.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&after.resources), ids(&before.resources));
    let content = |rows: &[folio::model::Resource]| rows.iter().map(|r| r.fields.clone()).collect::<Vec<_>>();
    assert_eq!(content(&after.resources), content(&before.resources));
    let relations = |s: &folio::engine::VersionSnapshot| {
        s.internal_relations
            .iter()
            .map(|r| (r.id.clone(), r.source_id.clone(), r.fields.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(relations(&after), relations(&before));
    assert!(after.resources.iter().all(|r| r.action.is_none()));
}

#[test]
fn delete_then_restore_rediffs_against_the_original() {
    let (engine, _) = engine();
    let (c, a, b) = published_pair(&engine);
    engine.get_or_create_draft(&c).unwrap();

    let a_staged = staged_for(&engine, &c, &a);
    assert!(matches!(engine.delete_resource(&c, &a_staged).unwrap(), DeleteOutcome::MarkedDeleted(_)));
    assert_eq!(engine.restore_resource(&c, &a_staged).unwrap().action, Some(Action::Clone));

    let b_staged = staged_for(&engine, &c, &b);
    let patch = ResourcePatch { description: Some("changed".into()), ..ResourcePatch::default() };
    engine.edit_resource(&c, &b_staged, &patch).unwrap();
    engine.delete_resource(&c, &b_staged).unwrap();
    assert_eq!(engine.restore_resource(&c, &b_staged).unwrap().action, Some(Action::Update));
}

#[test]
fn dangling_targets_fail_publish_without_side_effects() {
    let (engine, _) = engine();
    let (c, _, b) = published_pair(&engine);
    engine.get_or_create_draft(&c).unwrap();
    let b_staged = staged_for(&engine, &c, &b);
    engine.delete_resource(&c, &b_staged).unwrap();
    let before = engine.record(&c).unwrap();

    let err = engine.publish(&c).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");
    assert_eq!(engine.record(&c).unwrap(), before);
    assert_eq!(engine.list_versions(&c).unwrap().iter().filter(|v| v.published).count(), 1);
}

#[test]
fn self_relations_are_rejected_on_creation() {
    let (engine, _) = engine();
    let c = engine.create_collection("Atlas", "").unwrap().id;
    engine.get_or_create_draft(&c).unwrap();
    let a = engine.add_resource(&c, fields("a")).unwrap().id;
    let err = engine.add_internal_relation(&c, &a, part_of(&a)).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert!(engine.record(&c).unwrap().internal_relations.is_empty());
}

#[test]
fn successive_publishes_increase_the_version_name() {
    let (engine, clock) = engine();
    let (c, _, _) = published_pair(&engine);
    let mut names = vec![engine.list_versions(&c).unwrap()[0].name.clone()];
    for days in [0, 2, 6, 0, 30] {
        clock.advance(Duration::days(days));
        engine.get_or_create_draft(&c).unwrap();
        names.push(engine.publish(&c).unwrap().name);
    }
    let parsed: Vec<CalVer> = names.iter().map(|n| n.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] < w[1]), "{names:?}");
}

#[test]
fn new_revisions_replace_the_resource_in_the_next_version() {
    let (engine, _) = engine();
    let (c, a, _) = published_pair(&engine);
    let v1 = engine.list_versions(&c).unwrap()[0].clone();
    engine.get_or_create_draft(&c).unwrap();

    let a_staged = staged_for(&engine, &c, &a);
    let head = engine.start_new_version(&c, &a_staged).unwrap();
    assert_eq!(head.action, Some(Action::NewVersion));
    let patch = ResourcePatch { version_label: Some("2.0".into()), ..ResourcePatch::default() };
    engine.edit_resource(&c, &head.id, &patch).unwrap();
    let v2 = engine.publish(&c).unwrap();

    let old = engine.version_snapshot(&c, Some(&v1.identifier)).unwrap();
    let new = engine.version_snapshot(&c, Some(&v2.identifier)).unwrap();
    assert!(old.resources.iter().any(|r| r.id == a));
    assert!(new.resources.iter().all(|r| r.id != a));
    let promoted = new.resources.iter().find(|r| r.id == head.id).unwrap();
    assert_eq!(promoted.back_link_id.as_ref(), Some(&a));
    assert_eq!(promoted.fields.version_label, "2.0");
}
