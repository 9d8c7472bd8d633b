use chrono::{NaiveDate, TimeZone, Utc};
use rcdash_core::{
    export_document, Dataset, Entity, EntityStore, FixedClock, Grant, Lab, MemoryCollectionStore,
    Project, ProjectId, Researcher, ResearcherId, StoreError, ValidationError,
};

type Store = EntityStore<MemoryCollectionStore, FixedClock>;

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

fn empty_store() -> Store {
    let mut store = EntityStore::open(MemoryCollectionStore::new(), clock()).unwrap();
    store.replace_all(Dataset::default()).unwrap();
    store
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn deleting_lab_pi_clears_principal_investigator() {
    let mut store = empty_store();
    store.add(Researcher::with_id("R1", "Dr. Rae One")).unwrap();
    store
        .add(Lab::with_id("L1", "Vision Lab", "").led_by("R1"))
        .unwrap();

    let outcome = store.delete::<Researcher>(&"R1".into()).unwrap();

    assert!(outcome.removed);
    let lab = store.get::<Lab>(&"L1".into()).unwrap();
    assert_eq!(lab.principal_investigator_id, None);
    assert_eq!(outcome.cascade.edited_ids(Lab::KIND), &["L1".to_string()]);
}

#[test]
fn deleting_lab_strips_projects_and_clears_members() {
    let mut store = empty_store();
    store.add(Lab::with_id("L1", "Vision Lab", "")).unwrap();
    store.add(Researcher::with_id("R1", "Member").in_lab("L1")).unwrap();
    let mut project = Project::with_id("P1", "Segmentation", day(2024, 1, 1));
    project.lab_ids = vec!["L1".into()];
    store.add(project).unwrap();

    store.delete::<Lab>(&"L1".into()).unwrap();

    assert!(store.get::<Project>(&"P1".into()).unwrap().lab_ids.is_empty());
    assert_eq!(store.get::<Researcher>(&"R1".into()).unwrap().lab_id, None);
}

#[test]
fn deleting_co_pi_keeps_principal_investigator() {
    let mut store = empty_store();
    for id in ["R2", "R3", "R4"] {
        store.add(Researcher::with_id(id, format!("Dr. {id}"))).unwrap();
    }
    let mut grant = Grant::with_id("G1", "Exascale", "R2", day(2024, 1, 1), day(2026, 1, 1));
    grant.co_pi_ids = vec!["R3".into(), "R4".into()];
    store.add(grant).unwrap();

    store.delete::<Researcher>(&"R3".into()).unwrap();

    let grant = store.get::<Grant>(&"G1".into()).unwrap();
    assert_eq!(grant.co_pi_ids, vec![ResearcherId::from("R4")]);
    assert_eq!(grant.principal_investigator_id, Some("R2".into()));
}

#[test]
fn deleting_project_strips_grant_links_only() {
    let mut store = empty_store();
    store.add(Researcher::with_id("R1", "Dr. Pi")).unwrap();
    store
        .add(Project::with_id("P1", "First", day(2024, 1, 1)))
        .unwrap();
    store
        .add(Project::with_id("P2", "Second", day(2024, 2, 1)))
        .unwrap();
    let mut grant = Grant::with_id("G2", "Shared", "R1", day(2024, 1, 1), day(2025, 1, 1));
    grant.project_ids = vec!["P1".into(), "P2".into()];
    store.add(grant).unwrap();
    let p2_before = store.get::<Project>(&"P2".into()).unwrap().clone();

    store.delete::<Project>(&"P1".into()).unwrap();

    assert_eq!(
        store.get::<Grant>(&"G2".into()).unwrap().project_ids,
        vec![ProjectId::from("P2")]
    );
    assert_eq!(store.get::<Project>(&"P2".into()).unwrap(), &p2_before);
}

#[test]
fn export_then_import_reproduces_every_collection() {
    let mut store = EntityStore::open(MemoryCollectionStore::new(), clock()).unwrap();
    let r3 = ResearcherId::from("r3");
    store.add(Researcher::new("Dr. New Hire").in_lab("l2")).unwrap();
    let note = store.add_note(&r3, "Needs a bigger allocation").unwrap();
    let mut edited = note.clone();
    edited.content = "Needs a bigger GPU allocation".to_string();
    store.update_note(&r3, edited).unwrap();
    let mut grant = Grant::new("Seed fund", "r2", day(2024, 3, 1), day(2025, 3, 1));
    grant.co_pi_ids = vec!["r3".into()];
    grant.project_ids = vec!["p2".into(), "p3".into()];
    grant.amount = 25_000.5;
    store.add(grant).unwrap();
    let mut project = Project::with_id("p4", "Open ended", day(2024, 4, 1));
    project.lab_ids = vec!["l1".into(), "l2".into()];
    store.add(project).unwrap();
    store.delete::<Researcher>(&"r1".into()).unwrap();
    assert!(store
        .list::<Grant>()
        .iter()
        .any(|grant| grant.principal_investigator_id.is_none()));
    let before = store.snapshot().clone();

    let document = export_document(store.snapshot()).unwrap();
    store.replace_all(Dataset::default()).unwrap();
    store.import_document(&document).unwrap();

    assert_eq!(store.snapshot(), &before);
    assert_eq!(store.snapshot().note_count(), before.note_count());
}

#[test]
fn import_with_non_array_collection_leaves_state_untouched() {
    let mut store = EntityStore::open(MemoryCollectionStore::new(), clock()).unwrap();
    let before = store.snapshot().clone();
    let writes = store.backend().write_count();
    let stored_labs = store.backend().get("labs").map(str::to_string);

    let err = store
        .import_document(r#"{ "researchers": "not-an-array" }"#)
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NotAnArray {
            collection: "researchers"
        })
    ));
    assert_eq!(store.snapshot(), &before);
    assert_eq!(store.backend().write_count(), writes);
    assert_eq!(store.backend().get("labs").map(str::to_string), stored_labs);
}
