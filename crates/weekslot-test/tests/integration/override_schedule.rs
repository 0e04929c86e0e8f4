//! Special-period schedules read from snapshots and reconciled over time.

use serde_json::json;

use weekslot_test::TestWorkspace;
use weekslot_test::weekslot_app::runner::BatchSource;
use weekslot_test::weekslot_app::snapshot::SnapshotSource;
use weekslot_test::weekslot_schedule::EventCollection;

use crate::helpers::{assert_invariants, at, date, quintal, row, windows};

fn with_spring_break() -> serde_json::Value {
    json!({
        "title": "Piscine Quintal",
        "season_from": "2024-01-01",
        "season_to": "2024-06-30",
        "sections": [
            { "name": "Bain libre", "rows": [row("lundi", "09:00", "11:00"), row("jeudi", "09:00", "11:00")] }
        ],
        "special_periods": [
            {
                "name": "Relâche",
                "from": "2024-03-04",
                "to": "2024-03-10",
                "rows": [row("lundi", "13:00", "16:00"), row("jeudi", "13:00", "16:00")]
            }
        ]
    })
}

#[test_log::test]
fn test_special_period_fragments_are_distinct_versions() {
    let workspace = TestWorkspace::new().unwrap();
    workspace.write_snapshot(&quintal(), &with_spring_break()).unwrap();
    let source = SnapshotSource::new(workspace.input_dir());
    let mut collection = EventCollection::new();

    let now = at("2024-01-01T08:00:00-05:00");
    let report = collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    assert_eq!(report.inserted, 6);
    assert_invariants(&collection);
    assert_eq!(
        windows(&collection, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 3, 3)),
            (date(2024, 1, 4), date(2024, 3, 3)),
            (date(2024, 3, 11), date(2024, 6, 30)),
            (date(2024, 3, 14), date(2024, 6, 30)),
        ]
    );
    assert_eq!(
        windows(&collection, "Relâche"),
        vec![
            (date(2024, 3, 4), date(2024, 3, 10)),
            (date(2024, 3, 7), date(2024, 3, 10)),
        ]
    );

    // Rescraping the same page during the break changes nothing.
    let now = at("2024-03-06T10:00:00-05:00");
    let report = collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    assert_eq!(report.unchanged, 6);
    assert_eq!(report.inserted + report.versioned + report.ended, 0);
    assert_eq!(collection.len(), 6);
}

#[test_log::test]
fn test_special_period_announced_mid_season() {
    let workspace = TestWorkspace::new().unwrap();
    let mut regular = with_spring_break();
    regular["special_periods"] = json!([]);
    workspace.write_snapshot(&quintal(), &regular).unwrap();
    let source = SnapshotSource::new(workspace.input_dir());
    let mut collection = EventCollection::new();

    let now = at("2024-01-01T08:00:00-05:00");
    collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);
    assert_eq!(collection.len(), 2);

    workspace.write_snapshot(&quintal(), &with_spring_break()).unwrap();
    let now = at("2024-02-14T10:00:00-05:00");
    let report = collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    // Early fragments shorten the stored slots; late fragments no longer
    // overlap them and start fresh.
    assert_eq!(report.unchanged, 2);
    assert_eq!(report.inserted, 4);
    assert_eq!(report.ended, 0);
    assert_invariants(&collection);
    assert_eq!(
        windows(&collection, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 3, 3)),
            (date(2024, 1, 4), date(2024, 3, 3)),
            (date(2024, 3, 11), date(2024, 6, 30)),
            (date(2024, 3, 14), date(2024, 6, 30)),
        ]
    );
    assert!(
        collection
            .iter()
            .filter(|event| event.first_day() < date(2024, 3, 4))
            .all(|event| event.updated_at() == now)
    );
}

fn free_swim_covers_break(collection: &EventCollection) -> bool {
    windows(collection, "Bain libre")
        .iter()
        .any(|(first, last)| *first <= date(2024, 3, 10) && *last >= date(2024, 3, 4))
}

#[test_log::test]
fn test_notice_after_break_keeps_break_carved_out() {
    let workspace = TestWorkspace::new().unwrap();
    workspace.write_snapshot(&quintal(), &with_spring_break()).unwrap();
    let source = SnapshotSource::new(workspace.input_dir());
    let mut collection = EventCollection::new();

    let now = at("2024-01-01T08:00:00-05:00");
    collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    let mut closed = with_spring_break();
    closed["notice"] = json!("Fermé");
    workspace.write_snapshot(&quintal(), &closed).unwrap();
    let now = at("2024-03-20T10:00:00-04:00");
    let report = collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    // Fragments that ended before today keep their window; only the
    // after-break fragments get a new version.
    assert_eq!(report.versioned, 6);
    assert_invariants(&collection);
    assert!(!free_swim_covers_break(&collection));
    assert_eq!(
        windows(&collection, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 3, 3)),
            (date(2024, 1, 4), date(2024, 3, 3)),
            (date(2024, 3, 11), date(2024, 3, 19)),
            (date(2024, 3, 14), date(2024, 3, 19)),
            (date(2024, 3, 21), date(2024, 6, 30)),
            (date(2024, 3, 25), date(2024, 6, 30)),
        ]
    );
    assert_eq!(
        windows(&collection, "Relâche"),
        vec![
            (date(2024, 3, 4), date(2024, 3, 10)),
            (date(2024, 3, 7), date(2024, 3, 10)),
        ]
    );
}

#[test_log::test]
fn test_notice_before_break_then_lifted_after_it() {
    let workspace = TestWorkspace::new().unwrap();
    workspace.write_snapshot(&quintal(), &with_spring_break()).unwrap();
    let source = SnapshotSource::new(workspace.input_dir());
    let mut collection = EventCollection::new();

    let now = at("2024-01-01T08:00:00-05:00");
    collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    let mut closed = with_spring_break();
    closed["notice"] = json!("Fermé");
    workspace.write_snapshot(&quintal(), &closed).unwrap();
    let now = at("2024-01-15T10:00:00-05:00");
    let report = collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    assert_eq!(report.versioned, 6);
    assert_invariants(&collection);
    assert!(!free_swim_covers_break(&collection));
    assert_eq!(
        windows(&collection, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 1, 14)),
            (date(2024, 1, 4), date(2024, 1, 14)),
            (date(2024, 1, 15), date(2024, 3, 3)),
            (date(2024, 1, 18), date(2024, 3, 3)),
            (date(2024, 3, 11), date(2024, 6, 30)),
            (date(2024, 3, 14), date(2024, 6, 30)),
        ]
    );

    workspace.write_snapshot(&quintal(), &with_spring_break()).unwrap();
    let now = at("2024-03-20T10:00:00-04:00");
    collection.upsert_all(source.fetch(&quintal(), now).unwrap(), now);

    assert_invariants(&collection);
    assert!(!free_swim_covers_break(&collection));
    assert_eq!(
        windows(&collection, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 1, 14)),
            (date(2024, 1, 4), date(2024, 1, 14)),
            (date(2024, 1, 15), date(2024, 3, 3)),
            (date(2024, 1, 18), date(2024, 3, 3)),
            (date(2024, 3, 11), date(2024, 3, 19)),
            (date(2024, 3, 14), date(2024, 3, 19)),
            (date(2024, 3, 21), date(2024, 6, 30)),
            (date(2024, 3, 25), date(2024, 6, 30)),
        ]
    );
    assert_eq!(
        windows(&collection, "Relâche"),
        vec![
            (date(2024, 3, 4), date(2024, 3, 10)),
            (date(2024, 3, 7), date(2024, 3, 10)),
        ]
    );
}
