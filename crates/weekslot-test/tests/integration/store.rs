//! Persisted documents written by earlier versions of the tool.

use chrono::Weekday;

use weekslot_test::TestWorkspace;
use weekslot_test::weekslot_schedule::EventCollection;

use crate::helpers::{at, date, quintal, slot_event};

const LEGACY: &str = r#"[
  {
    "title": "Piscine Quintal bain libre",
    "weekday": 1,
    "start_time": [9, 0],
    "end_time": [11, 0],
    "period_start": "2024-01-01T00:00:00+00:00",
    "period_end": "2024-06-30T00:00:00+00:00",
    "section": "Bain libre",
    "notice": null,
    "notice_details": null,
    "first_day": "2024-01-01T00:00:00+00:00",
    "start_datetime": "2024-01-01T09:00:00+00:00",
    "end_datetime": "2024-01-01T11:00:00+00:00",
    "created_at": "2024-01-01T08:00:00-05:00",
    "updated_at": "2024-01-01T08:00:00-05:00"
  }
]"#;

#[test_log::test]
fn test_legacy_document_loads() {
    let workspace = TestWorkspace::new().unwrap();
    let store = workspace.store();
    std::fs::write(store.path_for(&quintal()), LEGACY).unwrap();

    let loaded = store.load(&quintal());

    assert_eq!(loaded.len(), 1);
    let event = &loaded.events()[0];
    assert_eq!(event.weekday(), Weekday::Mon);
    assert_eq!(event.first_day(), date(2024, 1, 1));
    assert_eq!(event.last_day(), date(2024, 6, 30));
    assert_eq!(event.created_at(), at("2024-01-01T08:00:00-05:00"));
    assert_eq!(event.static_hash(), slot_event(Weekday::Mon, "Bain libre", None).static_hash());
}

#[test_log::test]
fn test_legacy_document_reconciles_without_duplicates() {
    let workspace = TestWorkspace::new().unwrap();
    let store = workspace.store();
    std::fs::write(store.path_for(&quintal()), LEGACY).unwrap();

    let mut loaded = store.load(&quintal());
    let report = loaded.upsert_all(
        [slot_event(Weekday::Mon, "Bain libre", None)],
        at("2024-03-13T10:00:00-04:00"),
    );

    assert_eq!(report.unchanged, 1);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_saved_document_carries_derived_fields() {
    let workspace = TestWorkspace::new().unwrap();
    let store = workspace.store();
    let collection = EventCollection::from_events([slot_event(Weekday::Thu, "Longueurs", None)]);

    let path = store.save(&quintal(), &collection).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(value[0]["first_day"], "2024-01-04");
    assert_eq!(value[0]["start_datetime"], "2024-01-04T09:00:00");
    assert_eq!(value[0]["end_datetime"], "2024-01-04T11:00:00");
    assert_eq!(value[0]["last_day"], "2024-06-30");
    assert_eq!(value[0]["created_at"], "2024-01-01T08:00:00-05:00");
}
