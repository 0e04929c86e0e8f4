//! Multi-pass reconciliation scenarios.

use chrono::{Days, Weekday};

use weekslot_test::weekslot_schedule::{EventCollection, UpsertOutcome};

use crate::helpers::{assert_invariants, at, date, slot_event, windows};

#[test_log::test]
fn test_weekly_notice_toggling_keeps_one_active_version() {
    let mut collection = EventCollection::new();
    let first_pass = at("2024-01-03T10:00:00-05:00");

    for week in 0..10_u64 {
        let now = first_pass + Days::new(week * 7);
        let notice = (week % 2 == 1).then_some("Fermé");
        let batch = [
            slot_event(Weekday::Mon, "Bain libre", notice),
            slot_event(Weekday::Thu, "Longueurs", None),
        ];

        let report = collection.upsert_all(batch, now);

        assert_invariants(&collection);
        assert_eq!(report.ended, 0);
        if week > 0 {
            assert_eq!(report.versioned, 1);
            assert_eq!(report.unchanged, 1);
        }
        let versions = windows(&collection, "Bain libre");
        assert_eq!(versions.len(), usize::try_from(week).unwrap() + 1);
        let active: Vec<_> = versions
            .iter()
            .filter(|(_, last_day)| *last_day == date(2024, 6, 30))
            .collect();
        assert_eq!(active.len(), 1, "week {week}: {versions:?}");
    }

    assert_eq!(windows(&collection, "Longueurs"), vec![(date(2024, 1, 4), date(2024, 6, 30))]);
}

#[test_log::test]
fn test_slot_removed_then_restored() {
    let mut collection = EventCollection::new();
    collection.upsert_all(
        [
            slot_event(Weekday::Mon, "Bain libre", None),
            slot_event(Weekday::Thu, "Longueurs", None),
        ],
        at("2024-01-03T10:00:00-05:00"),
    );

    let report = collection.upsert_all(
        [slot_event(Weekday::Mon, "Bain libre", None)],
        at("2024-02-07T10:00:00-05:00"),
    );
    assert_eq!(report.ended, 1);
    assert_eq!(windows(&collection, "Longueurs"), vec![(date(2024, 1, 4), date(2024, 2, 6))]);

    let report = collection.upsert_all(
        [
            slot_event(Weekday::Mon, "Bain libre", None),
            slot_event(Weekday::Thu, "Longueurs", None),
        ],
        at("2024-02-14T10:00:00-05:00"),
    );
    assert_eq!(report.unchanged, 2);
    assert_eq!(windows(&collection, "Longueurs"), vec![(date(2024, 1, 4), date(2024, 6, 30))]);
    assert_invariants(&collection);
}

#[test_log::test]
fn test_history_expires_after_retention() {
    let mut collection = EventCollection::new();
    collection.upsert_all(
        [slot_event(Weekday::Mon, "Bain libre", None)],
        at("2024-01-03T10:00:00-05:00"),
    );
    collection.upsert_all(
        [slot_event(Weekday::Mon, "Bain libre", Some("Fermé"))],
        at("2024-03-13T10:00:00-04:00"),
    );
    assert_eq!(collection.len(), 2);

    // Both versions end by June 30 2024; two years later they are gone.
    let outcome = collection.upsert(
        slot_event(Weekday::Thu, "Longueurs", None),
        at("2026-07-01T10:00:00-04:00"),
    );

    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert!(windows(&collection, "Bain libre").is_empty());
}
