//! Full passes driven from settings, snapshots on disk and persisted state.

use weekslot_test::TestWorkspace;
use weekslot_test::weekslot_app::AppError;

use crate::helpers::{assert_invariants, at, date, quintal, rosemont, windows, winter_snapshot};

const PLACES: &str = r#"
[runner]
max_parallel = 2

[[places]]
place = "Piscine-Quintal"

[[places]]
place = "piscine-rosemont"
language = "en"

[[places]]
place = "piscine-quintal"
language = "fr"
"#;

#[test_log::test(tokio::test)]
async fn test_season_of_passes() {
    let workspace = TestWorkspace::new().unwrap();
    let settings = workspace.settings(PLACES).unwrap();
    let targets = settings.targets().unwrap();
    assert_eq!(targets, vec![quintal(), rosemont()]);

    workspace.write_snapshot(&quintal(), &winter_snapshot(None)).unwrap();
    workspace.write_snapshot(&rosemont(), &winter_snapshot(None)).unwrap();

    // Opening scrape.
    let summary = workspace
        .runner(&settings, at("2024-01-01T08:00:00-05:00"))
        .run(targets.clone())
        .await;
    assert!(summary.is_success());
    assert_eq!(workspace.store().load(&quintal()).len(), 2);

    // A closure notice appears on the Quintal page only.
    workspace.write_snapshot(&quintal(), &winter_snapshot(Some("Fermé"))).unwrap();
    let summary = workspace
        .runner(&settings, at("2024-03-13T10:00:00-04:00"))
        .run(targets.clone())
        .await;
    assert!(summary.is_success());
    assert_eq!(summary.succeeded[0].1.versioned, 2);
    assert_eq!(summary.succeeded[1].1.unchanged, 2);

    let stored = workspace.store().load(&quintal());
    assert_invariants(&stored);
    assert_eq!(
        windows(&stored, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 3, 12)),
            (date(2024, 3, 18), date(2024, 6, 30)),
        ]
    );

    // Notice lifted, lanes dropped from the page.
    let mut lifted = winter_snapshot(None);
    lifted["sections"]
        .as_array_mut()
        .unwrap()
        .retain(|section| section["name"] != "Longueurs");
    workspace.write_snapshot(&quintal(), &lifted).unwrap();
    let summary = workspace
        .runner(&settings, at("2024-04-03T10:00:00-04:00"))
        .run(targets.clone())
        .await;
    assert!(summary.is_success());
    assert_eq!(summary.succeeded[0].1.versioned, 1);
    assert_eq!(summary.succeeded[0].1.ended, 1);

    let stored = workspace.store().load(&quintal());
    assert_invariants(&stored);
    assert_eq!(
        windows(&stored, "Bain libre"),
        vec![
            (date(2024, 1, 1), date(2024, 3, 12)),
            (date(2024, 3, 18), date(2024, 4, 2)),
            (date(2024, 4, 8), date(2024, 6, 30)),
        ]
    );
    assert_eq!(
        windows(&stored, "Longueurs"),
        vec![
            (date(2024, 1, 4), date(2024, 3, 12)),
            (date(2024, 3, 14), date(2024, 4, 2)),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn test_vanished_page_leaves_state_untouched() {
    let workspace = TestWorkspace::new().unwrap();
    let settings = workspace.settings(PLACES).unwrap();
    let targets = settings.targets().unwrap();
    workspace.write_snapshot(&quintal(), &winter_snapshot(None)).unwrap();
    workspace.write_snapshot(&rosemont(), &winter_snapshot(None)).unwrap();

    workspace
        .runner(&settings, at("2024-01-01T08:00:00-05:00"))
        .run(targets.clone())
        .await;
    let path = workspace.store().path_for(&quintal());
    let before = std::fs::read_to_string(&path).unwrap();

    workspace.remove_snapshot(&quintal()).unwrap();
    let summary = workspace
        .runner(&settings, at("2024-03-13T10:00:00-04:00"))
        .run(targets)
        .await;

    assert!(!summary.is_success());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, quintal());
    assert!(matches!(summary.failed[0].1, AppError::SnapshotIo { .. }));
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test_log::test(tokio::test)]
async fn test_page_without_slots_is_reported() {
    let workspace = TestWorkspace::new().unwrap();
    let settings = workspace.settings(PLACES).unwrap();
    let mut empty = winter_snapshot(None);
    empty["sections"] = serde_json::json!([]);
    workspace.write_snapshot(&quintal(), &empty).unwrap();

    let summary = workspace
        .runner(&settings, at("2024-01-01T08:00:00-05:00"))
        .run([quintal()])
        .await;

    assert!(matches!(summary.failed[0].1, AppError::NoEvents { .. }));
    assert!(!workspace.store().path_for(&quintal()).exists());
}
