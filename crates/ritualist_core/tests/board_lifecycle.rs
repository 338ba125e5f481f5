use std::fs;

use chrono::NaiveDate;
use ritualist_core::{
    habit::ToggleSide,
    stats::{overall_consistency, weekly_stats, WeeklyStats, CONSISTENCY_REFERENCE_DAYS},
    storage::{BoardStorage, JsonFileStorage},
    HabitStore,
};
use tempfile::tempdir;

fn september() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 14).expect("valid date")
}

#[test]
fn board_survives_restart_through_json_file() {
    let temp = tempdir().expect("tempdir");
    let storage = JsonFileStorage::in_dir(temp.path());

    let mut store = HabitStore::builder()
        .with_reference_date(september())
        .with_storage(storage.clone())
        .build();
    store.set_title("Autumn rituals").expect("set title");
    store.update_habit_name(1, "Journal").expect("rename");
    store.add_habit().expect("add habit");
    store.toggle_day(1, 3, ToggleSide::Primary).expect("toggle done");
    store.toggle_day(2, 4, ToggleSide::Secondary).expect("toggle missed");
    let before = store.snapshot();
    drop(store);

    let raw = fs::read_to_string(storage.path()).expect("read board file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("board json");
    assert_eq!(json["title"], "Autumn rituals");
    assert_eq!(json["habits"][0]["done"], serde_json::json!([3]));
    assert_eq!(json["habits"][1]["notDone"], serde_json::json!([4]));

    let reopened = HabitStore::builder()
        .with_reference_date(september())
        .with_storage(storage)
        .build();
    assert_eq!(reopened.snapshot(), before);
}

#[test]
fn unreadable_file_falls_back_to_default_board() {
    let temp = tempdir().expect("tempdir");
    let storage = JsonFileStorage::in_dir(temp.path());
    fs::write(storage.path(), "{ broken").expect("write fixture");

    let mut store = HabitStore::builder()
        .with_reference_date(september())
        .with_storage(storage.clone())
        .build();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.habits.len(), 1);

    store.add_habit().expect("save replaces broken record");
    let saved = storage.load().expect("load").expect("record present");
    assert_eq!(saved.habits.len(), 2);
}

#[test]
fn consistency_ignores_live_month_length() {
    let mut store = HabitStore::builder()
        .with_reference_date(september())
        .build();
    store.add_habit().expect("add habit");
    for day in 1..=15 {
        store.toggle_day(1, day, ToggleSide::Primary).expect("toggle");
    }
    let snapshot = store.snapshot();
    let summary = snapshot.summary();

    assert_eq!(snapshot.days_in_month(), 30);
    assert_eq!(summary.consistency, 25);
    assert_eq!(overall_consistency(&snapshot.habits, CONSISTENCY_REFERENCE_DAYS), 25);
    assert_eq!(summary.habits[0].progress, 50);

    let february = store.set_reference_date(NaiveDate::from_ymd_opt(2027, 2, 3).expect("date"));
    let summary = february.summary();
    assert_eq!(summary.consistency, 25);
    assert_eq!(summary.habits[0].progress, 54);
    assert_eq!(summary.weeks.len(), 4);
    assert_eq!(
        weekly_stats(&february.habits[0], 29, 31, february.days_in_month()),
        WeeklyStats::default()
    );
}
