use std::fs;

use chrono::{Local, TimeZone};

use booth_terminal::phase::{GamePhase, GameState};
use booth_terminal::run_sheet::{default_file_name, entry_rows, export_run_sheet};
use booth_terminal::taxonomy::BroadcastEventType;
use booth_terminal::timeline::Timeline;

fn sample_timeline() -> Timeline {
    let when = Local
        .with_ymd_and_hms(2026, 3, 14, 19, 20, 5)
        .single()
        .expect("unambiguous local time");
    let live = GamePhase {
        state: GameState::Live,
        period: 1,
    };
    let mut timeline = Timeline::new();
    let goal = timeline.add_event_entry(BroadcastEventType::Goal, &live, when);
    timeline.add_note("Warmups ran long", &GamePhase::default(), when);
    timeline.toggle_next_break(goal);
    timeline
}

#[test]
fn rows_follow_display_order_with_header() {
    let timeline = sample_timeline();
    let rows = entry_rows(&timeline.display_order());
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "Period");
    assert_eq!(rows[0].len(), 7);

    assert_eq!(rows[1][0], "Pre-Game");
    assert_eq!(rows[1][2], "Note");
    assert_eq!(rows[1][4], "manual");
    assert_eq!(rows[1][5], "");

    assert_eq!(rows[2][0], "1st");
    assert_eq!(rows[2][1], "19:20:05");
    assert_eq!(rows[2][2], "Scoring");
    assert_eq!(rows[2][3], "Goal");
    assert_eq!(rows[2][4], "event_bar");
    assert_eq!(rows[2][5], "yes");
}

#[test]
fn export_writes_workbook_and_reports_counts() {
    let timeline = sample_timeline();
    let dir = std::env::temp_dir().join(format!("booth_run_sheet_{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("sheet.xlsx");

    let report = export_run_sheet(&timeline, &path).expect("export succeeds");
    assert_eq!(report.entries, 2);
    assert_eq!(report.next_break, 1);
    assert!(path.exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn default_file_name_is_timestamped() {
    let at = Local
        .with_ymd_and_hms(2026, 10, 2, 21, 4, 9)
        .single()
        .expect("unambiguous local time");
    assert_eq!(default_file_name(at), "run_sheet_20261002_210409.xlsx");
}
