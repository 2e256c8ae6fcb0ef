use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{Duration, Local};

use booth_terminal::config::BoothConfig;
use booth_terminal::phase::GameState;
use booth_terminal::run_sheet::kind_label;
use booth_terminal::state::AppState;
use booth_terminal::taxonomy::BroadcastEventType;

#[derive(Debug, serde::Deserialize)]
struct ReplayScript {
    #[serde(default)]
    home: Option<String>,
    #[serde(default)]
    away: Option<String>,
    steps: Vec<ReplayStep>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ReplayStep {
    SetState { state: GameState },
    SetPeriod { period: u32 },
    Advance,
    Rewind,
    EndGame,
    Event { event: BroadcastEventType },
    Note { text: String },
    /// Flags the nth entry in insertion order for the next break.
    Toggle { index: usize },
}

fn load_script(path: &Path) -> anyhow::Result<ReplayScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read replay script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse replay script {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/replay_script.json"));

    let script = load_script(&path)?;

    let mut config = BoothConfig::default();
    if let Some(home) = script.home {
        config.home = home;
    }
    if let Some(away) = script.away {
        config.away = away;
    }
    let mut state = AppState::with_config(&config);

    // One simulated second per step keeps timestamps ordered without sleeping.
    let start = Local::now();
    for (idx, step) in script.steps.into_iter().enumerate() {
        let at = start + Duration::seconds(idx as i64);
        match step {
            ReplayStep::SetState { state: game_state } => {
                state.set_game_state(game_state);
            }
            ReplayStep::SetPeriod { period } => {
                state.set_period(period);
            }
            ReplayStep::Advance => {
                state.advance_phase();
            }
            ReplayStep::Rewind => {
                state.rewind_phase();
            }
            ReplayStep::EndGame => {
                state.end_game();
            }
            ReplayStep::Event { event } => {
                state.log_event(event, Instant::now(), at);
            }
            ReplayStep::Note { text } => {
                state.timeline.note_input = text;
                if state.submit_note(Instant::now(), at).is_none() {
                    state.timeline.note_input.clear();
                    println!("step {idx}: blank note ignored");
                }
            }
            ReplayStep::Toggle { index } => {
                let id = state.timeline.entries().get(index).map(|entry| entry.id);
                if !id.is_some_and(|id| state.timeline.toggle_next_break(id)) {
                    println!("step {idx}: no entry at index {index}");
                }
            }
        }
    }

    println!(
        "{} vs {} | final phase: {}",
        state.context.home,
        state.context.away,
        state.phase.phase_label()
    );
    for group in state.timeline.grouped_view() {
        println!("== {} ==", group.period);
        for entry in group.entries {
            let flag = if entry.in_next_break { " *" } else { "" };
            println!(
                "  {} {:<10} {}{}",
                entry.timestamp,
                kind_label(entry.kind),
                entry.text,
                flag
            );
        }
    }

    let flagged = state.timeline.next_break_entries();
    if !flagged.is_empty() {
        println!("Next break:");
        for entry in flagged {
            println!("  [{}] {}", entry.period, entry.text);
        }
    }
    for line in &state.logs {
        println!("{line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_script_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("replay_script.json");
        let script = load_script(&path).expect("fixture should parse");
        assert_eq!(script.home.as_deref(), Some("BOS"));
        assert_eq!(script.steps.len(), 12);
    }

    #[test]
    fn load_errors_name_the_script() {
        let missing = PathBuf::from("does/not/exist.json");
        let err = load_script(&missing).expect_err("missing file");
        assert!(format!("{err:#}").contains("read replay script does/not/exist.json"));

        let dir = std::env::temp_dir().join(format!("booth_replay_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let bad = dir.join("bad.json");
        fs::write(&bad, "{ \"steps\": [ { \"op\": \"warp\" } ] }").expect("write");
        let err = load_script(&bad).expect_err("unknown op");
        assert!(err.to_string().starts_with("parse replay script"));
        let _ = fs::remove_dir_all(&dir);
    }
}
