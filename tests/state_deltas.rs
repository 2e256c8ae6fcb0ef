use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;

use booth_terminal::card::CardUpdate;
use booth_terminal::content::{ContentKind, ContentPayload, TalkTrack};
use booth_terminal::content_feed::spawn_content_worker;
use booth_terminal::drawer::DrawerTab;
use booth_terminal::fake_content::FakeContentSource;
use booth_terminal::phase::GameState;
use booth_terminal::state::{AppState, Delta, ProviderCommand, apply_delta, apply_delta_at};
use booth_terminal::taxonomy::BroadcastEventType;

fn generate_parts(cmd: &ProviderCommand) -> (u64, u64, ContentKind) {
    match cmd {
        ProviderCommand::Generate {
            card,
            token,
            request,
        } => (*card, *token, request.kind),
    }
}

fn track(title: &str) -> ContentPayload {
    ContentPayload::TalkTrack(TalkTrack {
        title: title.to_string(),
        body: "Body".to_string(),
    })
}

#[test]
fn live_game_logging_scenario() {
    let mut state = AppState::new();
    let now = Instant::now();

    state.advance_phase();
    assert_eq!(state.phase.phase_label(), "1st");
    state.log_event(BroadcastEventType::Goal, now, Local::now());
    assert_eq!(state.toast.message(), Some("Logged Goal (1st)"));

    state.advance_phase();
    state.advance_phase();
    assert_eq!(state.phase.phase_label(), "2nd");
    state.log_event(BroadcastEventType::Penalty, now, Local::now());

    state.timeline.note_input = "Backup goalie warming up".to_string();
    assert!(state.submit_note(now, Local::now()).is_some());
    assert_eq!(state.toast.message(), Some("Note added (2nd)"));

    let groups = state.timeline.grouped_view();
    let periods: Vec<&str> = groups.iter().map(|g| g.period).collect();
    assert_eq!(periods, vec!["1st", "2nd"]);
    assert_eq!(groups[1].entries.len(), 2);

    // Selection follows the newest entry; flag it for the next break.
    assert!(state.toggle_next_break_selected());
    let flagged = state.timeline.next_break_entries();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].text, "Backup goalie warming up");

    assert!(state.logs.iter().any(|l| l.contains("Phase: Pre-Game -> 1st")));
}

#[test]
fn toast_expires_and_newer_toast_wins() {
    let mut state = AppState::new();
    let start = Instant::now();
    state.log_event(BroadcastEventType::Goal, start, Local::now());
    state.log_event(
        BroadcastEventType::BigSave,
        start + Duration::from_secs(2),
        Local::now(),
    );

    // The first toast's deadline has passed but the second one is still showing.
    state.tick(start + Duration::from_millis(3500));
    assert_eq!(state.toast.message(), Some("Logged Big Save (Pre-Game)"));

    state.tick(start + Duration::from_secs(6));
    assert_eq!(state.toast.message(), None);
}

#[test]
fn post_game_tab_locks_until_final() {
    let mut state = AppState::new();
    state.set_game_state(GameState::Live);
    state.set_period(3);

    assert!(!state.activate_tab(DrawerTab::PostGame));
    assert_eq!(state.drawer.router.active(), DrawerTab::TalkTracks);
    assert!(state.logs.iter().any(|l| l.contains("locked")));

    state.activate_tab(DrawerTab::Interview);
    state.cycle_tab_next();
    assert_eq!(state.drawer.router.active(), DrawerTab::TalkTracks);
    state.cycle_tab_prev();
    assert_eq!(state.drawer.router.active(), DrawerTab::Interview);

    // Entering post-game unlocks the tab and fetches its empty cards.
    let cmds = state.end_game();
    assert_eq!(cmds.len(), 1);
    assert_eq!(generate_parts(&cmds[0]).2, ContentKind::PostGame);
    assert!(state.activate_tab(DrawerTab::PostGame));

    // Undoing the final relocks it and the router falls back.
    let cmds = state.rewind_phase();
    assert!(cmds.is_empty());
    assert_eq!(state.drawer.router.active(), DrawerTab::TalkTracks);
}

#[test]
fn initial_requests_skip_locked_tabs() {
    let mut state = AppState::new();
    let cmds = state.initial_requests();
    let kinds: Vec<ContentKind> = cmds.iter().map(|c| generate_parts(c).2).collect();
    assert_eq!(kinds.len(), 7);
    assert!(!kinds.contains(&ContentKind::PostGame));

    // Every card is loading now, so a second pass asks for nothing.
    assert!(state.initial_requests().is_empty());
    assert!(state.regenerate_selected().is_none());
}

#[test]
fn requests_carry_recent_timeline_context() {
    let mut state = AppState::new();
    state.advance_phase();
    for _ in 0..7 {
        state.log_event(BroadcastEventType::Penalty, Instant::now(), Local::now());
    }
    let request = state.build_request(ContentKind::TalkTrack, 0);
    assert_eq!(request.phase, "1st");
    assert_eq!(request.recent_events.len(), 5);
    assert_eq!(request.recent_events[0], "[1st] Penalty");
    assert_eq!(request.home, "HOME");
}

#[test]
fn apply_delta_routes_results_and_drops_stale_ones() {
    let mut state = AppState::new();
    let cmds = state.initial_requests();
    let (card, token, kind) = generate_parts(&cmds[0]);
    assert_eq!(kind, ContentKind::TalkTrack);

    apply_delta_at(
        &mut state,
        Delta::CardFailed {
            kind,
            card,
            token,
            error: "timeout".to_string(),
        },
        Local::now(),
    );
    let view = state.drawer.deck(DrawerTab::TalkTracks).views()[0].clone();
    assert_eq!(view.error.as_deref(), Some("timeout"));
    assert!(!view.loading);
    assert!(state.logs.iter().any(|l| l.contains("[WARN] Talk Track generation failed")));

    // Same token again is stale now that the request has completed.
    apply_delta(
        &mut state,
        Delta::CardReady {
            kind,
            card,
            token,
            payload: track("Too late"),
        },
    );
    assert!(state.logs.iter().any(|l| l.contains("Dropped stale Talk Track")));

    let cmd = state.regenerate_selected().expect("card idle again");
    let (card, token, _) = generate_parts(&cmd);
    apply_delta(
        &mut state,
        Delta::CardReady {
            kind,
            card,
            token,
            payload: track("Hot goalie"),
        },
    );
    let view = state.drawer.deck(DrawerTab::TalkTracks).views()[0].clone();
    assert_eq!(view.title, "Hot goalie");
    assert_eq!(view.error, None);
}

#[test]
fn dismissed_card_ignores_its_response() {
    let mut state = AppState::new();
    let cmds = state.initial_requests();
    let (card, token, kind) = generate_parts(&cmds[0]);
    assert!(state.dismiss_selected());
    assert_eq!(state.drawer.deck(DrawerTab::TalkTracks).card_count(), 2);

    let update = state.drawer.deck_mut(DrawerTab::TalkTracks).apply_result(
        card,
        token,
        Ok(track("ghost")),
        Local::now(),
    );
    assert_eq!(update, CardUpdate::Missing);

    apply_delta(
        &mut state,
        Delta::CardReady {
            kind,
            card,
            token,
            payload: track("ghost"),
        },
    );
    assert!(state.logs.iter().any(|l| l.contains("dismissed card")));
}

#[test]
fn content_worker_round_trip_fills_cards() {
    let mut state = AppState::new();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = Arc::new(FakeContentSource::new(0.0).with_latency(Duration::ZERO));
    let handle = spawn_content_worker(tx, cmd_rx, source, 2);

    let cmds = state.initial_requests();
    let expected = cmds.len();
    for cmd in cmds {
        cmd_tx.send(cmd).expect("worker alive");
    }
    drop(cmd_tx);

    let mut received = 0;
    while received < expected {
        let delta = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker responds");
        if matches!(delta, Delta::CardReady { .. } | Delta::CardFailed { .. }) {
            received += 1;
        }
        apply_delta(&mut state, delta);
    }
    handle.join().expect("worker exits after sender drop");

    for tab in [DrawerTab::TalkTracks, DrawerTab::StatCards, DrawerTab::Interview] {
        let deck = state.drawer.deck(tab);
        for id in deck.ids() {
            assert!(deck.has_content(id), "{tab:?} card {id} still empty");
        }
    }
}

#[test]
fn dispatching_add_card_requests_content_for_new_card() {
    let mut state = AppState::new();
    state.activate_tab(DrawerTab::StatCards);
    let cmd = state.add_card().expect("new card requests content");
    let (card, _, kind) = generate_parts(&cmd);
    assert_eq!(kind, ContentKind::StatCard);
    assert_eq!(state.drawer.deck(DrawerTab::StatCards).card_count(), 4);
    assert!(state.drawer.deck(DrawerTab::StatCards).is_loading(card));
}

#[test]
fn pre_game_goal_then_second_period_goal() {
    let mut state = AppState::new();
    let now = Instant::now();
    state.log_event(BroadcastEventType::Goal, now, Local::now());

    state.set_game_state(GameState::Live);
    state.set_period(2);
    state.log_event(BroadcastEventType::Goal, now, Local::now());

    let groups: Vec<(&str, usize)> = state
        .timeline
        .grouped_view()
        .iter()
        .map(|g| (g.period, g.entries.len()))
        .collect();
    assert_eq!(groups, vec![("Pre-Game", 1), ("2nd", 1)]);
}
