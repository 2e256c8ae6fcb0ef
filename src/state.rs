use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use chrono::{DateTime, Local};

use crate::card::{CardId, CardUpdate, RequestToken};
use crate::clipboard::{ClipboardChain, CopyOutcome};
use crate::config::BoothConfig;
use crate::content::{ContentKind, ContentPayload, ContentRequest};
use crate::drawer::{DRAWER_TABS, Drawer, DrawerTab};
use crate::flash::TimedFlash;
use crate::phase::{GamePhase, GameState, PhaseTracker};
use crate::taxonomy::BroadcastEventType;
use crate::timeline::{EntryId, Timeline};

const RECENT_CONTEXT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Timeline,
    Drawer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Note,
}

/// Identifiers and names sent with every content request.
#[derive(Debug, Clone, Default)]
pub struct GameContext {
    pub team_id: Option<String>,
    pub game_id: Option<String>,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone)]
pub enum Delta {
    CardReady {
        kind: ContentKind,
        card: CardId,
        token: RequestToken,
        payload: ContentPayload,
    },
    CardFailed {
        kind: ContentKind,
        card: CardId,
        token: RequestToken,
        error: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Generate {
        card: CardId,
        token: RequestToken,
        request: ContentRequest,
    },
}

#[derive(Debug)]
pub struct AppState {
    pub phase: PhaseTracker,
    pub timeline: Timeline,
    pub drawer: Drawer,
    pub context: GameContext,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub timeline_selected: usize,
    pub toast: TimedFlash,
    pub toast_ttl: Duration,
    pub copy_confirm_ttl: Duration,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(&BoothConfig::default())
    }

    pub fn with_config(config: &BoothConfig) -> Self {
        Self {
            phase: PhaseTracker::new(),
            timeline: Timeline::new(),
            drawer: Drawer::with_default_slots(),
            context: GameContext {
                team_id: config.team_id.clone(),
                game_id: config.game_id.clone(),
                home: config.home.clone(),
                away: config.away.clone(),
            },
            focus: Focus::Timeline,
            input_mode: InputMode::Normal,
            timeline_selected: 0,
            toast: TimedFlash::new(),
            toast_ttl: config.toast_ttl,
            copy_confirm_ttl: config.copy_confirm_ttl,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn game_phase(&self) -> GamePhase {
        self.phase.phase()
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.toast.tick(now);
        self.drawer.tick(now);
    }

    pub fn log_event(
        &mut self,
        event: BroadcastEventType,
        now: Instant,
        at: DateTime<Local>,
    ) -> EntryId {
        let phase = self.game_phase();
        let id = self.timeline.add_event_entry(event, &phase, at);
        self.toast.show(
            format!("Logged {} ({})", event.label(), phase.label()),
            now,
            self.toast_ttl,
        );
        self.follow_latest();
        id
    }

    pub fn submit_note(&mut self, now: Instant, at: DateTime<Local>) -> Option<EntryId> {
        let phase = self.game_phase();
        let id = self.timeline.submit_note_input(&phase, at)?;
        self.toast.show(format!("Note added ({})", phase.label()), now, self.toast_ttl);
        self.follow_latest();
        Some(id)
    }

    /// Moves the timeline selection onto the newest entry, wherever its group sits.
    pub fn follow_latest(&mut self) {
        let Some(latest) = self.timeline.latest() else {
            return;
        };
        if let Some(pos) = self
            .timeline
            .display_order()
            .iter()
            .position(|entry| entry.id == latest)
        {
            self.timeline_selected = pos;
        }
    }

    pub fn selected_entry_id(&self) -> Option<EntryId> {
        self.timeline
            .display_order()
            .get(self.timeline_selected)
            .map(|entry| entry.id)
    }

    pub fn select_entry_next(&mut self) {
        let total = self.timeline.len();
        if total == 0 {
            return;
        }
        self.timeline_selected = (self.timeline_selected + 1).min(total - 1);
    }

    pub fn select_entry_prev(&mut self) {
        self.timeline_selected = self.timeline_selected.saturating_sub(1);
    }

    pub fn toggle_next_break_selected(&mut self) -> bool {
        let Some(id) = self.selected_entry_id() else {
            return false;
        };
        self.timeline.toggle_next_break(id)
    }

    pub fn set_game_state(&mut self, state: GameState) -> Vec<ProviderCommand> {
        let before = self.game_phase();
        self.phase.set_game_state(state);
        self.after_phase_change(before)
    }

    pub fn set_period(&mut self, period: u32) -> Vec<ProviderCommand> {
        let before = self.game_phase();
        self.phase.set_period(period);
        self.after_phase_change(before)
    }

    pub fn advance_phase(&mut self) -> Vec<ProviderCommand> {
        let before = self.game_phase();
        self.phase.advance();
        self.after_phase_change(before)
    }

    pub fn rewind_phase(&mut self) -> Vec<ProviderCommand> {
        let before = self.game_phase();
        self.phase.rewind();
        self.after_phase_change(before)
    }

    pub fn end_game(&mut self) -> Vec<ProviderCommand> {
        self.set_game_state(GameState::PostGame)
    }

    fn after_phase_change(&mut self, before: GamePhase) -> Vec<ProviderCommand> {
        let now = self.game_phase();
        if before == now {
            return Vec::new();
        }
        self.push_log(format!("[INFO] Phase: {} -> {}", before.label(), now.label()));
        if self.drawer.router.sync(&now) {
            self.push_log("[INFO] Post-Game tab locked again; switched to Talk Tracks");
        }
        // Post-game cards wait for the final whistle before their first fetch.
        if !before.is_final() && now.is_final() {
            return self.request_empty_cards(DrawerTab::PostGame);
        }
        Vec::new()
    }

    pub fn activate_tab(&mut self, tab: DrawerTab) -> bool {
        let phase = self.game_phase();
        let switched = self.drawer.router.activate(tab, &phase);
        if !switched {
            self.push_log(format!("[INFO] {} tab is locked until Post-Game", tab.label()));
        }
        switched
    }

    pub fn cycle_tab_next(&mut self) {
        let phase = self.game_phase();
        self.drawer.router.cycle_next(&phase);
    }

    pub fn cycle_tab_prev(&mut self) {
        let phase = self.game_phase();
        self.drawer.router.cycle_prev(&phase);
    }

    pub fn build_request(&self, kind: ContentKind, slot: usize) -> ContentRequest {
        ContentRequest {
            kind,
            team_id: self.context.team_id.clone(),
            game_id: self.context.game_id.clone(),
            home: self.context.home.clone(),
            away: self.context.away.clone(),
            phase: self.phase.phase_label(),
            recent_events: self.timeline.recent_texts(RECENT_CONTEXT),
            slot,
        }
    }

    fn regenerate_in(&mut self, tab: DrawerTab, card: CardId) -> Option<ProviderCommand> {
        let deck = self.drawer.deck_mut(tab);
        let slot = deck.ids().iter().position(|id| *id == card)?;
        let token = deck.request_regenerate(card)?;
        let request = self.build_request(tab.kind(), slot);
        Some(ProviderCommand::Generate {
            card,
            token,
            request,
        })
    }

    /// Initial fetch for every card without content. Locked tabs wait.
    pub fn initial_requests(&mut self) -> Vec<ProviderCommand> {
        let phase = self.game_phase();
        DRAWER_TABS
            .into_iter()
            .filter(|tab| !tab.is_locked(&phase))
            .flat_map(|tab| self.request_empty_cards(tab))
            .collect()
    }

    fn request_empty_cards(&mut self, tab: DrawerTab) -> Vec<ProviderCommand> {
        let deck = self.drawer.deck(tab);
        let empty: Vec<CardId> = deck
            .ids()
            .into_iter()
            .filter(|id| !deck.has_content(*id) && !deck.is_loading(*id))
            .collect();
        empty
            .into_iter()
            .filter_map(|card| self.regenerate_in(tab, card))
            .collect()
    }

    pub fn regenerate_selected(&mut self) -> Option<ProviderCommand> {
        let tab = self.drawer.router.active();
        let card = self.drawer.deck(tab).selected_id()?;
        let cmd = self.regenerate_in(tab, card);
        if cmd.is_none() {
            self.push_log("[INFO] Card is already regenerating");
        }
        cmd
    }

    pub fn add_card(&mut self) -> Option<ProviderCommand> {
        let tab = self.drawer.router.active();
        let card = self.drawer.deck_mut(tab).add_card();
        self.regenerate_in(tab, card)
    }

    pub fn dismiss_selected(&mut self) -> bool {
        let deck = self.drawer.active_deck_mut();
        let Some(card) = deck.selected_id() else {
            return false;
        };
        deck.remove_card(card)
    }

    pub fn toggle_pin_selected(&mut self) -> bool {
        let deck = self.drawer.active_deck_mut();
        let Some(card) = deck.selected_id() else {
            return false;
        };
        deck.toggle_pin(card)
    }

    pub fn toggle_collapse_selected(&mut self) -> bool {
        let deck = self.drawer.active_deck_mut();
        let Some(card) = deck.selected_id() else {
            return false;
        };
        deck.toggle_collapse(card)
    }

    pub fn copy_selected(&mut self, clipboard: &mut ClipboardChain, now: Instant) -> CopyOutcome {
        let confirm_for = self.copy_confirm_ttl;
        let deck = self.drawer.active_deck_mut();
        let Some(card) = deck.selected_id() else {
            return CopyOutcome::Empty;
        };
        let outcome = deck.copy(card, clipboard, now, confirm_for);
        match &outcome {
            CopyOutcome::Copied { via } => self.push_log(format!("[INFO] Copied card via {via}")),
            CopyOutcome::Empty => self.push_log("[INFO] Nothing to copy yet"),
            CopyOutcome::Failed(err) => self.push_log(format!("[WARN] Copy failed: {err}")),
        }
        outcome
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    apply_delta_at(state, delta, Local::now());
}

pub fn apply_delta_at(state: &mut AppState, delta: Delta, at: DateTime<Local>) {
    match delta {
        Delta::CardReady {
            kind,
            card,
            token,
            payload,
        } => {
            let update = state
                .drawer
                .deck_mut(DrawerTab::for_kind(kind))
                .apply_result(card, token, Ok(payload), at);
            log_card_update(state, kind, update, None);
        }
        Delta::CardFailed {
            kind,
            card,
            token,
            error,
        } => {
            let update = state
                .drawer
                .deck_mut(DrawerTab::for_kind(kind))
                .apply_result(card, token, Err(anyhow!(error.clone())), at);
            log_card_update(state, kind, update, Some(&error));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn log_card_update(
    state: &mut AppState,
    kind: ContentKind,
    update: CardUpdate,
    error: Option<&str>,
) {
    match update {
        CardUpdate::Applied => {}
        CardUpdate::Failed => state.push_log(format!(
            "[WARN] {} generation failed: {}",
            kind.label(),
            error.unwrap_or("unexpected payload")
        )),
        CardUpdate::Stale => {
            state.push_log(format!("[INFO] Dropped stale {} response", kind.label()));
        }
        CardUpdate::Missing => state.push_log(format!(
            "[INFO] Dropped {} response for a dismissed card",
            kind.label()
        )),
    }
}
