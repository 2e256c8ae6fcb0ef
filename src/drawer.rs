use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::card::{CardBody, CardDeck, CardId, CardUpdate, CardView, RequestToken};
use crate::clipboard::{ClipboardChain, CopyOutcome};
use crate::content::{
    ContentKind, ContentPayload, InterviewSet, PostGameRecap, StatCard, TalkTrack,
};
use crate::phase::GamePhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawerTab {
    TalkTracks,
    StatCards,
    Interview,
    PostGame,
}

pub const DRAWER_TABS: [DrawerTab; 4] = [
    DrawerTab::TalkTracks,
    DrawerTab::StatCards,
    DrawerTab::Interview,
    DrawerTab::PostGame,
];

impl DrawerTab {
    pub fn label(self) -> &'static str {
        match self {
            DrawerTab::TalkTracks => "Talk Tracks",
            DrawerTab::StatCards => "Stat Cards",
            DrawerTab::Interview => "Interview",
            DrawerTab::PostGame => "Post-Game",
        }
    }

    pub fn kind(self) -> ContentKind {
        match self {
            DrawerTab::TalkTracks => ContentKind::TalkTrack,
            DrawerTab::StatCards => ContentKind::StatCard,
            DrawerTab::Interview => ContentKind::Interview,
            DrawerTab::PostGame => ContentKind::PostGame,
        }
    }

    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::TalkTrack => DrawerTab::TalkTracks,
            ContentKind::StatCard => DrawerTab::StatCards,
            ContentKind::Interview => DrawerTab::Interview,
            ContentKind::PostGame => DrawerTab::PostGame,
        }
    }

    pub fn is_locked(self, phase: &GamePhase) -> bool {
        self == DrawerTab::PostGame && !phase.is_final()
    }

    fn position(self) -> usize {
        DRAWER_TABS
            .iter()
            .position(|tab| *tab == self)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct TabRouter {
    active: DrawerTab,
}

impl Default for TabRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRouter {
    pub fn new() -> Self {
        Self {
            active: DrawerTab::TalkTracks,
        }
    }

    pub fn active(&self) -> DrawerTab {
        self.active
    }

    /// Switches to `tab` unless it is locked for the current phase.
    pub fn activate(&mut self, tab: DrawerTab, phase: &GamePhase) -> bool {
        if tab.is_locked(phase) {
            return false;
        }
        self.active = tab;
        true
    }

    pub fn cycle_next(&mut self, phase: &GamePhase) {
        self.cycle(phase, 1);
    }

    pub fn cycle_prev(&mut self, phase: &GamePhase) {
        self.cycle(phase, DRAWER_TABS.len() - 1);
    }

    // Locked tabs are skipped when cycling.
    fn cycle(&mut self, phase: &GamePhase, step: usize) {
        let start = self.active.position();
        for offset in 1..=DRAWER_TABS.len() {
            let tab = DRAWER_TABS[(start + offset * step) % DRAWER_TABS.len()];
            if !tab.is_locked(phase) {
                self.active = tab;
                return;
            }
        }
    }

    /// Leaves a tab that became locked after the phase moved back out of
    /// post-game. Returns `true` when the active tab changed.
    pub fn sync(&mut self, phase: &GamePhase) -> bool {
        if self.active.is_locked(phase) {
            self.active = DrawerTab::TalkTracks;
            return true;
        }
        false
    }
}

/// Object-safe view over a `CardDeck<C>`, so the drawer can route by tab without
/// knowing the content type.
pub trait DeckOps {
    fn kind(&self) -> ContentKind;
    fn card_count(&self) -> usize;
    fn add_card(&mut self) -> CardId;
    fn remove_card(&mut self, id: CardId) -> bool;
    fn selected_id(&self) -> Option<CardId>;
    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn toggle_pin(&mut self, id: CardId) -> bool;
    fn toggle_collapse(&mut self, id: CardId) -> bool;
    fn has_content(&self, id: CardId) -> bool;
    fn is_loading(&self, id: CardId) -> bool;
    fn request_regenerate(&mut self, id: CardId) -> Option<RequestToken>;
    fn apply_result(
        &mut self,
        id: CardId,
        token: RequestToken,
        result: Result<ContentPayload>,
        at: DateTime<Local>,
    ) -> CardUpdate;
    fn copy(
        &mut self,
        id: CardId,
        clipboard: &mut ClipboardChain,
        now: Instant,
        confirm_for: Duration,
    ) -> CopyOutcome;
    fn tick(&mut self, now: Instant);
    fn views(&self) -> Vec<CardView>;
    fn ids(&self) -> Vec<CardId>;
}

impl<C: CardBody> DeckOps for CardDeck<C> {
    fn kind(&self) -> ContentKind {
        C::KIND
    }

    fn card_count(&self) -> usize {
        self.len()
    }

    fn add_card(&mut self) -> CardId {
        CardDeck::add_card(self)
    }

    fn remove_card(&mut self, id: CardId) -> bool {
        self.remove(id)
    }

    fn selected_id(&self) -> Option<CardId> {
        CardDeck::selected_id(self)
    }

    fn select_next(&mut self) {
        CardDeck::select_next(self);
    }

    fn select_prev(&mut self) {
        CardDeck::select_prev(self);
    }

    fn toggle_pin(&mut self, id: CardId) -> bool {
        CardDeck::toggle_pin(self, id)
    }

    fn toggle_collapse(&mut self, id: CardId) -> bool {
        CardDeck::toggle_collapse(self, id)
    }

    fn has_content(&self, id: CardId) -> bool {
        self.get(id).is_some_and(|card| card.content().is_some())
    }

    fn is_loading(&self, id: CardId) -> bool {
        self.get(id).is_some_and(|card| card.is_loading())
    }

    fn request_regenerate(&mut self, id: CardId) -> Option<RequestToken> {
        CardDeck::request_regenerate(self, id)
    }

    fn apply_result(
        &mut self,
        id: CardId,
        token: RequestToken,
        result: Result<ContentPayload>,
        at: DateTime<Local>,
    ) -> CardUpdate {
        CardDeck::apply_result(self, id, token, result, at)
    }

    fn copy(
        &mut self,
        id: CardId,
        clipboard: &mut ClipboardChain,
        now: Instant,
        confirm_for: Duration,
    ) -> CopyOutcome {
        CardDeck::copy(self, id, clipboard, now, confirm_for)
    }

    fn tick(&mut self, now: Instant) {
        CardDeck::tick(self, now);
    }

    fn views(&self) -> Vec<CardView> {
        CardDeck::views(self)
    }

    fn ids(&self) -> Vec<CardId> {
        self.ordered_ids()
    }
}

/// Side panel holding one card deck per tool.
#[derive(Debug, Clone, Default)]
pub struct Drawer {
    pub router: TabRouter,
    pub talk_tracks: CardDeck<TalkTrack>,
    pub stat_cards: CardDeck<StatCard>,
    pub interview: CardDeck<InterviewSet>,
    pub post_game: CardDeck<PostGameRecap>,
}

impl Drawer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty drawer with the default card slots for each tool.
    pub fn with_default_slots() -> Self {
        let mut drawer = Self::new();
        for _ in 0..3 {
            drawer.talk_tracks.add_card();
            drawer.stat_cards.add_card();
        }
        drawer.interview.add_card();
        drawer.post_game.add_card();
        drawer
    }

    pub fn deck(&self, tab: DrawerTab) -> &dyn DeckOps {
        match tab {
            DrawerTab::TalkTracks => &self.talk_tracks,
            DrawerTab::StatCards => &self.stat_cards,
            DrawerTab::Interview => &self.interview,
            DrawerTab::PostGame => &self.post_game,
        }
    }

    pub fn deck_mut(&mut self, tab: DrawerTab) -> &mut dyn DeckOps {
        match tab {
            DrawerTab::TalkTracks => &mut self.talk_tracks,
            DrawerTab::StatCards => &mut self.stat_cards,
            DrawerTab::Interview => &mut self.interview,
            DrawerTab::PostGame => &mut self.post_game,
        }
    }

    pub fn active_deck(&self) -> &dyn DeckOps {
        self.deck(self.router.active())
    }

    pub fn active_deck_mut(&mut self) -> &mut dyn DeckOps {
        let tab = self.router.active();
        self.deck_mut(tab)
    }

    pub fn tick(&mut self, now: Instant) {
        for tab in DRAWER_TABS {
            self.deck_mut(tab).tick(now);
        }
    }
}
