use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::clipboard::{ClipboardChain, CopyOutcome};
use crate::content::{ContentKind, ContentPayload};
use crate::flash::TimedFlash;

pub type CardId = u64;
pub type RequestToken = u64;

/// Content a card can hold. One implementation per broadcast tool; every tool shares
/// the same card shell below.
pub trait CardBody: Clone {
    const KIND: ContentKind;

    fn from_payload(payload: ContentPayload) -> Result<Self>;
    fn title(&self) -> String;
    fn lines(&self) -> Vec<String>;

    fn copy_text(&self) -> String {
        let mut out = self.title();
        for line in self.lines() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardUpdate {
    Applied,
    Failed,
    /// The response belongs to a superseded request.
    Stale,
    /// The card was dismissed while the request was in flight.
    Missing,
}

#[derive(Debug, Clone)]
pub struct Card<C> {
    id: CardId,
    content: Option<C>,
    pinned: bool,
    collapsed: bool,
    loading: bool,
    pending: Option<RequestToken>,
    last_generated_at: Option<DateTime<Local>>,
    error: Option<String>,
    copied: TimedFlash,
}

impl<C: CardBody> Card<C> {
    pub fn new(id: CardId) -> Self {
        Self {
            id,
            content: None,
            pinned: false,
            collapsed: false,
            loading: false,
            pending: None,
            last_generated_at: None,
            error: None,
            copied: TimedFlash::new(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn content(&self) -> Option<&C> {
        self.content.as_ref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_generated_at(&self) -> Option<DateTime<Local>> {
        self.last_generated_at
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn copied_message(&self) -> Option<&str> {
        self.copied.message()
    }

    pub fn pin(&mut self) {
        self.pinned = true;
    }

    pub fn unpin(&mut self) {
        self.pinned = false;
    }

    pub fn toggle_pin(&mut self) {
        self.pinned = !self.pinned;
    }

    pub fn collapse(&mut self) {
        self.collapsed = true;
    }

    pub fn expand(&mut self) {
        self.collapsed = false;
    }

    pub fn toggle_collapse(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Enters the loading state for `token`. Ignored while a request is already in
    /// flight.
    pub fn begin_regenerate(&mut self, token: RequestToken) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.pending = Some(token);
        self.error = None;
        true
    }

    /// Applies a finished request. On failure the previous content is kept.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<ContentPayload>,
        at: DateTime<Local>,
    ) -> CardUpdate {
        if self.pending != Some(token) {
            return CardUpdate::Stale;
        }
        self.pending = None;
        self.loading = false;

        match result.and_then(C::from_payload) {
            Ok(content) => {
                self.content = Some(content);
                self.last_generated_at = Some(at);
                self.error = None;
                CardUpdate::Applied
            }
            Err(err) => {
                self.error = Some(format!("{err:#}"));
                CardUpdate::Failed
            }
        }
    }

    pub fn copy(
        &mut self,
        clipboard: &mut ClipboardChain,
        now: Instant,
        confirm_for: Duration,
    ) -> CopyOutcome {
        let Some(content) = self.content.as_ref() else {
            return CopyOutcome::Empty;
        };
        let outcome = clipboard.copy(&content.copy_text());
        if let CopyOutcome::Copied { .. } = outcome {
            self.copied.show("Copied", now, confirm_for);
        }
        outcome
    }

    pub fn tick(&mut self, now: Instant) {
        self.copied.tick(now);
    }
}

/// Flattened card data for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: CardId,
    pub title: String,
    pub lines: Vec<String>,
    pub pinned: bool,
    pub collapsed: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub copied: bool,
    pub generated_at: Option<String>,
    pub selected: bool,
}

/// An ordered set of cards of one kind.
///
/// Pinned cards are listed first. Within the pinned and unpinned runs, cards keep
/// creation order, so unpinning returns a card to its original slot.
#[derive(Debug, Clone)]
pub struct CardDeck<C> {
    cards: Vec<Card<C>>,
    next_id: CardId,
    next_token: RequestToken,
    selected: usize,
}

impl<C: CardBody> Default for CardDeck<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CardBody> CardDeck<C> {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            next_id: 1,
            next_token: 1,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn add_card(&mut self) -> CardId {
        let id = self.next_id;
        self.next_id += 1;
        self.cards.push(Card::new(id));
        id
    }

    /// Dismisses a card. Any response still in flight for it is dropped on arrival.
    pub fn remove(&mut self, id: CardId) -> bool {
        let before = self.cards.len();
        self.cards.retain(|card| card.id != id);
        let removed = self.cards.len() != before;
        if removed {
            self.clamp_selection();
        }
        removed
    }

    pub fn get(&self, id: CardId) -> Option<&Card<C>> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card<C>> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    pub fn ordered(&self) -> Vec<&Card<C>> {
        let pinned = self.cards.iter().filter(|card| card.pinned);
        let rest = self.cards.iter().filter(|card| !card.pinned);
        pinned.chain(rest).collect()
    }

    pub fn ordered_ids(&self) -> Vec<CardId> {
        self.ordered().into_iter().map(|card| card.id).collect()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_id(&self) -> Option<CardId> {
        self.ordered_ids().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.cards.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_id(&mut self, id: CardId) {
        if let Some(pos) = self.ordered_ids().iter().position(|card| *card == id) {
            self.selected = pos;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.cards.len().saturating_sub(1));
    }

    /// Toggles the pin on `id` and keeps the selection on the same card even though
    /// its position moves.
    pub fn toggle_pin(&mut self, id: CardId) -> bool {
        let Some(card) = self.get_mut(id) else {
            return false;
        };
        card.toggle_pin();
        self.select_id(id);
        true
    }

    pub fn toggle_collapse(&mut self, id: CardId) -> bool {
        let Some(card) = self.get_mut(id) else {
            return false;
        };
        card.toggle_collapse();
        true
    }

    /// Puts the card into the loading state and returns the token the response must
    /// carry. `None` when the card is unknown or already loading.
    pub fn request_regenerate(&mut self, id: CardId) -> Option<RequestToken> {
        let token = self.next_token;
        let card = self.cards.iter_mut().find(|card| card.id == id)?;
        if !card.begin_regenerate(token) {
            return None;
        }
        self.next_token += 1;
        Some(token)
    }

    pub fn apply_result(
        &mut self,
        id: CardId,
        token: RequestToken,
        result: Result<ContentPayload>,
        at: DateTime<Local>,
    ) -> CardUpdate {
        match self.get_mut(id) {
            Some(card) => card.complete(token, result, at),
            None => CardUpdate::Missing,
        }
    }

    pub fn copy(
        &mut self,
        id: CardId,
        clipboard: &mut ClipboardChain,
        now: Instant,
        confirm_for: Duration,
    ) -> CopyOutcome {
        match self.get_mut(id) {
            Some(card) => card.copy(clipboard, now, confirm_for),
            None => CopyOutcome::Empty,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        for card in &mut self.cards {
            card.tick(now);
        }
    }

    pub fn views(&self) -> Vec<CardView> {
        self.ordered()
            .into_iter()
            .enumerate()
            .map(|(idx, card)| {
                let (title, lines) = match card.content.as_ref() {
                    Some(content) => (content.title(), content.lines()),
                    None if card.loading => {
                        (format!("{} (generating)", C::KIND.label()), Vec::new())
                    }
                    None => (format!("{} (empty)", C::KIND.label()), Vec::new()),
                };
                CardView {
                    id: card.id,
                    title,
                    lines,
                    pinned: card.pinned,
                    collapsed: card.collapsed,
                    loading: card.loading,
                    error: card.error.clone(),
                    copied: card.copied.is_active(),
                    generated_at: card
                        .last_generated_at
                        .map(|at| at.format("%H:%M:%S").to_string()),
                    selected: idx == self.selected,
                }
            })
            .collect()
    }
}
