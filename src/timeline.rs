use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::phase::{GamePhase, period_rank};
use crate::taxonomy::BroadcastEventType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Scoring,
    Infraction,
    Highlight,
    Storyline,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    EventBar,
    Manual,
}

/// Creation millisecond plus a session-wide sequence number, so two entries made
/// inside the same millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId {
    pub millis: i64,
    pub seq: u64,
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub event: Option<BroadcastEventType>,
    pub text: String,
    pub period: String,
    pub timestamp: String,
    pub source: EntrySource,
    #[serde(default)]
    pub in_next_break: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGroup<'a> {
    pub period: &'a str,
    pub entries: Vec<&'a TimelineEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    next_seq: u64,
    latest: Option<EntryId>,
    pub note_input: String,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&TimelineEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Id of the most recently appended entry; the view scrolls to it.
    pub fn latest(&self) -> Option<EntryId> {
        self.latest
    }

    pub fn allocate_id(&mut self, at: DateTime<Local>) -> EntryId {
        let seq = self.next_seq;
        self.next_seq += 1;
        EntryId {
            millis: at.timestamp_millis(),
            seq,
        }
    }

    pub fn add_entry(&mut self, entry: TimelineEntry) {
        if entry.id.seq >= self.next_seq {
            self.next_seq = entry.id.seq + 1;
        }
        self.latest = Some(entry.id);
        self.entries.push(entry);
    }

    pub fn add_event_entry(
        &mut self,
        event: BroadcastEventType,
        phase: &GamePhase,
        at: DateTime<Local>,
    ) -> EntryId {
        let meta = event.meta();
        let id = self.allocate_id(at);
        self.add_entry(TimelineEntry {
            id,
            kind: meta.category,
            event: Some(event),
            text: meta.label.to_string(),
            period: phase.label(),
            timestamp: display_time(at),
            source: EntrySource::EventBar,
            in_next_break: false,
        });
        id
    }

    /// Blank or whitespace-only text is ignored and returns `None`.
    pub fn add_note(
        &mut self,
        text: &str,
        phase: &GamePhase,
        at: DateTime<Local>,
    ) -> Option<EntryId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.allocate_id(at);
        self.add_entry(TimelineEntry {
            id,
            kind: EntryKind::Note,
            event: None,
            text: text.to_string(),
            period: phase.label(),
            timestamp: display_time(at),
            source: EntrySource::Manual,
            in_next_break: false,
        });
        Some(id)
    }

    /// Submits the pending note input and clears it when an entry was created.
    pub fn submit_note_input(
        &mut self,
        phase: &GamePhase,
        at: DateTime<Local>,
    ) -> Option<EntryId> {
        let text = std::mem::take(&mut self.note_input);
        let id = self.add_note(&text, phase, at);
        if id.is_none() {
            self.note_input = text;
        }
        id
    }

    /// Unknown ids are ignored and return `false`.
    pub fn toggle_next_break(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        entry.in_next_break = !entry.in_next_break;
        true
    }

    pub fn grouped_view(&self) -> Vec<PeriodGroup<'_>> {
        let mut groups: Vec<PeriodGroup<'_>> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|g| g.period == entry.period) {
                Some(group) => group.entries.push(entry),
                None => groups.push(PeriodGroup {
                    period: &entry.period,
                    entries: vec![entry],
                }),
            }
        }
        // Stable sort keeps first-seen order among labels of equal rank.
        groups.sort_by_key(|g| period_rank(g.period));
        groups
    }

    /// Entries in display order, flattened.
    pub fn display_order(&self) -> Vec<&TimelineEntry> {
        self.grouped_view()
            .into_iter()
            .flat_map(|group| group.entries)
            .collect()
    }

    pub fn next_break_entries(&self) -> Vec<&TimelineEntry> {
        self.display_order()
            .into_iter()
            .filter(|entry| entry.in_next_break)
            .collect()
    }

    /// Most recent entry texts, oldest first.
    pub fn recent_texts(&self, limit: usize) -> Vec<String> {
        let start = self.entries.len().saturating_sub(limit);
        self.entries[start..]
            .iter()
            .map(|entry| format!("[{}] {}", entry.period, entry.text))
            .collect()
    }
}

pub fn display_time(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
