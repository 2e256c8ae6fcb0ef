use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::timeline::EntryKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastEventType {
    Goal,
    Penalty,
    BigSave,
    LeadChange,
    PowerPlay,
    Fight,
    Injury,
    Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMeta {
    pub label: &'static str,
    pub shortcut: char,
    pub color: Color,
    pub category: EntryKind,
}

/// Event bar order. The bar is rendered from this list, so every button maps to a
/// registered kind.
pub const EVENT_BAR: [BroadcastEventType; 8] = [
    BroadcastEventType::Goal,
    BroadcastEventType::Penalty,
    BroadcastEventType::BigSave,
    BroadcastEventType::LeadChange,
    BroadcastEventType::PowerPlay,
    BroadcastEventType::Fight,
    BroadcastEventType::Injury,
    BroadcastEventType::Milestone,
];

impl BroadcastEventType {
    pub fn meta(self) -> EventMeta {
        match self {
            BroadcastEventType::Goal => EventMeta {
                label: "Goal",
                shortcut: 'g',
                color: Color::Green,
                category: EntryKind::Scoring,
            },
            BroadcastEventType::Penalty => EventMeta {
                label: "Penalty",
                shortcut: 'p',
                color: Color::Red,
                category: EntryKind::Infraction,
            },
            BroadcastEventType::BigSave => EventMeta {
                label: "Big Save",
                shortcut: 's',
                color: Color::Cyan,
                category: EntryKind::Highlight,
            },
            BroadcastEventType::LeadChange => EventMeta {
                label: "Lead Change",
                shortcut: 'l',
                color: Color::Yellow,
                category: EntryKind::Scoring,
            },
            BroadcastEventType::PowerPlay => EventMeta {
                label: "Power Play",
                shortcut: 'w',
                color: Color::Magenta,
                category: EntryKind::Infraction,
            },
            BroadcastEventType::Fight => EventMeta {
                label: "Fight",
                shortcut: 'f',
                color: Color::LightRed,
                category: EntryKind::Infraction,
            },
            BroadcastEventType::Injury => EventMeta {
                label: "Injury",
                shortcut: 'i',
                color: Color::LightMagenta,
                category: EntryKind::Storyline,
            },
            BroadcastEventType::Milestone => EventMeta {
                label: "Milestone",
                shortcut: 'm',
                color: Color::LightBlue,
                category: EntryKind::Storyline,
            },
        }
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    pub fn from_shortcut(key: char) -> Option<Self> {
        EVENT_BAR
            .into_iter()
            .find(|event| event.meta().shortcut == key)
    }
}
