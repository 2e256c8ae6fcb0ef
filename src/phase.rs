use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    PreGame,
    Live,
    Intermission,
    PostGame,
}

pub const PRE_GAME_LABEL: &str = "Pre-Game";
pub const POST_GAME_LABEL: &str = "Post-Game";
pub const OVERTIME_LABEL: &str = "OT";

/// Display order for timeline groups. Labels outside this list sort after it.
pub const PERIOD_PRECEDENCE: [&str; 9] = [
    PRE_GAME_LABEL,
    "1st",
    "INT 1",
    "2nd",
    "INT 2",
    "3rd",
    "INT 3",
    OVERTIME_LABEL,
    POST_GAME_LABEL,
];

pub fn phase_label(state: GameState, period: u32) -> String {
    match state {
        GameState::PreGame => PRE_GAME_LABEL.to_string(),
        GameState::PostGame => POST_GAME_LABEL.to_string(),
        GameState::Intermission => format!("INT {period}"),
        GameState::Live => match period {
            1 => "1st".to_string(),
            2 => "2nd".to_string(),
            3 => "3rd".to_string(),
            p if p >= 4 => OVERTIME_LABEL.to_string(),
            p => format!("P{p}"),
        },
    }
}

pub fn period_rank(label: &str) -> usize {
    PERIOD_PRECEDENCE
        .iter()
        .position(|known| *known == label)
        .unwrap_or(PERIOD_PRECEDENCE.len())
}

/// Read-only snapshot of the game phase handed to everything that stamps or gates
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePhase {
    pub state: GameState,
    pub period: u32,
}

impl Default for GamePhase {
    fn default() -> Self {
        Self {
            state: GameState::PreGame,
            period: 1,
        }
    }
}

impl GamePhase {
    pub fn label(&self) -> String {
        phase_label(self.state, self.period)
    }

    pub fn is_final(&self) -> bool {
        self.state == GameState::PostGame
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    phase: GamePhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn game_state(&self) -> GameState {
        self.phase.state
    }

    pub fn period(&self) -> u32 {
        self.phase.period
    }

    pub fn set_game_state(&mut self, state: GameState) {
        self.phase.state = state;
    }

    pub fn set_period(&mut self, period: u32) {
        self.phase.period = period;
    }

    pub fn phase_label(&self) -> String {
        self.phase.label()
    }

    /// Steps forward one segment:
    /// Pre-Game, 1st, INT 1, 2nd, INT 2, 3rd, INT 3, OT, Post-Game.
    pub fn advance(&mut self) {
        let GamePhase { state, period } = self.phase;
        self.phase = match state {
            GameState::PreGame => GamePhase {
                state: GameState::Live,
                period: 1,
            },
            GameState::Live if period >= 4 => GamePhase {
                state: GameState::PostGame,
                period,
            },
            GameState::Live => GamePhase {
                state: GameState::Intermission,
                period,
            },
            GameState::Intermission => GamePhase {
                state: GameState::Live,
                period: period.saturating_add(1),
            },
            GameState::PostGame => self.phase,
        };
    }

    pub fn rewind(&mut self) {
        let GamePhase { state, period } = self.phase;
        self.phase = match state {
            GameState::PreGame => self.phase,
            GameState::Live if period <= 1 => GamePhase {
                state: GameState::PreGame,
                period: 1,
            },
            GameState::Live => GamePhase {
                state: GameState::Intermission,
                period: period - 1,
            },
            GameState::Intermission => GamePhase {
                state: GameState::Live,
                period,
            },
            GameState::PostGame => GamePhase {
                state: GameState::Live,
                period,
            },
        };
    }

    pub fn end_game(&mut self) {
        self.phase.state = GameState::PostGame;
    }
}
