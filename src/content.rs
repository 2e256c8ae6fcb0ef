use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::card::CardBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    TalkTrack,
    StatCard,
    Interview,
    PostGame,
}

impl ContentKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            ContentKind::TalkTrack => "talk-tracks",
            ContentKind::StatCard => "stat-cards",
            ContentKind::Interview => "interview-questions",
            ContentKind::PostGame => "post-game",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::TalkTrack => "Talk Track",
            ContentKind::StatCard => "Stat Card",
            ContentKind::Interview => "Interview",
            ContentKind::PostGame => "Post-Game",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkTrack {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub headline: String,
    pub value: String,
    #[serde(default, alias = "supportStats")]
    pub support_stats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub label: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSet {
    #[serde(default)]
    pub subject: Option<String>,
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostGameRecap {
    pub summary: String,
    #[serde(default, alias = "threeStars")]
    pub three_stars: Vec<String>,
    #[serde(default)]
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    TalkTrack(TalkTrack),
    StatCard(StatCard),
    Interview(InterviewSet),
    PostGame(PostGameRecap),
}

impl ContentPayload {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentPayload::TalkTrack(_) => ContentKind::TalkTrack,
            ContentPayload::StatCard(_) => ContentKind::StatCard,
            ContentPayload::Interview(_) => ContentKind::Interview,
            ContentPayload::PostGame(_) => ContentKind::PostGame,
        }
    }
}

/// Context sent with every generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRequest {
    pub kind: ContentKind,
    pub team_id: Option<String>,
    pub game_id: Option<String>,
    pub home: String,
    pub away: String,
    pub phase: String,
    pub recent_events: Vec<String>,
    pub slot: usize,
}

/// Anything that can turn a request into card content. Implementations block; the
/// content worker runs them off the UI thread.
pub trait ContentSource: Send + Sync {
    fn generate(&self, request: &ContentRequest) -> Result<ContentPayload>;
}

pub fn parse_content_json(kind: ContentKind, raw: &str) -> Result<ContentPayload> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty {} response", kind.endpoint()));
    }
    let root: Value = serde_json::from_str(trimmed)
        .with_context(|| format!("invalid {} json", kind.endpoint()))?;
    let body = unwrap_envelope(root);

    let payload = match kind {
        ContentKind::TalkTrack => ContentPayload::TalkTrack(
            serde_json::from_value(body).context("talk track shape")?,
        ),
        ContentKind::StatCard => {
            let mut card: StatCard = serde_json::from_value(body).context("stat card shape")?;
            card.support_stats.retain(|s| !s.trim().is_empty());
            ContentPayload::StatCard(card)
        }
        ContentKind::Interview => {
            let set: InterviewSet = serde_json::from_value(body).context("interview shape")?;
            if set.questions.is_empty() {
                return Err(anyhow!("interview response had no questions"));
            }
            ContentPayload::Interview(set)
        }
        ContentKind::PostGame => ContentPayload::PostGame(
            serde_json::from_value(body).context("post-game shape")?,
        ),
    };
    Ok(payload)
}

// Backends wrap the card in `data` or a one-element `items` list.
fn unwrap_envelope(mut root: Value) -> Value {
    if let Some(data) = root.get_mut("data") {
        root = data.take();
    }
    if let Some(Value::Array(items)) = root.get_mut("items")
        && !items.is_empty()
    {
        return items.swap_remove(0);
    }
    root
}

pub fn questions_text(questions: &[InterviewQuestion]) -> Vec<String> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| format!("{}. [{}] {}", idx + 1, q.label, q.question))
        .collect()
}

fn wrong_payload(expected: ContentKind, got: &ContentPayload) -> anyhow::Error {
    anyhow!(
        "expected {} content, got {}",
        expected.label(),
        got.kind().label()
    )
}

impl CardBody for TalkTrack {
    const KIND: ContentKind = ContentKind::TalkTrack;

    fn from_payload(payload: ContentPayload) -> Result<Self> {
        match payload {
            ContentPayload::TalkTrack(track) => Ok(track),
            other => Err(wrong_payload(Self::KIND, &other)),
        }
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn lines(&self) -> Vec<String> {
        self.body.lines().map(str::to_string).collect()
    }
}

impl CardBody for StatCard {
    const KIND: ContentKind = ContentKind::StatCard;

    fn from_payload(payload: ContentPayload) -> Result<Self> {
        match payload {
            ContentPayload::StatCard(card) => Ok(card),
            other => Err(wrong_payload(Self::KIND, &other)),
        }
    }

    fn title(&self) -> String {
        format!("{}: {}", self.headline, self.value)
    }

    fn lines(&self) -> Vec<String> {
        self.support_stats.iter().map(|s| format!("- {s}")).collect()
    }
}

impl CardBody for InterviewSet {
    const KIND: ContentKind = ContentKind::Interview;

    fn from_payload(payload: ContentPayload) -> Result<Self> {
        match payload {
            ContentPayload::Interview(set) => Ok(set),
            other => Err(wrong_payload(Self::KIND, &other)),
        }
    }

    fn title(&self) -> String {
        match &self.subject {
            Some(subject) => format!("Questions for {subject}"),
            None => "Interview questions".to_string(),
        }
    }

    fn lines(&self) -> Vec<String> {
        questions_text(&self.questions)
    }
}

impl CardBody for PostGameRecap {
    const KIND: ContentKind = ContentKind::PostGame;

    fn from_payload(payload: ContentPayload) -> Result<Self> {
        match payload {
            ContentPayload::PostGame(recap) => Ok(recap),
            other => Err(wrong_payload(Self::KIND, &other)),
        }
    }

    fn title(&self) -> String {
        self.summary.clone()
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.three_stars.is_empty() {
            lines.push("Three stars:".to_string());
            for (idx, star) in self.three_stars.iter().enumerate() {
                lines.push(format!("  {}. {star}", idx + 1));
            }
        }
        lines.extend(questions_text(&self.questions));
        lines
    }
}
