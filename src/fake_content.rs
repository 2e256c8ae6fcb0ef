use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::content::{
    ContentKind, ContentPayload, ContentRequest, ContentSource, InterviewQuestion, InterviewSet,
    PostGameRecap, StatCard, TalkTrack,
};

/// Offline content generator used when no backend is configured. Output is drawn
/// from canned hockey copy with the request's teams and phase filled in.
pub struct FakeContentSource {
    fail_rate: f64,
    latency: Duration,
}

impl FakeContentSource {
    pub fn new(fail_rate: f64) -> Self {
        Self {
            fail_rate: fail_rate.clamp(0.0, 1.0),
            latency: Duration::from_millis(600),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl ContentSource for FakeContentSource {
    fn generate(&self, request: &ContentRequest) -> Result<ContentPayload> {
        let mut rng = rand::thread_rng();
        if !self.latency.is_zero() {
            let jitter = rng.gen_range(0..=self.latency.as_millis() as u64 / 2);
            thread::sleep(self.latency + Duration::from_millis(jitter));
        }
        if self.fail_rate > 0.0 && rng.gen_bool(self.fail_rate) {
            return Err(anyhow!("offline generator: simulated backend timeout"));
        }

        let payload = match request.kind {
            ContentKind::TalkTrack => ContentPayload::TalkTrack(seed_talk_track(request, &mut rng)),
            ContentKind::StatCard => ContentPayload::StatCard(seed_stat_card(request, &mut rng)),
            ContentKind::Interview => ContentPayload::Interview(seed_interview(request, &mut rng)),
            ContentKind::PostGame => ContentPayload::PostGame(seed_post_game(request, &mut rng)),
        };
        Ok(payload)
    }
}

fn pick<'a>(options: &[&'a str], rng: &mut impl Rng) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn seed_talk_track(request: &ContentRequest, rng: &mut impl Rng) -> TalkTrack {
    let angle = pick(
        &[
            "Forecheck pressure",
            "Goaltending duel",
            "Special teams",
            "Depth scoring",
            "Neutral-zone speed",
        ],
        rng,
    );
    let latest = request
        .recent_events
        .last()
        .cloned()
        .unwrap_or_else(|| "the opening faceoff".to_string());
    TalkTrack {
        title: format!("{angle} ({})", request.phase),
        body: format!(
            "{home} have leaned on {lower} all night.\n\
             {away} need a cleaner breakout to answer it.\n\
             Last beat to reference: {latest}.",
            home = request.home,
            away = request.away,
            lower = angle.to_lowercase(),
        ),
    }
}

fn seed_stat_card(request: &ContentRequest, rng: &mut impl Rng) -> StatCard {
    let shots_home: u32 = rng.gen_range(4..18);
    let shots_away: u32 = rng.gen_range(4..18);
    let faceoff: u32 = rng.gen_range(38..63);
    let pp_chances: u32 = rng.gen_range(0..4);
    match request.slot % 3 {
        0 => StatCard {
            headline: "Shots on goal".to_string(),
            value: format!("{} {shots_home} - {shots_away} {}", request.home, request.away),
            support_stats: vec![
                format!("High-danger chances: {}", rng.gen_range(1..9)),
                format!("Phase: {}", request.phase),
            ],
        },
        1 => StatCard {
            headline: "Faceoff wins".to_string(),
            value: format!("{} {faceoff}%", request.home),
            support_stats: vec![
                format!("Offensive zone draws: {}", rng.gen_range(3..12)),
                format!("{} centers won {}% on the PK", request.away, 100 - faceoff),
            ],
        },
        _ => StatCard {
            headline: "Power play".to_string(),
            value: format!("{} 0/{pp_chances}", request.home),
            support_stats: vec![
                format!("{} PK streak: {} straight kills", request.away, rng.gen_range(3..15)),
                "League rank: top 10".to_string(),
            ],
        },
    }
}

fn seed_interview(request: &ContentRequest, rng: &mut impl Rng) -> InterviewSet {
    let mut pool = vec![
        ("Momentum", "What changed for your group after the last whistle?"),
        ("Goaltending", "How much does a save like that lift the bench?"),
        ("Adjustments", "What are you tightening up for the next period?"),
        ("Matchups", "How are you handling their top line right now?"),
        ("Special teams", "What's working on the penalty kill tonight?"),
    ];
    pool.shuffle(rng);
    InterviewSet {
        subject: Some(format!("{} bench ({})", request.home, request.phase)),
        questions: pool
            .into_iter()
            .take(3)
            .map(|(label, question)| InterviewQuestion {
                label: label.to_string(),
                question: question.to_string(),
            })
            .collect(),
    }
}

fn seed_post_game(request: &ContentRequest, rng: &mut impl Rng) -> PostGameRecap {
    let home_goals: u32 = rng.gen_range(1..6);
    let away_goals: u32 = rng.gen_range(0..home_goals);
    PostGameRecap {
        summary: format!(
            "Final: {} {home_goals}, {} {away_goals}",
            request.home, request.away
        ),
        three_stars: vec![
            format!("{} top-line center", request.home),
            format!("{} goaltender", request.away),
            format!("{} defenseman", request.home),
        ],
        questions: vec![
            InterviewQuestion {
                label: "Result".to_string(),
                question: "What was the turning point tonight?".to_string(),
            },
            InterviewQuestion {
                label: "Next up".to_string(),
                question: "How do you carry this into the next game?".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: ContentKind) -> ContentRequest {
        ContentRequest {
            kind,
            team_id: None,
            game_id: None,
            home: "HFD".to_string(),
            away: "SPR".to_string(),
            phase: "2nd".to_string(),
            recent_events: vec!["[2nd] Goal".to_string()],
            slot: 1,
        }
    }

    #[test]
    fn generates_payload_of_requested_kind() {
        let source = FakeContentSource::new(0.0).with_latency(Duration::ZERO);
        for kind in [
            ContentKind::TalkTrack,
            ContentKind::StatCard,
            ContentKind::Interview,
            ContentKind::PostGame,
        ] {
            let payload = source.generate(&request(kind)).expect("offline source succeeds");
            assert_eq!(payload.kind(), kind);
        }
    }

    #[test]
    fn full_fail_rate_always_errors() {
        let source = FakeContentSource::new(1.0).with_latency(Duration::ZERO);
        assert!(source.generate(&request(ContentKind::StatCard)).is_err());
    }
}
