use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use booth_terminal::card::CardDeck;
use booth_terminal::content::{ContentKind, ContentPayload, TalkTrack, parse_content_json};
use booth_terminal::phase::PhaseTracker;
use booth_terminal::taxonomy::EVENT_BAR;
use booth_terminal::timeline::Timeline;
use chrono::Local;

const POST_GAME_JSON: &str = r#"{
  "data": {
    "summary": "Final: BOS 4, TOR 2",
    "threeStars": ["Pastrnak (2G)", "Swayman (34 saves)", "McAvoy (2A)"],
    "questions": [
      { "label": "Clinch", "question": "What does this win mean for the standings?" },
      { "label": "Depth", "question": "How did the fourth line change the game?" }
    ]
  }
}"#;

fn busy_timeline(entries: usize) -> Timeline {
    let mut tracker = PhaseTracker::new();
    let mut timeline = Timeline::new();
    let now = Local::now();
    for idx in 0..entries {
        if idx % 40 == 0 {
            tracker.advance();
        }
        let event = EVENT_BAR[idx % EVENT_BAR.len()];
        timeline.add_event_entry(event, &tracker.phase(), now);
        if idx % 7 == 0 {
            timeline.add_note("Stoppage note", &tracker.phase(), now);
        }
    }
    timeline
}

fn bench_grouped_view(c: &mut Criterion) {
    let timeline = busy_timeline(400);
    c.bench_function("timeline_grouped_view", |b| {
        b.iter(|| {
            let groups = black_box(&timeline).grouped_view();
            black_box(groups.len());
        })
    });
    c.bench_function("timeline_next_break_entries", |b| {
        b.iter(|| black_box(black_box(&timeline).next_break_entries().len()))
    });
}

fn bench_content_parse(c: &mut Criterion) {
    c.bench_function("post_game_parse", |b| {
        b.iter(|| {
            let payload =
                parse_content_json(ContentKind::PostGame, black_box(POST_GAME_JSON)).unwrap();
            black_box(payload.kind());
        })
    });
}

fn bench_card_views(c: &mut Criterion) {
    let mut deck: CardDeck<TalkTrack> = CardDeck::new();
    for idx in 0..12 {
        let id = deck.add_card();
        if let Some(token) = deck.request_regenerate(id) {
            let payload = ContentPayload::TalkTrack(TalkTrack {
                title: format!("Track {idx}"),
                body: "First line\nSecond line\nThird line".to_string(),
            });
            deck.apply_result(id, token, Ok(payload), Local::now());
        }
        if idx % 3 == 0 {
            deck.toggle_pin(id);
        }
    }
    c.bench_function("card_deck_views", |b| {
        b.iter(|| black_box(black_box(&deck).views().len()))
    });
}

criterion_group!(benches, bench_grouped_view, bench_content_parse, bench_card_views);
criterion_main!(benches);
