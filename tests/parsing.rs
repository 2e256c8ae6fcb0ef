use std::fs;
use std::path::PathBuf;

use booth_terminal::card::CardBody;
use booth_terminal::content::{
    ContentKind, ContentPayload, InterviewSet, StatCard, parse_content_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_talk_track_fixture() {
    let raw = read_fixture("talk_track.json");
    let payload = parse_content_json(ContentKind::TalkTrack, &raw).expect("fixture should parse");
    let track = match payload {
        ContentPayload::TalkTrack(track) => track,
        other => panic!("expected talk track, got {other:?}"),
    };
    assert_eq!(track.title, "Bergeron's faceoff dominance");
    assert_eq!(track.lines().len(), 2);
}

#[test]
fn parses_stat_card_inside_data_envelope() {
    let raw = read_fixture("stat_card_envelope.json");
    let payload = parse_content_json(ContentKind::StatCard, &raw).expect("fixture should parse");
    let card = StatCard::from_payload(payload).expect("stat card payload");
    assert_eq!(card.value, "3 for 4");
    // Blank support stats are dropped.
    assert_eq!(card.support_stats.len(), 2);
    assert_eq!(card.title(), "Power play: 3 for 4");
}

#[test]
fn parses_interview_from_items_list() {
    let raw = read_fixture("interview_items.json");
    let payload = parse_content_json(ContentKind::Interview, &raw).expect("fixture should parse");
    let set = InterviewSet::from_payload(payload).expect("interview payload");
    assert_eq!(set.subject.as_deref(), Some("Head coach"));
    assert_eq!(
        set.lines(),
        vec![
            "1. [Momentum] What changed after the second intermission?".to_string(),
            "2. [Goaltending] How big were the saves early in the third?".to_string(),
        ]
    );
}

#[test]
fn rejects_interview_without_questions() {
    let raw = read_fixture("interview_empty.json");
    let err = parse_content_json(ContentKind::Interview, &raw).expect_err("should reject");
    assert!(err.to_string().contains("no questions"));
}

#[test]
fn parses_post_game_with_camel_case_fields() {
    let raw = read_fixture("post_game.json");
    let payload = parse_content_json(ContentKind::PostGame, &raw).expect("fixture should parse");
    let recap = match payload {
        ContentPayload::PostGame(recap) => recap,
        other => panic!("expected post-game recap, got {other:?}"),
    };
    assert_eq!(recap.three_stars.len(), 3);
    assert_eq!(recap.questions.len(), 1);
    let text = recap.copy_text();
    assert!(text.starts_with("Final: BOS 4, TOR 2"));
    assert!(text.contains("Three stars:"));
}

#[test]
fn empty_and_malformed_bodies_are_errors() {
    assert!(parse_content_json(ContentKind::TalkTrack, "").is_err());
    assert!(parse_content_json(ContentKind::TalkTrack, "null").is_err());
    assert!(parse_content_json(ContentKind::TalkTrack, "{not json").is_err());
    assert!(parse_content_json(ContentKind::StatCard, r#"{"headline":"x"}"#).is_err());
}

#[test]
fn payload_of_wrong_kind_is_rejected_by_card_body() {
    let raw = read_fixture("talk_track.json");
    let payload = parse_content_json(ContentKind::TalkTrack, &raw).expect("fixture should parse");
    let err = StatCard::from_payload(payload).expect_err("kind mismatch");
    assert!(err.to_string().contains("Stat Card"));
}
