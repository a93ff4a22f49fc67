// tests/scheduler_properties.rs
// Invariant checks for the urgency scorer over a broad input mix.

use chrono::{DateTime, Duration, TimeZone, Utc};
use maintcontrol::scheduler::{rank, score_record, InterventionRecord, Urgency};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// A deliberately messy mix: canonical values, odd casing, unknown strings,
/// unparseable dates, missing fields.
fn input_mix() -> Vec<InterventionRecord> {
    let now = now();
    let priorities: [Option<&str>; 5] = [Some("high"), Some("MEDIUM"), Some("low"), Some(""), None];
    let statuses: [Option<&str>; 5] = [Some("open"), Some("In_Progress"), Some("done"), Some("weird"), None];
    let dates: [Option<String>; 5] = [
        Some(iso(now - Duration::days(30))),
        Some(iso(now + Duration::days(1))),
        Some("not-a-date".to_string()),
        Some("2024-06-15".to_string()),
        None,
    ];

    let mut records = Vec::new();
    for priority in priorities {
        for status in statuses {
            for date in &dates {
                records.push(InterventionRecord {
                    priority: priority.map(str::to_string),
                    status: status.map(str::to_string),
                    scheduled_date: date.clone(),
                    created_at: date.clone(),
                });
            }
        }
    }
    records
}

#[test]
fn output_length_always_equals_input_length() {
    let records = input_mix();
    let ranked = rank(&records, now());
    assert_eq!(ranked.len(), records.len());
}

#[test]
fn output_is_sorted_descending_by_score() {
    let ranked = rank(&input_mix(), now());
    for pair in ranked.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "out of order: {} before {}",
            pair[0].score,
            pair[1].score
        );
    }
}

#[test]
fn every_label_matches_its_score_threshold() {
    for ranked in rank(&input_mix(), now()) {
        let expected = Urgency::from_score(ranked.score);
        assert_eq!(ranked.label, expected, "label mismatch at score {}", ranked.score);
    }
}

#[test]
fn input_records_are_not_mutated() {
    let records = input_mix();
    let snapshot = records.clone();
    let _ = rank(&records, now());
    assert_eq!(records, snapshot);
}

#[test]
fn scoring_is_deterministic_under_a_pinned_clock() {
    let records = input_mix();
    for record in &records {
        assert_eq!(score_record(record, now()), score_record(record, now()));
    }
}

#[test]
fn no_input_ever_panics_the_scorer() {
    // Hostile strings in every field still produce a score and label.
    let hostile = InterventionRecord {
        priority: Some("\u{0}weird\u{7f}".to_string()),
        status: Some("9999-99-99".to_string()),
        scheduled_date: Some("99999999999999-01-01T00:00:00".to_string()),
        created_at: Some("  ".to_string()),
    };
    let ranked = rank(&[hostile], now());
    assert_eq!(ranked.len(), 1);
    // priority default +5, unknown status -10, no date bonuses
    assert_eq!(ranked[0].score, -5);
    assert_eq!(ranked[0].label, Urgency::Low);
}

#[test]
fn serialized_suggestions_carry_base_fields_and_annotations() {
    let record = InterventionRecord {
        priority: Some("high".to_string()),
        status: Some("open".to_string()),
        scheduled_date: None,
        created_at: None,
    };
    let ranked = rank(&[record], now());
    let value = serde_json::to_value(&ranked[0]).unwrap();

    assert_eq!(value["priority"], "high");
    assert_eq!(value["status"], "open");
    assert_eq!(value["score"], 50);
    assert_eq!(value["label"], "HIGH");
}
