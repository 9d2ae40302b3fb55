use crate::listener::MessageReceived;
use crate::notes::format::*;
use chrono::{TimeZone, Utc};

fn message_at(ts: chrono::DateTime<Utc>) -> MessageReceived {
    MessageReceived {
        id: "1111111111111111111".to_string(),
        author: "alice".to_string(),
        channel_id: "2222".to_string(),
        channel_name: "general".to_string(),
        content: "Buy milk".to_string(),
        created_at: ts,
    }
}

#[test]
fn test_filename_uses_utc_compact_timestamp() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();
    assert_eq!(note_filename(&ts), "20240501_123456_discord.md");
}

#[test]
fn test_note_contains_sender_channel_and_body() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();
    let note = format_note(&message_at(ts));

    assert!(note.contains("- From: alice"));
    assert!(note.contains("- Channel: general"));
    assert!(note.contains("- Date: 2024-05-01 12:34:56 UTC"));
    assert!(note.contains("Buy milk"));
}

#[test]
fn test_note_ends_with_tag_line() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();
    let note = format_note(&message_at(ts));

    let last_line = note.trim_end().lines().last().unwrap();
    assert_eq!(last_line, "#discord #memo");
}

#[test]
fn test_trailing_whitespace_in_body_is_trimmed() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 56).unwrap();
    let mut msg = message_at(ts);
    msg.content = "Buy milk\n\n".to_string();
    let note = format_note(&msg);

    assert!(note.contains("Buy milk\n\n#discord #memo\n"));
}
