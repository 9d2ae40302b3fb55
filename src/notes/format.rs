//! Memo text and filename rendering.
//!
//! All timestamps are UTC, both in the filename and the memo body.

use chrono::{DateTime, Utc};

use crate::listener::MessageReceived;

/// Filename for a memo captured at the given time:
/// `<yyyyMMdd_HHmmss>_discord.md`.
pub fn note_filename(created_at: &DateTime<Utc>) -> String {
    format!("{}_discord.md", created_at.format("%Y%m%d_%H%M%S"))
}

/// Render the memo body with the fixed template: header, sender,
/// channel, timestamp, message text, trailing tag line.
pub fn format_note(msg: &MessageReceived) -> String {
    format!(
        "# Discord Memo\n\n- From: {}\n- Channel: {}\n- Date: {}\n\n{}\n\n#discord #memo\n",
        msg.author,
        msg.channel_name,
        msg.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        msg.content.trim_end(),
    )
}
