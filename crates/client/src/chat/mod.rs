//! Live two-party messaging: an ordered local view of a conversation fed
//! by the change feed, plus the admin's multi-conversation inbox.

mod conversation;
mod inbox;

pub use conversation::{Applied, Composer, ConversationView, SendOutcome};
pub use inbox::{AdminInbox, ConversationSummary};

use tandem_shared::constants::{NEAR_BOTTOM_PX, REPLY_PREVIEW_CHARS};

use crate::models::Message;

/// Whether an incoming message should pull the view to the bottom: only
/// when the reader is already near it, or just sent the message. A reader
/// scrolled up mid-history is never interrupted.
pub fn should_autoscroll(distance_from_bottom_px: f64, sent_by_viewer: bool) -> bool {
    sent_by_viewer || distance_from_bottom_px <= NEAR_BOTTOM_PX
}

/// Places `incoming` so `created_at` stays non-decreasing, whatever order
/// the feed delivered events in. A row with a known id replaces the stale
/// copy in place instead.
pub(crate) fn insert_ordered(messages: &mut Vec<Message>, incoming: Message) {
    if let Some(existing) = messages.iter_mut().find(|m| m.id == incoming.id) {
        *existing = incoming;
        return;
    }
    let at = messages.partition_point(|m| {
        (m.created_at, m.id.as_str()) <= (incoming.created_at, incoming.id.as_str())
    });
    messages.insert(at, incoming);
}

/// Replaces the matching message in place; position never changes on
/// update. `read_at` is monotonic: a non-null receipt never goes back to
/// null, even if a stale event says otherwise.
pub(crate) fn apply_update(messages: &mut [Message], incoming: Message) -> bool {
    let Some(existing) = messages.iter_mut().find(|m| m.id == incoming.id) else {
        return false;
    };
    let read_at = existing.read_at.or(incoming.read_at);
    *existing = incoming;
    existing.read_at = read_at;
    true
}

/// Quote text shown on a reply bubble, truncated on a char boundary.
pub(crate) fn preview_text(text: &str) -> String {
    if text.chars().count() <= REPLY_PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(REPLY_PREVIEW_CHARS).collect();
    format!("{}…", truncated.trim_end())
}

/// Maximal runs of consecutive same-sender messages, as `(start, len)`
/// index pairs. Render-only: the avatar and name show once per run.
pub fn group_runs(messages: &[Message]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=messages.len() {
        let run_ends = i == messages.len() || messages[i].sender_id != messages[start].sender_id;
        if run_ends {
            runs.push((start, i - start));
            start = i;
        }
    }
    runs
}
