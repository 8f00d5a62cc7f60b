use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of `mentorship_messages`. Immutable after insert except for
/// `read_at`, which moves null → non-null exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message_text: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
}

fn default_message_type() -> String {
    "text".into()
}

impl Message {
    /// True if this message travels between exactly `a` and `b`, in
    /// either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// The participant that is not `user_id`.
    pub fn counterpart_of(&self, user_id: &str) -> &str {
        if self.sender_id == user_id {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}

/// Fields the client controls when sending; id and created_at are
/// server-assigned.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub message_text: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
}

/// Receipt state rendered on a sent message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Sent,
    Read,
}

impl Receipt {
    pub fn of(message: &Message) -> Self {
        if message.read_at.is_some() {
            Receipt::Read
        } else {
            Receipt::Sent
        }
    }
}
