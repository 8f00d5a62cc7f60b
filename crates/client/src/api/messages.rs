use chrono::Utc;
use serde_json::{json, Value};

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::{Message, NewMessage};

impl<B: Backend> Api<B> {
    /// Every message between `a` and `b`, in either direction, ascending
    /// by `created_at`.
    pub async fn get_conversation(&self, a: &str, b: &str) -> Result<Vec<Message>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipMessages,
                Query::new()
                    .any_of(vec![
                        vec![Filter::eq("sender_id", a), Filter::eq("receiver_id", b)],
                        vec![Filter::eq("sender_id", b), Filter::eq("receiver_id", a)],
                    ])
                    .order_asc("created_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// Validates the draft, then inserts. A whitespace-only draft is
    /// rejected before any backend call is made.
    pub async fn send_message(&self, message: NewMessage) -> Result<Message, ClientError> {
        tandem_shared::validation::validate_message_text(&message.message_text)
            .map_err(ClientError::Validation)?;
        let row = self
            .backend
            .insert(Table::MentorshipMessages, serde_json::to_value(&message)?)
            .await?;
        Self::decode_row(row)
    }

    /// Stamps `read_at` on one message, only if it is still unread. Returns
    /// the updated row, or `None` when the message was already read (no
    /// call regresses an existing receipt).
    pub async fn mark_read(&self, message_id: &str) -> Result<Option<Message>, ClientError> {
        let mut rows = self
            .backend
            .update(
                Table::MentorshipMessages,
                Query::new()
                    .filter(Filter::eq("id", message_id))
                    .filter(Filter::eq("read_at", Value::Null)),
                json!({ "read_at": Utc::now() }),
            )
            .await?;
        match rows.pop() {
            Some(row) => Ok(Some(Self::decode_row(row)?)),
            None => Ok(None),
        }
    }

    /// Every message the user sent or received. Primary admin-inbox query.
    pub async fn get_messages_involving(&self, user_id: &str) -> Result<Vec<Message>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipMessages,
                Query::new()
                    .any_of(vec![
                        vec![Filter::eq("sender_id", user_id)],
                        vec![Filter::eq("receiver_id", user_id)],
                    ])
                    .order_asc("created_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// Unfiltered message fetch; the admin inbox's degraded fallback path.
    pub async fn get_all_messages(&self) -> Result<Vec<Message>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipMessages,
                Query::new().order_asc("created_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }
}
