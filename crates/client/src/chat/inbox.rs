use std::collections::HashMap;

use tracing::warn;

use crate::api::Api;
use crate::backend::{Backend, ChangeEvent, Table};
use crate::chat::{apply_update, insert_ordered};
use crate::error::ClientError;
use crate::models::Message;

/// One entry in the admin's conversation list.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub counterpart_id: String,
    pub last_message: Message,
    pub unread_count: usize,
}

/// The admin side of messaging: every conversation at once, kept current
/// by the same feed events the single-conversation view consumes.
pub struct AdminInbox {
    admin_id: String,
    messages: Vec<Message>,
    notice: Option<String>,
}

impl AdminInbox {
    pub fn new(admin_id: impl Into<String>) -> Self {
        Self {
            admin_id: admin_id.into(),
            messages: Vec::new(),
            notice: None,
        }
    }

    /// Loads every message involving the admin. When the primary filtered
    /// query comes back empty, retries unfiltered and filters client-side —
    /// a degraded path kept from the original behavior; the warn log makes
    /// it visible whenever the two queries disagree.
    pub async fn load<B: Backend>(&mut self, api: &Api<B>) {
        let primary = match api.get_messages_involving(&self.admin_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "inbox load failed");
                self.notice = Some(e.notice());
                return;
            }
        };

        if !primary.is_empty() {
            self.messages = primary;
            return;
        }

        match api.get_all_messages().await {
            Ok(all) => {
                let total = all.len();
                let filtered: Vec<Message> = all
                    .into_iter()
                    .filter(|m| m.sender_id == self.admin_id || m.receiver_id == self.admin_id)
                    .collect();
                if !filtered.is_empty() {
                    warn!(
                        total,
                        involving_admin = filtered.len(),
                        "filtered inbox query returned empty; fallback fetch found rows"
                    );
                }
                self.messages = filtered;
            }
            Err(e) => {
                warn!(error = %e, "inbox fallback load failed");
                self.notice = Some(e.notice());
            }
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// All loaded messages, ascending by `created_at`.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// One conversation's messages, in order.
    pub fn conversation(&self, counterpart_id: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.is_between(&self.admin_id, counterpart_id))
            .collect()
    }

    /// Conversation list grouped by the other participant, most recent
    /// activity first, with per-conversation unread counts.
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        let mut grouped: HashMap<&str, (usize, usize)> = HashMap::new();
        for (index, message) in self.messages.iter().enumerate() {
            let counterpart = message.counterpart_of(&self.admin_id);
            let unread =
                usize::from(message.receiver_id == self.admin_id && message.read_at.is_none());
            grouped
                .entry(counterpart)
                .and_modify(|(last, unread_count)| {
                    *last = index;
                    *unread_count += unread;
                })
                .or_insert((index, unread));
        }

        let mut summaries: Vec<ConversationSummary> = grouped
            .into_iter()
            .map(|(counterpart_id, (last, unread_count))| ConversationSummary {
                counterpart_id: counterpart_id.to_string(),
                last_message: self.messages[last].clone(),
                unread_count,
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.last_message
                .created_at
                .cmp(&a.last_message.created_at)
                .then_with(|| a.counterpart_id.cmp(&b.counterpart_id))
        });
        summaries
    }

    /// Applies one feed event; events not involving the admin are ignored.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        if event.table() != Table::MentorshipMessages {
            return false;
        }
        let message: Message = match serde_json::from_value(event.row().clone()) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "undecodable message event dropped");
                return false;
            }
        };
        if message.sender_id != self.admin_id && message.receiver_id != self.admin_id {
            return false;
        }
        match event {
            ChangeEvent::Insert { .. } => {
                insert_ordered(&mut self.messages, message);
                true
            }
            ChangeEvent::Update { .. } => apply_update(&mut self.messages, message),
        }
    }

    /// Marks one conversation read, one backend call per unread message.
    pub async fn mark_conversation_read<B: Backend>(
        &mut self,
        api: &Api<B>,
        counterpart_id: &str,
    ) -> Result<usize, ClientError> {
        let unread: Vec<String> = self
            .messages
            .iter()
            .filter(|m| {
                m.sender_id == counterpart_id
                    && m.receiver_id == self.admin_id
                    && m.read_at.is_none()
            })
            .map(|m| m.id.clone())
            .collect();

        let mut marked = 0;
        for id in unread {
            if let Some(updated) = api.mark_read(&id).await? {
                apply_update(&mut self.messages, updated);
                marked += 1;
            }
        }
        Ok(marked)
    }
}
