use tracing::warn;

use crate::api::Api;
use crate::backend::{Backend, ChangeEvent, Table};
use crate::chat::{apply_update, insert_ordered, preview_text};
use crate::error::ClientError;
use crate::models::{Message, NewMessage};
use tandem_shared::constants::REPLY_MISSING_PLACEHOLDER;

/// Ordered, live view of one two-party conversation. Feed events are
/// applied through [`ConversationView::apply`]; the view itself never
/// talks to the socket.
pub struct ConversationView {
    me: String,
    counterpart: String,
    messages: Vec<Message>,
    notice: Option<String>,
}

impl ConversationView {
    pub fn new(me: impl Into<String>, counterpart: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            counterpart: counterpart.into(),
            messages: Vec::new(),
            notice: None,
        }
    }

    /// Mentee entry point: resolve the designated mentor, then load the
    /// conversation with them. A failed load leaves a usable empty view
    /// with a dismissible notice, never a hard failure.
    pub async fn open_with_mentor<B: Backend>(
        api: &Api<B>,
        me: &str,
    ) -> Result<Self, ClientError> {
        let mentor = api.resolve_mentor().await?;
        let mut view = Self::new(me, mentor.id);
        view.load(api).await;
        Ok(view)
    }

    /// Initial fetch, ascending by `created_at`. Failure degrades to the
    /// empty state.
    pub async fn load<B: Backend>(&mut self, api: &Api<B>) {
        match api.get_conversation(&self.me, &self.counterpart).await {
            Ok(messages) => self.messages = messages,
            Err(e) => {
                warn!(error = %e, "conversation load failed");
                self.notice = Some(e.notice());
            }
        }
    }

    pub fn me(&self) -> &str {
        &self.me
    }

    pub fn counterpart(&self) -> &str {
        &self.counterpart
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Applies one feed event. Returns what happened so the caller can
    /// run the scroll policy; events for other conversations or tables
    /// are ignored.
    pub fn apply(&mut self, event: &ChangeEvent) -> Option<Applied> {
        if event.table() != Table::MentorshipMessages {
            return None;
        }
        let message: Message = match serde_json::from_value(event.row().clone()) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "undecodable message event dropped");
                return None;
            }
        };
        if !message.is_between(&self.me, &self.counterpart) {
            return None;
        }
        match event {
            ChangeEvent::Insert { .. } => {
                let sent_by_me = message.sender_id == self.me;
                insert_ordered(&mut self.messages, message);
                Some(Applied::Inserted { sent_by_me })
            }
            ChangeEvent::Update { .. } => {
                apply_update(&mut self.messages, message).then_some(Applied::Updated)
            }
        }
    }

    pub fn find(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Quote shown above a reply bubble: a truncated copy of the original,
    /// or a placeholder when the original is outside the loaded window.
    pub fn reply_preview(&self, message: &Message) -> Option<String> {
        let reply_to_id = message.reply_to_id.as_deref()?;
        Some(match self.find(reply_to_id) {
            Some(original) => preview_text(&original.message_text),
            None => REPLY_MISSING_PLACEHOLDER.to_string(),
        })
    }

    /// Stamps `read_at` on every unread message from the counterpart, one
    /// call per message (matching the backend's row-update granularity).
    /// Returns how many receipts were set.
    pub async fn mark_conversation_read<B: Backend>(
        &mut self,
        api: &Api<B>,
    ) -> Result<usize, ClientError> {
        let unread: Vec<String> = self
            .messages
            .iter()
            .filter(|m| m.sender_id == self.counterpart && m.read_at.is_none())
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

/// What [`ConversationView::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted { sent_by_me: bool },
    Updated,
}

/// Outcome of a send attempt.
#[derive(Debug)]
pub enum SendOutcome {
    /// Inserted; the caller clears scroll to the bottom. The message
    /// renders when the feed echoes it back — there is no optimistic copy.
    Sent(Message),
    /// A send is already in flight; this attempt was dropped.
    Busy,
    /// Empty draft; no backend call was made.
    Empty,
}

/// One compose box: draft text, optional reply target, and the
/// single-flight send guard.
#[derive(Default)]
pub struct Composer {
    draft: String,
    reply_to: Option<String>,
    in_flight: bool,
    error: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn reply_target(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn set_reply_target(&mut self, message_id: impl Into<String>) {
        self.reply_to = Some(message_id.into());
    }

    pub fn clear_reply_target(&mut self) {
        self.reply_to = None;
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits the draft. Success clears the draft and reply target;
    /// failure keeps both so the user can retry.
    pub async fn send<B: Backend>(
        &mut self,
        api: &Api<B>,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<SendOutcome, ClientError> {
        if self.in_flight {
            return Ok(SendOutcome::Busy);
        }
        if self.draft.trim().is_empty() {
            self.error = Some("Message text is required".into());
            return Ok(SendOutcome::Empty);
        }

        self.in_flight = true;
        self.error = None;
        let result = api
            .send_message(NewMessage {
                sender_id: sender_id.to_string(),
                receiver_id: receiver_id.to_string(),
                message_text: self.draft.trim().to_string(),
                message_type: "text".into(),
                reply_to_id: self.reply_to.clone(),
            })
            .await;
        self.in_flight = false;

        match result {
            Ok(message) => {
                self.draft.clear();
                self.reply_to = None;
                Ok(SendOutcome::Sent(message))
            }
            Err(e) => {
                self.error = Some(e.notice());
                Err(e)
            }
        }
    }
}
