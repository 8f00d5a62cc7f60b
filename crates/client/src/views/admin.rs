//! Admin dashboard: the mentee roster, the full session book, and
//! per-mentee document sharing. Session mutations update the local copy
//! so the list stays current without a refetch.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::api::Api;
use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{Document, Profile, Session};

#[derive(Default)]
pub struct AdminDashboardModel {
    pub mentees: Vec<Profile>,
    pub sessions: Vec<Session>,
    pub documents: Vec<Document>,
    pub selected_mentee: Option<String>,
    pub notices: Vec<String>,
}

impl AdminDashboardModel {
    pub async fn load<B: Backend>(api: &Api<B>) -> Self {
        let mut model = Self::default();

        let (mentees, sessions) = tokio::join!(api.list_mentees(), api.list_all_sessions());
        match mentees {
            Ok(m) => model.mentees = m,
            Err(e) => model.section_failed("mentees", e),
        }
        match sessions {
            Ok(s) => model.sessions = s,
            Err(e) => model.section_failed("sessions", e),
        }
        model
    }

    /// Focuses one mentee and loads the documents shared with them.
    pub async fn select_mentee<B: Backend>(&mut self, api: &Api<B>, mentee_id: &str) {
        self.selected_mentee = Some(mentee_id.to_string());
        match api.list_documents_for(mentee_id).await {
            Ok(documents) => self.documents = documents,
            Err(e) => {
                self.documents.clear();
                self.section_failed("documents", e);
            }
        }
    }

    pub async fn share_document<B: Backend>(
        &mut self,
        api: &Api<B>,
        admin_id: &str,
        title: &str,
        url: &str,
    ) -> Result<(), ClientError> {
        let mentee_id = self
            .selected_mentee
            .clone()
            .ok_or_else(|| ClientError::Validation("Select a mentee first".into()))?;
        let document = api.share_document(admin_id, &mentee_id, title, url).await?;
        self.documents.insert(0, document);
        Ok(())
    }

    pub async fn remove_document<B: Backend>(
        &mut self,
        api: &Api<B>,
        document_id: &str,
    ) -> Result<(), ClientError> {
        api.remove_document(document_id).await?;
        self.documents.retain(|d| d.id != document_id);
        Ok(())
    }

    pub async fn cancel_session<B: Backend>(
        &mut self,
        api: &Api<B>,
        session_id: &str,
    ) -> Result<(), ClientError> {
        let updated = api.cancel_session(session_id).await?;
        self.replace_session(updated);
        Ok(())
    }

    pub async fn complete_session<B: Backend>(
        &mut self,
        api: &Api<B>,
        session_id: &str,
        notes: Option<&str>,
    ) -> Result<(), ClientError> {
        let updated = api.complete_session(session_id, notes).await?;
        self.replace_session(updated);
        Ok(())
    }

    pub async fn reschedule_session<B: Backend>(
        &mut self,
        api: &Api<B>,
        session_id: &str,
        scheduled_at: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<(), ClientError> {
        let updated = api
            .reschedule_session(session_id, scheduled_at, duration_minutes)
            .await?;
        self.replace_session(updated);
        Ok(())
    }

    fn replace_session(&mut self, updated: Session) {
        if let Some(existing) = self.sessions.iter_mut().find(|s| s.id == updated.id) {
            *existing = updated;
        } else {
            self.sessions.push(updated);
        }
    }

    fn section_failed(&mut self, section: &str, e: ClientError) {
        warn!(error = %e, section, "admin dashboard section failed");
        self.notices.push(e.notice());
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }
}
