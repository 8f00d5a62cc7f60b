use chrono::{DateTime, Utc};
use serde_json::json;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::{NewSession, Session, SessionStatus};

impl<B: Backend> Api<B> {
    /// Scheduled sessions for a student from `now` forward, soonest first.
    pub async fn get_upcoming_sessions(
        &self,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipSessions,
                Query::new()
                    .filter(Filter::eq("student_id", student_id))
                    .filter(Filter::eq("status", "scheduled"))
                    .filter(Filter::gte("scheduled_at", json!(now)))
                    .order_asc("scheduled_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// Every session in the admin's book, most recent first.
    pub async fn list_all_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipSessions,
                Query::new().order_desc("scheduled_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// Sessions for one student inside a time window; the booking wizard's
    /// conflict probe re-queries through this.
    pub async fn sessions_for_student_between(
        &self,
        student_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Session>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::MentorshipSessions,
                Query::new()
                    .filter(Filter::eq("student_id", student_id))
                    .filter(Filter::gte("scheduled_at", json!(from)))
                    .filter(Filter::lte("scheduled_at", json!(to)))
                    .order_asc("scheduled_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    pub async fn create_session(&self, session: NewSession) -> Result<Session, ClientError> {
        tandem_shared::validation::validate_session_title(&session.title)
            .map_err(ClientError::Validation)?;
        let row = self
            .backend
            .insert(Table::MentorshipSessions, serde_json::to_value(&session)?)
            .await?;
        Self::decode_row(row)
    }

    /// Moves a still-scheduled session. Terminal sessions are untouched.
    pub async fn reschedule_session(
        &self,
        session_id: &str,
        scheduled_at: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<Session, ClientError> {
        self.mutate_scheduled(
            session_id,
            json!({ "scheduled_at": scheduled_at, "duration_minutes": duration_minutes }),
        )
        .await
    }

    pub async fn cancel_session(&self, session_id: &str) -> Result<Session, ClientError> {
        self.mutate_scheduled(session_id, json!({ "status": SessionStatus::Canceled }))
            .await
    }

    pub async fn complete_session(
        &self,
        session_id: &str,
        notes: Option<&str>,
    ) -> Result<Session, ClientError> {
        let mut patch = json!({ "status": SessionStatus::Completed });
        if let Some(notes) = notes {
            patch["notes"] = json!(notes);
        }
        self.mutate_scheduled(session_id, patch).await
    }

    async fn mutate_scheduled(
        &self,
        session_id: &str,
        patch: serde_json::Value,
    ) -> Result<Session, ClientError> {
        let mut rows = self
            .backend
            .update(
                Table::MentorshipSessions,
                Query::new()
                    .filter(Filter::eq("id", session_id))
                    .filter(Filter::eq("status", "scheduled")),
                patch,
            )
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("scheduled session {session_id}")))?;
        Self::decode_row(row)
    }
}
