use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::CalendarNote;

impl<B: Backend> Api<B> {
    pub async fn get_calendar_notes(&self, user_id: &str) -> Result<Vec<CalendarNote>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::CalendarNotes,
                Query::new()
                    .filter(Filter::eq("user_id", user_id))
                    .order_asc("date"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// One note per user per day; an existing note is overwritten.
    pub async fn upsert_calendar_note(
        &self,
        user_id: &str,
        date: NaiveDate,
        note: &str,
    ) -> Result<CalendarNote, ClientError> {
        if note.trim().is_empty() {
            return Err(ClientError::Validation("Note text is required".into()));
        }
        let query = Query::new()
            .filter(Filter::eq("user_id", user_id))
            .filter(Filter::eq("date", json!(date)));
        let mut rows = self
            .backend
            .update(
                Table::CalendarNotes,
                query,
                json!({ "note": note.trim() }),
            )
            .await?;
        if let Some(row) = rows.pop() {
            return Self::decode_row(row);
        }
        let created = self
            .backend
            .insert(
                Table::CalendarNotes,
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "user_id": user_id,
                    "date": date,
                    "note": note.trim(),
                }),
            )
            .await?;
        Self::decode_row(created)
    }

    pub async fn delete_calendar_note(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<(), ClientError> {
        self.backend
            .delete(
                Table::CalendarNotes,
                Query::new()
                    .filter(Filter::eq("user_id", user_id))
                    .filter(Filter::eq("date", json!(date))),
            )
            .await
    }
}
