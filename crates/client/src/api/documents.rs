use serde_json::json;
use uuid::Uuid;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::Document;

impl<B: Backend> Api<B> {
    /// Documents shared with a mentee, newest first.
    pub async fn list_documents_for(&self, user_id: &str) -> Result<Vec<Document>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::Documents,
                Query::new()
                    .filter(Filter::eq("shared_with", user_id))
                    .order_desc("created_at"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    pub async fn share_document(
        &self,
        owner_id: &str,
        shared_with: &str,
        title: &str,
        url: &str,
    ) -> Result<Document, ClientError> {
        if title.trim().is_empty() {
            return Err(ClientError::Validation("Document title is required".into()));
        }
        if url.trim().is_empty() {
            return Err(ClientError::Validation("Document link is required".into()));
        }
        let row = self
            .backend
            .insert(
                Table::Documents,
                json!({
                    "id": Uuid::new_v4().to_string(),
                    "owner_id": owner_id,
                    "shared_with": shared_with,
                    "title": title.trim(),
                    "url": url.trim(),
                    "created_at": chrono::Utc::now(),
                }),
            )
            .await?;
        Self::decode_row(row)
    }

    pub async fn remove_document(&self, document_id: &str) -> Result<(), ClientError> {
        self.backend
            .delete(
                Table::Documents,
                Query::new().filter(Filter::eq("id", document_id)),
            )
            .await
    }
}
