use serde_json::json;
use uuid::Uuid;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::{Course, Module, ModuleProgress};

impl<B: Backend> Api<B> {
    pub async fn get_courses(&self) -> Result<Vec<Course>, ClientError> {
        let rows = self
            .backend
            .select(Table::Courses, Query::new().order_asc("title"))
            .await?;
        Self::decode_rows(rows)
    }

    /// Modules of a course in unlock order.
    pub async fn get_modules(&self, course_id: &str) -> Result<Vec<Module>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::Modules,
                Query::new()
                    .filter(Filter::eq("course_id", course_id))
                    .order_asc("order_number"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    pub async fn get_module_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<ModuleProgress>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::UserModuleProgress,
                Query::new().filter(Filter::eq("user_id", user_id)),
            )
            .await?;
        Self::decode_rows(rows)
    }

    pub async fn set_module_completed(
        &self,
        user_id: &str,
        module_id: &str,
        completed: bool,
    ) -> Result<ModuleProgress, ClientError> {
        self.upsert_progress(user_id, module_id, json!({ "completed": completed }))
            .await
    }

    pub async fn submit_homework(
        &self,
        user_id: &str,
        module_id: &str,
        submission: &str,
    ) -> Result<ModuleProgress, ClientError> {
        if submission.trim().is_empty() {
            return Err(ClientError::Validation(
                "Homework submission cannot be empty".into(),
            ));
        }
        self.upsert_progress(
            user_id,
            module_id,
            json!({ "homework_submission": submission }),
        )
        .await
    }

    /// Progress rows are one-per-user-per-module; patch the existing row
    /// or create it on first touch.
    async fn upsert_progress(
        &self,
        user_id: &str,
        module_id: &str,
        patch: serde_json::Value,
    ) -> Result<ModuleProgress, ClientError> {
        let query = Query::new()
            .filter(Filter::eq("user_id", user_id))
            .filter(Filter::eq("module_id", module_id));
        let mut rows = self
            .backend
            .update(Table::UserModuleProgress, query, patch.clone())
            .await?;
        if let Some(row) = rows.pop() {
            return Self::decode_row(row);
        }

        let mut row = json!({
            "id": Uuid::new_v4().to_string(),
            "user_id": user_id,
            "module_id": module_id,
            "completed": false,
            "homework_submission": null,
        });
        if let (Some(base), Some(extra)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        let created = self.backend.insert(Table::UserModuleProgress, row).await?;
        Self::decode_row(created)
    }
}
