use serde_json::json;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::{Goal, GoalStatus, NewGoal};

impl<B: Backend> Api<B> {
    pub async fn get_goals(&self, user_id: &str) -> Result<Vec<Goal>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::Goals,
                Query::new()
                    .filter(Filter::eq("user_id", user_id))
                    .order_asc("title"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    pub async fn create_goal(&self, goal: NewGoal) -> Result<Goal, ClientError> {
        tandem_shared::validation::validate_goal_title(&goal.title)
            .map_err(ClientError::Validation)?;
        tandem_shared::validation::validate_progress_percentage(goal.progress_percentage)
            .map_err(ClientError::Validation)?;
        let row = self
            .backend
            .insert(Table::Goals, serde_json::to_value(&goal)?)
            .await?;
        Self::decode_row(row)
    }

    /// Sets progress; reaching 100 flips the goal to completed in the same
    /// patch.
    pub async fn update_goal_progress(
        &self,
        goal_id: &str,
        progress_percentage: i64,
    ) -> Result<Goal, ClientError> {
        tandem_shared::validation::validate_progress_percentage(progress_percentage)
            .map_err(ClientError::Validation)?;
        let status = if progress_percentage == 100 {
            GoalStatus::Completed
        } else {
            GoalStatus::Active
        };
        let mut rows = self
            .backend
            .update(
                Table::Goals,
                Query::new().filter(Filter::eq("id", goal_id)),
                json!({ "progress_percentage": progress_percentage, "status": status }),
            )
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("goal {goal_id}")))?;
        Self::decode_row(row)
    }

    pub async fn set_goal_status(
        &self,
        goal_id: &str,
        status: GoalStatus,
    ) -> Result<Goal, ClientError> {
        let mut rows = self
            .backend
            .update(
                Table::Goals,
                Query::new().filter(Filter::eq("id", goal_id)),
                json!({ "status": status }),
            )
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("goal {goal_id}")))?;
        Self::decode_row(row)
    }
}
