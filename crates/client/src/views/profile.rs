//! Profile screen: own profile plus goal management.

use tracing::warn;

use crate::api::Api;
use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{Goal, GoalStatus, NewGoal, Profile};

#[derive(Default)]
pub struct ProfileModel {
    pub profile: Option<Profile>,
    pub goals: Vec<Goal>,
    pub notices: Vec<String>,
}

impl ProfileModel {
    pub async fn load<B: Backend>(api: &Api<B>, user_id: &str) -> Self {
        let mut model = Self::default();
        let (profile, goals) = tokio::join!(api.get_user_profile(user_id), api.get_goals(user_id));
        match profile {
            Ok(p) => model.profile = Some(p),
            Err(e) => model.section_failed("profile", e),
        }
        match goals {
            Ok(g) => model.goals = g,
            Err(e) => model.section_failed("goals", e),
        }
        model
    }

    pub async fn update_name<B: Backend>(
        &mut self,
        api: &Api<B>,
        user_id: &str,
        full_name: &str,
    ) -> Result<(), ClientError> {
        let updated = api.update_profile(user_id, Some(full_name), None).await?;
        self.profile = Some(updated);
        Ok(())
    }

    pub async fn add_goal<B: Backend>(
        &mut self,
        api: &Api<B>,
        user_id: &str,
        title: &str,
        category: Option<String>,
        priority: Option<String>,
    ) -> Result<(), ClientError> {
        let goal = api
            .create_goal(NewGoal {
                user_id: user_id.to_string(),
                title: title.to_string(),
                category,
                priority,
                progress_percentage: 0,
                status: GoalStatus::Active,
            })
            .await?;
        self.goals.push(goal);
        Ok(())
    }

    pub async fn set_goal_progress<B: Backend>(
        &mut self,
        api: &Api<B>,
        goal_id: &str,
        progress_percentage: i64,
    ) -> Result<(), ClientError> {
        let updated = api.update_goal_progress(goal_id, progress_percentage).await?;
        if let Some(existing) = self.goals.iter_mut().find(|g| g.id == updated.id) {
            *existing = updated;
        }
        Ok(())
    }

    fn section_failed(&mut self, section: &str, e: ClientError) {
        warn!(error = %e, section, "profile section failed");
        self.notices.push(e.notice());
    }
}
