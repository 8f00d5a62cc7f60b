use serde_json::json;
use tracing::warn;

use crate::api::Api;
use crate::backend::{Backend, Filter, Query, Table};
use crate::error::ClientError;
use crate::models::{Profile, Role};

impl<B: Backend> Api<B> {
    pub async fn get_user_profile(&self, user_id: &str) -> Result<Profile, ClientError> {
        let rows = self
            .backend
            .select(Table::Profiles, Query::new().filter(Filter::eq("id", user_id)))
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("profile {user_id}")))?;
        Self::decode_row(row)
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Profile, ClientError> {
        let mut patch = serde_json::Map::new();
        if let Some(name) = full_name {
            tandem_shared::validation::validate_full_name(name)
                .map_err(ClientError::Validation)?;
            patch.insert("full_name".into(), json!(name.trim()));
        }
        if let Some(url) = avatar_url {
            patch.insert("avatar_url".into(), json!(url));
        }
        let mut rows = self
            .backend
            .update(
                Table::Profiles,
                Query::new().filter(Filter::eq("id", user_id)),
                serde_json::Value::Object(patch),
            )
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| ClientError::NotFound(format!("profile {user_id}")))?;
        Self::decode_row(row)
    }

    /// All mentee profiles, for the admin dashboard user list.
    pub async fn list_mentees(&self) -> Result<Vec<Profile>, ClientError> {
        let rows = self
            .backend
            .select(
                Table::Profiles,
                Query::new()
                    .filter(Filter::eq("role", "mentee"))
                    .order_asc("full_name"),
            )
            .await?;
        Self::decode_rows(rows)
    }

    /// Resolves the single designated mentor account.
    ///
    /// The role attribute is authoritative. The email-filtered lookup is a
    /// bootstrap fallback for datasets that predate the role column and is
    /// only attempted when a mentor email is configured.
    pub async fn resolve_mentor(&self) -> Result<Profile, ClientError> {
        let rows = self
            .backend
            .select(
                Table::Profiles,
                Query::new()
                    .filter(Filter::eq("role", "admin"))
                    .limit(1),
            )
            .await?;
        if let Some(row) = rows.into_iter().next() {
            return Self::decode_row(row);
        }

        let Some(email) = self.mentor_email() else {
            return Err(ClientError::NotFound("mentor profile".into()));
        };
        warn!("no admin-role profile found; falling back to mentor email lookup");
        let rows = self
            .backend
            .select(
                Table::Profiles,
                Query::new().filter(Filter::eq("email", email)).limit(1),
            )
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound("mentor profile".into()))?;
        let mut profile: Profile = Self::decode_row(row)?;
        profile.role = Role::Admin;
        Ok(profile)
    }
}
