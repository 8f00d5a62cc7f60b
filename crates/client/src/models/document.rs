use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of `documents`, shared by the admin with a mentee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub owner_id: String,
    pub shared_with: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// One row of `calendar_notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarNote {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub note: String,
}
