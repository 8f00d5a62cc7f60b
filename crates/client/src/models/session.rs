use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Canceled,
}

impl SessionStatus {
    /// Completed and canceled sessions never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Canceled)
    }
}

/// One row of `mentorship_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: SessionStatus,
    pub student_id: String,
    pub admin_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Session {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes)
    }

    /// Half-open interval overlap with `[start, start + minutes)`.
    pub fn overlaps(&self, start: DateTime<Utc>, minutes: i64) -> bool {
        let candidate_end = start + Duration::minutes(minutes);
        self.scheduled_at < candidate_end && start < self.ends_at()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSession {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: SessionStatus,
    pub student_id: String,
    pub admin_id: String,
}
