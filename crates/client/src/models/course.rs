use serde::{Deserialize, Serialize};

/// One row of `courses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One row of `modules`. `order_number` gives the total order used by
/// sequential unlock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub order_number: i64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub homework_prompt: Option<String>,
}

/// One row of `user_module_progress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub id: String,
    pub user_id: String,
    pub module_id: String,
    pub completed: bool,
    #[serde(default)]
    pub homework_submission: Option<String>,
}

impl ModuleProgress {
    pub fn has_homework(&self) -> bool {
        self.homework_submission
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}
