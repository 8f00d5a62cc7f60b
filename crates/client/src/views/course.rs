//! Course viewer: sequential unlock over the module order, forward
//! cascade on un-completion, and homework submission.
//!
//! Unlock policy: a module is reachable only when every strictly earlier
//! module is completed and has a non-empty homework submission.

use std::collections::HashMap;

use tracing::warn;

use crate::api::Api;
use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{Module, ModuleProgress};

pub struct CourseProgress {
    user_id: String,
    modules: Vec<Module>,
    progress: HashMap<String, ModuleProgress>,
}

impl CourseProgress {
    pub fn new(user_id: impl Into<String>, mut modules: Vec<Module>) -> Self {
        modules.sort_by_key(|m| m.order_number);
        Self {
            user_id: user_id.into(),
            modules,
            progress: HashMap::new(),
        }
    }

    pub async fn load<B: Backend>(
        api: &Api<B>,
        user_id: &str,
        course_id: &str,
    ) -> Result<Self, ClientError> {
        let modules = api.get_modules(course_id).await?;
        let mut state = Self::new(user_id, modules);
        let module_ids: Vec<&str> = state.modules.iter().map(|m| m.id.as_str()).collect();
        for row in api.get_module_progress(user_id).await? {
            if module_ids.contains(&row.module_id.as_str()) {
                state.progress.insert(row.module_id.clone(), row);
            }
        }
        Ok(state)
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    fn satisfied(&self, module: &Module) -> bool {
        self.progress
            .get(&module.id)
            .map(|p| p.completed && p.has_homework())
            .unwrap_or(false)
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.modules
            .get(index)
            .and_then(|m| self.progress.get(&m.id))
            .map(|p| p.completed)
            .unwrap_or(false)
    }

    pub fn homework(&self, index: usize) -> Option<&str> {
        self.modules
            .get(index)
            .and_then(|m| self.progress.get(&m.id))
            .and_then(|p| p.homework_submission.as_deref())
    }

    /// Module 0 is always unlocked; module N needs every earlier module
    /// completed with homework turned in.
    pub fn is_unlocked(&self, index: usize) -> bool {
        index < self.modules.len() && self.modules[..index].iter().all(|m| self.satisfied(m))
    }

    /// Completed modules over total, rounded to the nearest integer.
    pub fn percent(&self) -> i64 {
        percent_complete(self.modules.len(), |i| self.is_completed(i))
    }

    pub async fn mark_complete<B: Backend>(
        &mut self,
        api: &Api<B>,
        index: usize,
    ) -> Result<(), ClientError> {
        if !self.is_unlocked(index) {
            return Err(ClientError::Validation(
                "Finish the earlier modules first".into(),
            ));
        }
        let module_id = self.modules[index].id.clone();
        let updated = api
            .set_module_completed(&self.user_id, &module_id, true)
            .await?;
        self.progress.insert(module_id, updated);
        Ok(())
    }

    /// Un-completes a module and cascades forward: every later module
    /// loses its completion (homework submissions stay), one row at a
    /// time.
    pub async fn mark_incomplete<B: Backend>(
        &mut self,
        api: &Api<B>,
        index: usize,
    ) -> Result<(), ClientError> {
        if index >= self.modules.len() {
            return Err(ClientError::NotFound(format!("module {index}")));
        }
        for i in index..self.modules.len() {
            if i == index || self.is_completed(i) {
                let module_id = self.modules[i].id.clone();
                let updated = api
                    .set_module_completed(&self.user_id, &module_id, false)
                    .await?;
                self.progress.insert(module_id, updated);
            }
        }
        Ok(())
    }

    pub async fn submit_homework<B: Backend>(
        &mut self,
        api: &Api<B>,
        index: usize,
        submission: &str,
    ) -> Result<(), ClientError> {
        if !self.is_unlocked(index) {
            return Err(ClientError::Validation(
                "Finish the earlier modules first".into(),
            ));
        }
        let module_id = self.modules[index].id.clone();
        let updated = api
            .submit_homework(&self.user_id, &module_id, submission)
            .await?;
        self.progress.insert(module_id, updated);
        Ok(())
    }
}

pub(crate) fn percent_complete(total: usize, is_done: impl Fn(usize) -> bool) -> i64 {
    if total == 0 {
        return 0;
    }
    let done = (0..total).filter(|&i| is_done(i)).count();
    ((done as f64 / total as f64) * 100.0).round() as i64
}

/// Screen state for the course viewer.
pub struct CourseViewerModel {
    pub course_id: String,
    pub progress: Option<CourseProgress>,
    pub notice: Option<String>,
}

impl CourseViewerModel {
    pub async fn load<B: Backend>(api: &Api<B>, user_id: &str, course_id: &str) -> Self {
        match CourseProgress::load(api, user_id, course_id).await {
            Ok(progress) => Self {
                course_id: course_id.to_string(),
                progress: Some(progress),
                notice: None,
            },
            Err(e) => {
                warn!(error = %e, course_id, "course viewer load failed");
                Self {
                    course_id: course_id.to_string(),
                    progress: None,
                    notice: Some(e.notice()),
                }
            }
        }
    }
}
