//! Learner dashboard: profile header, upcoming sessions, goals, course
//! progress summaries, calendar notes. Sections load independently and
//! fail soft — one broken query leaves that section empty with a notice.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::api::Api;
use crate::backend::Backend;
use crate::models::{CalendarNote, Course, Goal, Profile, Session};
use crate::views::course::percent_complete;

#[derive(Debug, Clone)]
pub struct CourseSummary {
    pub course: Course,
    pub percent: i64,
}

#[derive(Default)]
pub struct DashboardModel {
    pub profile: Option<Profile>,
    pub upcoming_sessions: Vec<Session>,
    pub goals: Vec<Goal>,
    pub courses: Vec<CourseSummary>,
    pub calendar_notes: Vec<CalendarNote>,
    pub notices: Vec<String>,
}

impl DashboardModel {
    pub async fn load<B: Backend>(api: &Api<B>, user_id: &str, now: DateTime<Utc>) -> Self {
        let mut model = Self::default();

        let (profile, sessions, goals, notes) = tokio::join!(
            api.get_user_profile(user_id),
            api.get_upcoming_sessions(user_id, now),
            api.get_goals(user_id),
            api.get_calendar_notes(user_id),
        );

        match profile {
            Ok(p) => model.profile = Some(p),
            Err(e) => model.section_failed("profile", e),
        }
        match sessions {
            Ok(s) => model.upcoming_sessions = s,
            Err(e) => model.section_failed("sessions", e),
        }
        match goals {
            Ok(g) => model.goals = g,
            Err(e) => model.section_failed("goals", e),
        }
        match notes {
            Ok(n) => model.calendar_notes = n,
            Err(e) => model.section_failed("calendar", e),
        }

        model.load_course_summaries(api, user_id).await;
        model
    }

    async fn load_course_summaries<B: Backend>(&mut self, api: &Api<B>, user_id: &str) {
        let courses = match api.get_courses().await {
            Ok(c) => c,
            Err(e) => return self.section_failed("courses", e),
        };
        let progress = match api.get_module_progress(user_id).await {
            Ok(p) => p,
            Err(e) => return self.section_failed("courses", e),
        };

        for course in courses {
            let modules = match api.get_modules(&course.id).await {
                Ok(m) => m,
                Err(e) => {
                    self.section_failed("courses", e);
                    continue;
                }
            };
            let percent = percent_complete(modules.len(), |i| {
                progress
                    .iter()
                    .any(|p| p.module_id == modules[i].id && p.completed)
            });
            self.courses.push(CourseSummary { course, percent });
        }
    }

    fn section_failed(&mut self, section: &str, e: crate::error::ClientError) {
        warn!(error = %e, section, "dashboard section failed");
        self.notices.push(e.notice());
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }
}
