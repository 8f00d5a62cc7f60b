//! Three-step session booking: pick the mentee, pick a slot, confirm.
//! The step-2 exit runs the conflict probe; a detected overlap blocks the
//! transition until the slot changes.

use chrono::{DateTime, Duration, Utc};
use tandem_shared::constants::{
    CONFLICT_WINDOW_AFTER_HOURS, CONFLICT_WINDOW_BEFORE_HOURS, DEFAULT_SESSION_MINUTES,
};

use crate::api::Api;
use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{NewSession, Session, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectUser,
    Schedule,
    Confirm,
    Done,
}

pub struct BookingWizard {
    admin_id: String,
    step: Step,
    student_id: Option<String>,
    title: String,
    description: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    duration_minutes: i64,
    conflict: Option<String>,
}

impl BookingWizard {
    pub fn new(admin_id: impl Into<String>) -> Self {
        Self {
            admin_id: admin_id.into(),
            step: Step::SelectUser,
            student_id: None,
            title: String::new(),
            description: None,
            scheduled_at: None,
            duration_minutes: DEFAULT_SESSION_MINUTES,
            conflict: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn conflict(&self) -> Option<&str> {
        self.conflict.as_deref()
    }

    pub fn select_user(&mut self, student_id: impl Into<String>) -> Result<(), ClientError> {
        if self.step != Step::SelectUser {
            return Err(ClientError::Validation("Select a mentee first".into()));
        }
        self.student_id = Some(student_id.into());
        self.step = Step::Schedule;
        Ok(())
    }

    pub fn set_details(&mut self, title: impl Into<String>, description: Option<String>) {
        self.title = title.into();
        self.description = description;
    }

    pub fn set_slot(&mut self, scheduled_at: DateTime<Utc>, duration_minutes: i64) {
        self.scheduled_at = Some(scheduled_at);
        self.duration_minutes = duration_minutes;
        // A new slot invalidates the previous probe result.
        self.conflict = None;
    }

    /// Step 2 → 3. Re-queries the student's sessions in a generous window
    /// around the candidate start and tests interval overlap; any overlap
    /// with a non-canceled session sets the conflict flag and blocks the
    /// transition.
    pub async fn confirm_slot<B: Backend>(&mut self, api: &Api<B>) -> Result<bool, ClientError> {
        if self.step != Step::Schedule {
            return Err(ClientError::Validation("Pick a time first".into()));
        }
        let student_id = self
            .student_id
            .clone()
            .ok_or_else(|| ClientError::Validation("No mentee selected".into()))?;
        let start = self
            .scheduled_at
            .ok_or_else(|| ClientError::Validation("Pick a date and time".into()))?;
        if self.duration_minutes <= 0 {
            return Err(ClientError::Validation("Duration must be positive".into()));
        }

        let window_start = start - Duration::hours(CONFLICT_WINDOW_BEFORE_HOURS);
        let window_end = start + Duration::hours(CONFLICT_WINDOW_AFTER_HOURS);
        let nearby = api
            .sessions_for_student_between(&student_id, window_start, window_end)
            .await?;

        let clash = nearby
            .iter()
            .filter(|s| s.status != SessionStatus::Canceled)
            .find(|s| s.overlaps(start, self.duration_minutes));

        if let Some(existing) = clash {
            self.conflict = Some(format!(
                "Overlaps \"{}\" at {}",
                existing.title,
                existing.scheduled_at.format("%Y-%m-%d %H:%M")
            ));
            return Ok(false);
        }

        self.conflict = None;
        self.step = Step::Confirm;
        Ok(true)
    }

    /// Final step: writes one scheduled session.
    pub async fn book<B: Backend>(&mut self, api: &Api<B>) -> Result<Session, ClientError> {
        if self.step != Step::Confirm {
            return Err(ClientError::Validation("Confirm the details first".into()));
        }
        let (Some(scheduled_at), Some(student_id)) = (self.scheduled_at, self.student_id.clone())
        else {
            return Err(ClientError::Validation("Booking details incomplete".into()));
        };
        let session = api
            .create_session(NewSession {
                title: self.title.clone(),
                description: self.description.clone(),
                scheduled_at,
                duration_minutes: self.duration_minutes,
                status: SessionStatus::Scheduled,
                student_id,
                admin_id: self.admin_id.clone(),
            })
            .await?;
        self.step = Step::Done;
        Ok(session)
    }

    /// Steps backward without losing anything already entered.
    pub fn back(&mut self) {
        self.step = match self.step {
            Step::SelectUser | Step::Schedule => Step::SelectUser,
            Step::Confirm => Step::Schedule,
            Step::Done => Step::Done,
        };
    }
}
