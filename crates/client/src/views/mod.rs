//! Per-screen data-flow models. Each screen composes api calls with local
//! state and degrades to an inert state plus a dismissible notice on
//! failure; nothing here renders anything.

mod admin;
mod course;
mod dashboard;
mod profile;

pub use admin::AdminDashboardModel;
pub use course::{CourseProgress, CourseViewerModel};
pub use dashboard::{CourseSummary, DashboardModel};
pub use profile::ProfileModel;

/// Every screen the platform has. Navigation between them is the shell's
/// job; the guard in [`crate::auth`] decides who may land where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Login,
    Signup,
    Dashboard,
    CourseViewer,
    Profile,
    Chat,
    AdminDashboard,
    AdminChat,
}

impl Screen {
    pub fn is_protected(self) -> bool {
        !matches!(self, Screen::Welcome | Screen::Login | Screen::Signup)
    }

    pub fn is_admin_only(self) -> bool {
        matches!(self, Screen::AdminDashboard | Screen::AdminChat)
    }
}
