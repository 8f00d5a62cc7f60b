//! Process-wide session state: who is signed in and with what role,
//! broadcast to every interested view through a watch channel.
//!
//! The role is read from the profile row exactly once, when the session is
//! established. Nothing downstream re-derives it.

use tokio::sync::watch;
use tracing::info;

use crate::api::Api;
use crate::backend::Backend;
use crate::error::ClientError;
use crate::models::{CurrentUser, Profile, Role};
use crate::views::Screen;

pub struct AuthContext {
    tx: watch::Sender<Option<CurrentUser>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn current(&self) -> Option<CurrentUser> {
        self.tx.borrow().clone()
    }

    /// Auth-state changes, for anything that needs to react to sign-in or
    /// sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.tx.subscribe()
    }

    pub async fn sign_in<B: Backend>(
        &self,
        api: &Api<B>,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, ClientError> {
        tandem_shared::validation::validate_email(email).map_err(ClientError::Validation)?;
        let session = api.backend().sign_in(email, password).await?;
        let profile = api.get_user_profile(&session.user_id).await?;
        Ok(self.establish(profile))
    }

    /// Signs up, creates the profile row (every new account is a mentee),
    /// and establishes the session.
    pub async fn sign_up<B: Backend>(
        &self,
        api: &Api<B>,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<CurrentUser, ClientError> {
        tandem_shared::validation::validate_email(email).map_err(ClientError::Validation)?;
        tandem_shared::validation::validate_password(password).map_err(ClientError::Validation)?;
        tandem_shared::validation::validate_full_name(full_name)
            .map_err(ClientError::Validation)?;

        let session = api.backend().sign_up(email, password, full_name).await?;
        let profile = Profile {
            id: session.user_id.clone(),
            email: session.email.clone(),
            full_name: full_name.trim().to_string(),
            avatar_url: None,
            role: Role::Mentee,
        };
        api.backend()
            .insert(
                crate::backend::Table::Profiles,
                serde_json::to_value(&profile)?,
            )
            .await?;
        Ok(self.establish(profile))
    }

    /// Re-derives the current user from an existing backend session, if any.
    pub async fn restore<B: Backend>(
        &self,
        api: &Api<B>,
    ) -> Result<Option<CurrentUser>, ClientError> {
        let Some(session) = api.backend().current_session().await? else {
            self.tx.send_replace(None);
            return Ok(None);
        };
        let profile = api.get_user_profile(&session.user_id).await?;
        Ok(Some(self.establish(profile)))
    }

    pub async fn sign_out<B: Backend>(&self, api: &Api<B>) -> Result<(), ClientError> {
        api.backend().sign_out().await?;
        self.tx.send_replace(None);
        Ok(())
    }

    fn establish(&self, profile: Profile) -> CurrentUser {
        let user = CurrentUser {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
        };
        info!(user_id = %user.id, admin = user.is_admin(), "session established");
        self.tx.send_replace(Some(user.clone()));
        user
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Screen),
}

/// Authorization is a redirect, never an error: unauthenticated visitors
/// of protected screens go to login, non-admins visiting admin screens go
/// to their dashboard, and signed-in users skip the marketing/auth screens.
pub fn guard(user: Option<&CurrentUser>, screen: Screen) -> Access {
    match (user, screen) {
        (None, s) if s.is_protected() => Access::Redirect(Screen::Login),
        (Some(u), s) if s.is_admin_only() && !u.is_admin() => {
            Access::Redirect(Screen::Dashboard)
        }
        (Some(u), Screen::Welcome | Screen::Login | Screen::Signup) => {
            Access::Redirect(u.home_screen())
        }
        _ => Access::Allow,
    }
}

impl CurrentUser {
    pub fn home_screen(&self) -> Screen {
        if self.is_admin() {
            Screen::AdminDashboard
        } else {
            Screen::Dashboard
        }
    }
}
