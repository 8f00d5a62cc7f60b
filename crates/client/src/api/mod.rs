//! Data-access layer: domain operations mapped one-to-one onto backend
//! queries. No business rules live here — just pass-through with light
//! shaping into typed models. One file per domain area.

mod calendar;
mod courses;
mod documents;
mod goals;
mod messages;
mod profiles;
mod sessions;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::Backend;
use crate::error::ClientError;

pub struct Api<B> {
    backend: B,
    mentor_email: Option<String>,
}

impl<B: Backend> Api<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mentor_email: None,
        }
    }

    /// Bootstrap fallback for mentor resolution on datasets that predate
    /// the profile role column.
    pub fn with_mentor_email(mut self, email: impl Into<String>) -> Self {
        self.mentor_email = Some(email.into());
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn mentor_email(&self) -> Option<&str> {
        self.mentor_email.as_deref()
    }

    pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ClientError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(ClientError::from))
            .collect()
    }

    pub(crate) fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, ClientError> {
        serde_json::from_value(row).map_err(ClientError::from)
    }
}
