//! REST + WebSocket implementation of [`Backend`] against the hosted
//! backend service. Row operations map onto `/rest/v1/{table}`, auth onto
//! `/auth/v1/*`, and subscriptions onto the change-feed socket.
//!
//! No request timeout is configured; a hung request hangs only the awaiting
//! caller.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::backend::{feed, Backend, ChangeFeed, Filter, Op, Query, Table};
use crate::config::Config;
use crate::error::ClientError;
use crate::models::AuthSession;

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    feed_url: String,
    api_key: String,
    session: RwLock<Option<AuthSession>>,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.backend_url)
            .map_err(|e| ClientError::Validation(format!("invalid backend URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation("backend URL has no host".into()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            feed_url: config.feed_url.clone(),
            api_key: config.backend_api_key.clone(),
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, segments: [&str; 3]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn rest_url(&self, table: Table, query: &Query) -> Url {
        let mut url = self.endpoint(["rest", "v1", table.as_str()]);
        apply_query(&mut url, query);
        url
    }

    async fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", v);
        }
        if let Some(session) = self.session.read().await.as_ref() {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", session.access_token)) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        headers
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "backend request failed".into());
        if status.as_u16() == 401 {
            return Err(ClientError::NotAuthenticated);
        }
        Err(ClientError::backend(status.as_u16(), message))
    }

    async fn auth_request(&self, url: Url, body: Value) -> Result<AuthSession, ClientError> {
        let response = self
            .http
            .post(url)
            .headers(self.headers().await)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let session: AuthSession = response.json().await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn op_name(op: Op) -> &'static str {
    match op {
        Op::Eq => "eq",
        Op::Gte => "gte",
        Op::Lte => "lte",
    }
}

/// Inside an `or=` group a filter takes the `col.op.value` form instead of
/// `col=op.value`.
fn render_branch_filter(filter: &Filter) -> String {
    format!(
        "{}.{}.{}",
        filter.column,
        op_name(filter.op),
        render_value(&filter.value)
    )
}

fn apply_query(url: &mut Url, query: &Query) {
    if query.filters.is_empty()
        && query.any_of.is_empty()
        && query.order_by.is_none()
        && query.limit.is_none()
    {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for filter in &query.filters {
        pairs.append_pair(
            &filter.column,
            &format!("{}.{}", op_name(filter.op), render_value(&filter.value)),
        );
    }

    if !query.any_of.is_empty() {
        let branches: Vec<String> = query
            .any_of
            .iter()
            .map(|branch| {
                let inner: Vec<String> = branch.iter().map(render_branch_filter).collect();
                format!("and({})", inner.join(","))
            })
            .collect();
        pairs.append_pair("or", &format!("({})", branches.join(",")));
    }

    if let Some((column, ascending)) = &query.order_by {
        let direction = if *ascending { "asc" } else { "desc" };
        pairs.append_pair("order", &format!("{column}.{direction}"));
    }

    if let Some(limit) = query.limit {
        pairs.append_pair("limit", &limit.to_string());
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn select(&self, table: Table, query: Query) -> Result<Vec<Value>, ClientError> {
        let url = self.rest_url(table, &query);
        debug!(table = table.as_str(), "select");
        let response = self.http.get(url).headers(self.headers().await).send().await?;
        let rows = Self::check(response).await?.json().await?;
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, ClientError> {
        let url = self.rest_url(table, &Query::new());
        debug!(table = table.as_str(), "insert");
        let response = self
            .http
            .post(url)
            .headers(self.headers().await)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut rows: Vec<Value> = Self::check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| ClientError::backend(500, "insert returned no row"))
    }

    async fn update(
        &self,
        table: Table,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Value>, ClientError> {
        let url = self.rest_url(table, &query);
        debug!(table = table.as_str(), "update");
        let response = self
            .http
            .patch(url)
            .headers(self.headers().await)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows = Self::check(response).await?.json().await?;
        Ok(rows)
    }

    async fn delete(&self, table: Table, query: Query) -> Result<(), ClientError> {
        let url = self.rest_url(table, &query);
        debug!(table = table.as_str(), "delete");
        let response = self
            .http
            .delete(url)
            .headers(self.headers().await)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthSession, ClientError> {
        self.auth_request(
            self.endpoint(["auth", "v1", "signup"]),
            json!({ "email": email, "password": password, "full_name": full_name }),
        )
        .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let mut url = self.endpoint(["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");
        self.auth_request(url, json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        let url = self.endpoint(["auth", "v1", "logout"]);
        let response = self
            .http
            .post(url)
            .headers(self.headers().await)
            .send()
            .await?;
        Self::check(response).await?;
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, ClientError> {
        Ok(self.session.read().await.clone())
    }

    async fn subscribe(&self, table: Table) -> Result<ChangeFeed, ClientError> {
        feed::connect(&self.feed_url, &self.api_key, table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        let config = Config {
            backend_url: "http://localhost:54321".into(),
            backend_api_key: "test-key".into(),
            feed_url: "ws://localhost:54321/realtime/v1".into(),
            mentor_email: None,
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn renders_filters_order_and_limit() {
        let query = Query::new()
            .filter(Filter::eq("student_id", "u1"))
            .filter(Filter::gte("scheduled_at", "2024-05-01T10:00:00+00:00"))
            .order_asc("scheduled_at")
            .limit(5);
        let url = backend().rest_url(Table::MentorshipSessions, &query);

        assert_eq!(url.path(), "/rest/v1/mentorship_sessions");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("student_id".into(), "eq.u1".into())));
        assert!(pairs.contains(&("scheduled_at".into(), "gte.2024-05-01T10:00:00+00:00".into())));
        assert!(pairs.contains(&("order".into(), "scheduled_at.asc".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
        // the timestamp offset sign must survive encoding, not decay to a space
        assert!(url.query().unwrap().contains("%2B00%3A00"));
    }

    #[test]
    fn renders_disjunction_branches() {
        let query = Query::new().any_of(vec![
            vec![Filter::eq("sender_id", "a"), Filter::eq("receiver_id", "b")],
            vec![Filter::eq("sender_id", "b"), Filter::eq("receiver_id", "a")],
        ]);
        let url = backend().rest_url(Table::MentorshipMessages, &query);

        let or = url
            .query_pairs()
            .find(|(k, _)| k == "or")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(
            or,
            "(and(sender_id.eq.a,receiver_id.eq.b),and(sender_id.eq.b,receiver_id.eq.a))"
        );
    }

    #[test]
    fn empty_query_renders_no_query_string() {
        let url = backend().rest_url(Table::Profiles, &Query::new());
        assert_eq!(url.query(), None);
    }
}
