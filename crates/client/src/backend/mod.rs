//! The seam to the hosted backend: row-level table operations, the auth
//! primitive, and the change-feed subscription primitive. Everything above
//! this module is generic over [`Backend`], so tests run against an
//! in-memory fake and production runs against [`HttpBackend`].

pub mod feed;
pub mod http;

pub use feed::ChangeFeed;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::models::AuthSession;

/// Tables the backend exposes to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    MentorshipSessions,
    MentorshipMessages,
    Goals,
    Documents,
    CalendarNotes,
    Courses,
    Modules,
    UserModuleProgress,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::MentorshipSessions => "mentorship_sessions",
            Table::MentorshipMessages => "mentorship_messages",
            Table::Goals => "goals",
            Table::Documents => "documents",
            Table::CalendarNotes => "calendar_notes",
            Table::Courses => "courses",
            Table::Modules => "modules",
            Table::UserModuleProgress => "user_module_progress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

/// One column predicate.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: Op::Gte,
            value: value.into(),
        }
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: Op::Lte,
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        let field = match row.get(&self.column) {
            Some(v) => v,
            None => return false,
        };
        match self.op {
            Op::Eq => field == &self.value,
            Op::Gte => compare(field, &self.value).map(|o| o.is_ge()).unwrap_or(false),
            Op::Lte => compare(field, &self.value).map(|o| o.is_le()).unwrap_or(false),
        }
    }
}

/// Range predicates only make sense on homogeneous scalars. RFC 3339 UTC
/// timestamps compare correctly as strings.
fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        _ => None,
    }
}

/// A row-level query: conjunctive filters, an optional disjunction of
/// conjunctions (`any_of`), ordering, and a limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub any_of: Vec<Vec<Filter>>,
    pub order_by: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a disjunction: a row matches if any branch's filters all hold.
    pub fn any_of(mut self, branches: Vec<Vec<Filter>>) -> Self {
        self.any_of = branches;
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some((column.into(), true));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some((column.into(), false));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluates the query against one row. Used by in-memory backends;
    /// the HTTP backend pushes the same semantics to the server.
    pub fn matches(&self, row: &Value) -> bool {
        if !self.filters.iter().all(|f| f.matches(row)) {
            return false;
        }
        if self.any_of.is_empty() {
            return true;
        }
        self.any_of
            .iter()
            .any(|branch| branch.iter().all(|f| f.matches(row)))
    }

    /// Applies ordering and limit to an already-filtered row set.
    pub fn shape(&self, mut rows: Vec<Value>) -> Vec<Value> {
        if let Some((column, ascending)) = &self.order_by {
            rows.sort_by(|a, b| {
                let ord = match (a.get(column), b.get(column)) {
                    (Some(x), Some(y)) => compare(x, y).unwrap_or(std::cmp::Ordering::Equal),
                    _ => std::cmp::Ordering::Equal,
                };
                if *ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// One event from the change feed: the new state of a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    Insert { table: Table, row: Value },
    Update { table: Table, row: Value },
}

impl ChangeEvent {
    pub fn table(&self) -> Table {
        match self {
            ChangeEvent::Insert { table, .. } | ChangeEvent::Update { table, .. } => *table,
        }
    }

    pub fn row(&self) -> &Value {
        match self {
            ChangeEvent::Insert { row, .. } | ChangeEvent::Update { row, .. } => row,
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, table: Table, query: Query) -> Result<Vec<Value>, ClientError>;

    /// Inserts one row and returns it as stored (server-assigned id and
    /// created_at included).
    async fn insert(&self, table: Table, row: Value) -> Result<Value, ClientError>;

    /// Applies `patch` to every row matching `query`; returns the updated
    /// rows.
    async fn update(&self, table: Table, query: Query, patch: Value)
        -> Result<Vec<Value>, ClientError>;

    async fn delete(&self, table: Table, query: Query) -> Result<(), ClientError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthSession, ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    async fn current_session(&self) -> Result<Option<AuthSession>, ClientError>;

    /// Opens one live subscription to `table`. The returned handle owns the
    /// delivery channel; dropping it releases the subscription.
    async fn subscribe(&self, table: Table) -> Result<ChangeFeed, ClientError>;
}
