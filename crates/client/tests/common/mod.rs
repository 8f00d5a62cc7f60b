#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc, Mutex};
use uuid::Uuid;

use tandem_client::api::Api;
use tandem_client::backend::{Backend, ChangeEvent, ChangeFeed, Query, Table};
use tandem_client::error::ClientError;
use tandem_client::models::AuthSession;

/// In-memory stand-in for the hosted backend: JSON rows per table, a
/// broadcast change feed, a toy auth store, and call counters so tests can
/// assert that an operation issued no call at all.
pub struct MemoryBackend {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    feed: broadcast::Sender<ChangeEvent>,
    session: Mutex<Option<AuthSession>>,
    users: Mutex<HashMap<String, (String, String)>>,
    pub select_calls: AtomicU64,
    pub insert_calls: AtomicU64,
    pub update_calls: AtomicU64,
    pub delete_calls: AtomicU64,
    /// Simulates the distrusted filtered query: any select carrying a
    /// disjunction comes back empty.
    pub fail_or_queries: AtomicBool,
    pub fail_inserts: AtomicBool,
    pub fail_selects: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        let (feed, _) = broadcast::channel(64);
        Self {
            tables: Mutex::new(HashMap::new()),
            feed,
            session: Mutex::new(None),
            users: Mutex::new(HashMap::new()),
            select_calls: AtomicU64::new(0),
            insert_calls: AtomicU64::new(0),
            update_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
            fail_or_queries: AtomicBool::new(false),
            fail_inserts: AtomicBool::new(false),
            fail_selects: AtomicBool::new(false),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a row without counting it as a client call and without
    /// echoing a feed event.
    pub async fn seed(&self, table: Table, row: Value) {
        self.tables.lock().await.entry(table).or_default().push(row);
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: Table, query: Query) -> Result<Vec<Value>, ClientError> {
        self.select_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_selects.load(Ordering::Relaxed) {
            return Err(ClientError::backend(500, "select failed"));
        }
        if self.fail_or_queries.load(Ordering::Relaxed) && !query.any_of.is_empty() {
            return Ok(Vec::new());
        }
        let tables = self.tables.lock().await;
        let rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        Ok(query.shape(rows))
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value, ClientError> {
        self.insert_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_inserts.load(Ordering::Relaxed) {
            return Err(ClientError::backend(500, "insert failed"));
        }
        if let Some(object) = row.as_object_mut() {
            // Server-assigned fields
            if !object.contains_key("id") || object["id"].is_null() {
                object.insert("id".into(), json!(Uuid::new_v4().to_string()));
            }
            if !object.contains_key("created_at") || object["created_at"].is_null() {
                object.insert("created_at".into(), json!(Utc::now()));
            }
        }
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .push(row.clone());
        let _ = self.feed.send(ChangeEvent::Insert {
            table,
            row: row.clone(),
        });
        Ok(row)
    }

    async fn update(
        &self,
        table: Table,
        query: Query,
        patch: Value,
    ) -> Result<Vec<Value>, ClientError> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let (Some(base), Some(extra)) = (row.as_object_mut(), patch.as_object()) {
                    for (key, value) in extra {
                        base.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        for row in &updated {
            let _ = self.feed.send(ChangeEvent::Update {
                table,
                row: row.clone(),
            });
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, query: Query) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|r| !query.matches(r));
        }
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _full_name: &str,
    ) -> Result<AuthSession, ClientError> {
        let mut users = self.users.lock().await;
        if users.contains_key(email) {
            return Err(ClientError::backend(400, "email already registered"));
        }
        let user_id = Uuid::new_v4().to_string();
        users.insert(email.to_string(), (password.to_string(), user_id.clone()));
        let session = AuthSession {
            user_id,
            email: email.to_string(),
            access_token: Uuid::new_v4().to_string(),
        };
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let users = self.users.lock().await;
        match users.get(email) {
            Some((stored, user_id)) if stored == password => {
                let session = AuthSession {
                    user_id: user_id.clone(),
                    email: email.to_string(),
                    access_token: Uuid::new_v4().to_string(),
                };
                *self.session.lock().await = Some(session.clone());
                Ok(session)
            }
            _ => Err(ClientError::backend(400, "invalid credentials")),
        }
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        *self.session.lock().await = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, ClientError> {
        Ok(self.session.lock().await.clone())
    }

    async fn subscribe(&self, table: Table) -> Result<ChangeFeed, ClientError> {
        let mut source = self.feed.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(async move {
            while let Ok(event) = source.recv().await {
                if event.table() != table {
                    continue;
                }
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        Ok(ChangeFeed::new(rx, Some(forwarder)))
    }
}

static TRACING: Once = Once::new();

/// Routes warn logs from degraded paths into test output when RUST_LOG
/// asks for them.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn api() -> Api<MemoryBackend> {
    init_tracing();
    Api::new(MemoryBackend::new())
}

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().expect("valid RFC 3339 timestamp")
}

pub fn profile_row(id: &str, email: &str, full_name: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "full_name": full_name,
        "avatar_url": null,
        "role": role,
    })
}

pub fn message_row(
    id: &str,
    sender_id: &str,
    receiver_id: &str,
    text: &str,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "sender_id": sender_id,
        "receiver_id": receiver_id,
        "message_text": text,
        "message_type": "text",
        "created_at": created_at,
        "read_at": null,
        "reply_to_id": null,
    })
}

pub fn session_row(
    id: &str,
    student_id: &str,
    admin_id: &str,
    scheduled_at: &str,
    duration_minutes: i64,
    status: &str,
) -> Value {
    json!({
        "id": id,
        "title": format!("Session {id}"),
        "description": null,
        "scheduled_at": scheduled_at,
        "duration_minutes": duration_minutes,
        "status": status,
        "student_id": student_id,
        "admin_id": admin_id,
        "notes": null,
    })
}

pub fn module_row(id: &str, course_id: &str, order_number: i64) -> Value {
    json!({
        "id": id,
        "course_id": course_id,
        "title": format!("Module {order_number}"),
        "order_number": order_number,
        "content": null,
        "homework_prompt": "Write a summary",
    })
}

pub fn progress_row(user_id: &str, module_id: &str, completed: bool, homework: Option<&str>) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "user_id": user_id,
        "module_id": module_id,
        "completed": completed,
        "homework_submission": homework,
    })
}
