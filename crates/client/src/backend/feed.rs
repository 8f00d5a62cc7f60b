//! Change-feed subscription handle and the WebSocket client behind
//! [`HttpBackend::subscribe`](super::http::HttpBackend).

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, warn};

use crate::backend::{ChangeEvent, Table};
use crate::error::ClientError;

/// A live subscription to one table. Dropping the handle aborts the reader
/// task, which closes the socket — the subscription is released on every
/// exit path, so a remount never sees duplicate delivery.
pub struct ChangeFeed {
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
    reader: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    pub fn new(rx: mpsc::UnboundedReceiver<ChangeEvent>, reader: Option<JoinHandle<()>>) -> Self {
        Self { rx, reader }
    }

    /// Next event, or `None` once the feed has closed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Non-blocking drain step for callers polling from a UI tick.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

// ── Wire protocol ──

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FeedRequest {
    Subscribe { table: Table },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FeedMessage {
    Subscribed {
        table: Table,
    },
    Insert {
        table: Table,
        row: serde_json::Value,
    },
    Update {
        table: Table,
        row: serde_json::Value,
    },
}

/// Connects, subscribes to `table`, and spawns the reader task that
/// forwards insert/update events into the handle's channel.
pub async fn connect(
    feed_url: &str,
    api_key: &str,
    table: Table,
) -> Result<ChangeFeed, ClientError> {
    let url = if api_key.is_empty() {
        feed_url.to_string()
    } else {
        format!("{}?apikey={}", feed_url, api_key)
    };

    let (mut ws, _) = connect_async(&url)
        .await
        .map_err(|e| ClientError::Feed(e.to_string()))?;

    let subscribe = serde_json::to_string(&FeedRequest::Subscribe { table })?;
    ws.send(WsMessage::Text(subscribe.into()))
        .await
        .map_err(|e| ClientError::Feed(e.to_string()))?;

    let (tx, rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(async move {
        while let Some(frame) = ws.next().await {
            let text = match frame {
                Ok(WsMessage::Text(text)) => text,
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, table = table.as_str(), "change feed read failed");
                    break;
                }
            };

            let message: FeedMessage = match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "unparseable change feed frame dropped");
                    continue;
                }
            };

            let event = match message {
                FeedMessage::Subscribed { table } => {
                    debug!(table = table.as_str(), "change feed subscribed");
                    continue;
                }
                FeedMessage::Insert { table, row } => ChangeEvent::Insert { table, row },
                FeedMessage::Update { table, row } => ChangeEvent::Update { table, row },
            };

            // Only forward events for the subscribed table; the server
            // shouldn't send others, but a shared socket might.
            if event.table() != table {
                continue;
            }
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    Ok(ChangeFeed::new(rx, Some(reader)))
}
