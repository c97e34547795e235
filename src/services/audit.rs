//! Audit trail recorder
//!
//! Mutating operations hand an [`AuditEvent`] to the recorder and move on;
//! a dedicated writer task persists entries in the background. A storage
//! failure in the writer is logged and dropped, never surfaced to the
//! request that produced the event.

use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

use crate::db::{AuditRepository, DbPool};
use crate::models::{AuditEvent, SYSTEM_USER_NAME};

enum AuditMessage {
    Event(AuditEvent),
    Flush(oneshot::Sender<()>),
}

/// Cheap cloneable handle to the audit writer task
#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::UnboundedSender<AuditMessage>,
}

impl AuditRecorder {
    /// Queue an event for persistence. Fire-and-forget: a closed channel
    /// is logged, never returned to the caller.
    pub fn record(&self, event: AuditEvent) {
        if self.tx.send(AuditMessage::Event(event)).is_err() {
            error!("audit writer is gone, dropping audit event");
        }
    }

    /// Wait until every event queued before this call has been written.
    /// Used by graceful shutdown and by tests.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(AuditMessage::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

/// Spawn the background writer task and return its handle.
pub fn spawn_audit_writer(pool: DbPool) -> AuditRecorder {
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                AuditMessage::Event(event) => {
                    if let Err(e) = write_entry(&pool, event).await {
                        warn!(error = %e, "failed to write audit log entry");
                    }
                }
                AuditMessage::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    });

    AuditRecorder { tx }
}

async fn write_entry(pool: &DbPool, event: AuditEvent) -> anyhow::Result<()> {
    let user_name = event
        .context
        .user_name
        .as_deref()
        .unwrap_or(SYSTEM_USER_NAME);
    let origin_ip = event.context.origin_ip.as_deref().unwrap_or("");
    let prior_state = event.prior_state.map(|v| v.to_string());
    let new_state = event.new_state.map(|v| v.to_string());

    AuditRepository::new(pool)
        .insert(
            event.context.user_id,
            user_name,
            &event.action,
            &event.entity_type,
            event.entity_id.as_deref(),
            prior_state.as_deref(),
            new_state.as_deref(),
            origin_ip,
        )
        .await
}
