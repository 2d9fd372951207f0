use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::{
    error::Result,
    models::activity::{ActivityLogEntry, ActivityStatus},
    repositories::store::AuditSink,
};

/// Records outcomes of guarded operations. Sink failures are traced
/// locally and never reach the caller.
#[derive(Clone)]
pub struct ActivityLogger {
    sink: Arc<dyn AuditSink>,
}

impl ActivityLogger {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Appends one audit entry, best-effort.
    pub async fn record(
        &self,
        identity_id: Option<Uuid>,
        action: &str,
        status: ActivityStatus,
        metadata: Option<sonic_rs::Value>,
        error_message: Option<String>,
        duration_ms: Option<i64>,
    ) {
        let entry = ActivityLogEntry {
            identity_id,
            action: action.to_string(),
            status,
            metadata,
            error_message,
            duration_ms,
        };

        if let Err(e) = self.sink.append(&entry).await {
            tracing::error!("Audit write failed for action {}: {}", entry.action, e);
        }
    }

    /// Times an operation, records its success or failure, and returns
    /// the original result unchanged. A failed audit write never affects
    /// the wrapped operation.
    pub async fn with_logging<T, Fut>(
        &self,
        action: &str,
        identity_id: Option<Uuid>,
        fut: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let result = fut.await;
        let duration_ms = started.elapsed().as_millis() as i64;

        match &result {
            Ok(_) => {
                self.record(
                    identity_id,
                    action,
                    ActivityStatus::Success,
                    None,
                    None,
                    Some(duration_ms),
                )
                .await;
            }
            Err(e) => {
                self.record(
                    identity_id,
                    action,
                    ActivityStatus::Failure,
                    None,
                    Some(e.to_string()),
                    Some(duration_ms),
                )
                .await;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::repositories::memory::MemoryStore;

    #[tokio::test]
    async fn success_is_recorded_with_duration() {
        let store = Arc::new(MemoryStore::new());
        let logger = ActivityLogger::new(store.clone());

        let value = logger
            .with_logging("admin.elevate", None, async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);

        let entries = store.activity_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "admin.elevate");
        assert_eq!(entries[0].status, ActivityStatus::Success);
        assert!(entries[0].duration_ms.is_some());
        assert!(entries[0].error_message.is_none());
    }

    #[tokio::test]
    async fn failure_is_recorded_and_re_raised_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let logger = ActivityLogger::new(store.clone());

        let result: Result<()> = logger
            .with_logging("gallery.create", None, async {
                Err(AppError::Validation("bad slug".to_string()))
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));

        let entries = store.activity_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, ActivityStatus::Failure);
        assert_eq!(
            entries[0].error_message.as_deref(),
            Some("Validation error: bad slug")
        );
    }
}
