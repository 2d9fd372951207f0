use serde::Serialize;
use uuid::Uuid;

/// The terminal status of a guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Failure,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Success => "success",
            ActivityStatus::Failure => "failure",
        }
    }
}

/// An append-only audit record of a guarded action. Never mutated or
/// deleted by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogEntry {
    /// The acting identity, when one was resolved.
    pub identity_id: Option<Uuid>,
    /// A stable action identifier, e.g. `gallery.create`.
    pub action: String,
    /// Whether the guarded operation succeeded.
    pub status: ActivityStatus,
    /// Free-form context for the action.
    pub metadata: Option<sonic_rs::Value>,
    /// The failure message, for failed operations.
    pub error_message: Option<String>,
    /// Wall-clock duration of the guarded operation.
    pub duration_ms: Option<i64>,
}
