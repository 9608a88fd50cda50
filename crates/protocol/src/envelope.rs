use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use adcp_core::result::DomainResult;

/// Lifecycle status of a brokered operation, derived purely from the
/// domain result. Caller-supplied state never feeds into it; an upstream
/// timeout or cancellation arrives here as a failed or pending result and
/// is represented as such, never as `Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Partial,
    Failed,
    Pending,
}

/// Wire shape the envelope serializes to. Selecting a transport never
/// alters status or message derivation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Tool-call result: flat status/message/result object.
    ToolCall,
    /// Task with artifacts: task state object plus an artifact list.
    TaskArtifact,
}

/// Transport-level wrapper around a domain result. Created only at the
/// transport boundary, never persisted as domain state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolEnvelope {
    pub status: TaskStatus,
    pub task_id: String,
    pub message: String,
    pub transport: TransportKind,
    pub result: DomainResult,
}

/// Wrap a domain result for a transport. `correlation_id` carries the
/// caller's task identifier when the transport has one; otherwise a fresh
/// one is minted.
pub fn wrap(
    result: DomainResult,
    transport: TransportKind,
    correlation_id: Option<String>,
) -> ProtocolEnvelope {
    let status = derive_status(&result);
    let message = render_message(status, &result);
    let task_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    debug!(?status, %task_id, "wrapped domain result");

    ProtocolEnvelope {
        status,
        task_id,
        message,
        transport,
        result,
    }
}

fn derive_status(result: &DomainResult) -> TaskStatus {
    let accepted = result.accepted_count();
    let rejected = result.rejected_count();

    if result.has_unrecoverable_error() {
        TaskStatus::Failed
    } else if accepted > 0 && rejected > 0 {
        TaskStatus::Partial
    } else if rejected > 0 {
        // Every item rejected and nothing salvaged.
        TaskStatus::Failed
    } else if result.pending_activation {
        TaskStatus::Pending
    } else {
        TaskStatus::Completed
    }
}

fn render_message(status: TaskStatus, result: &DomainResult) -> String {
    let accepted = result.accepted_count();
    let rejected = result.rejected_count();
    let total = accepted + rejected;

    match status {
        TaskStatus::Failed => match result.errors.first() {
            Some(error) => format!("operation failed: {error}"),
            None => format!("operation failed: {rejected} of {total} rejected"),
        },
        TaskStatus::Partial => format!("{rejected} of {total} rejected"),
        TaskStatus::Pending => "awaiting external approval before activation".to_string(),
        TaskStatus::Completed => {
            if total > 0 {
                format!("{accepted} of {total} accepted")
            } else {
                "completed".to_string()
            }
        }
    }
}

impl ProtocolEnvelope {
    /// Serialize for the selected transport. One-directional: nothing in
    /// the wire shape flows back into the domain result.
    pub fn to_wire(&self) -> serde_json::Result<Value> {
        let result = serde_json::to_value(&self.result)?;
        let value = match self.transport {
            TransportKind::ToolCall => json!({
                "status": self.status,
                "message": self.message,
                "context_id": self.task_id,
                "result": result,
            }),
            TransportKind::TaskArtifact => json!({
                "task": {
                    "id": self.task_id,
                    "state": self.status,
                    "message": self.message,
                },
                "artifacts": [
                    {
                        "name": "result",
                        "parts": [{ "kind": "data", "data": result }],
                    }
                ],
            }),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcp_core::result::{CreativeOutcome, DomainError, PackageOutcome};
    use adcp_core::types::{CreativeStatus, PlaceholderSlot, ResolutionScope};

    fn creative(id: &str, status: CreativeStatus) -> CreativeOutcome {
        CreativeOutcome {
            creative_id: id.to_string(),
            status,
            package_id: None,
            matched_slot: None,
        }
    }

    #[test]
    fn test_mixed_outcomes_derive_partial() {
        let result = DomainResult {
            creatives: vec![
                creative("a", CreativeStatus::Approved),
                creative("b", CreativeStatus::Approved),
                creative("c", CreativeStatus::Rejected),
            ],
            errors: vec![DomainError::SlotMismatch {
                creative_id: "c".into(),
                attempted: vec![PlaceholderSlot::exact(728, 90)],
            }],
            ..Default::default()
        };
        let envelope = wrap(result, TransportKind::ToolCall, None);
        assert_eq!(envelope.status, TaskStatus::Partial);
        assert_eq!(envelope.message, "1 of 3 rejected");
    }

    #[test]
    fn test_unrecoverable_error_derives_failed() {
        let result = DomainResult {
            errors: vec![DomainError::UnknownFormat {
                format_id: "display_999x1".into(),
                searched_scopes: vec![ResolutionScope::Global],
            }],
            ..Default::default()
        };
        let envelope = wrap(result, TransportKind::ToolCall, None);
        assert_eq!(envelope.status, TaskStatus::Failed);
        assert!(envelope.message.contains("unknown format"));
    }

    #[test]
    fn test_all_rejected_derives_failed() {
        let result = DomainResult {
            creatives: vec![creative("a", CreativeStatus::Rejected)],
            ..Default::default()
        };
        let envelope = wrap(result, TransportKind::TaskArtifact, None);
        assert_eq!(envelope.status, TaskStatus::Failed);
    }

    #[test]
    fn test_pending_activation_derives_pending() {
        let result = DomainResult {
            media_buy_id: Some("mb-1".into()),
            packages: vec![PackageOutcome {
                package_id: "pkg-1".into(),
                line_item_ids: vec!["li-1".into()],
                accepted: true,
            }],
            pending_activation: true,
            ..Default::default()
        };
        let envelope = wrap(result, TransportKind::ToolCall, None);
        // Successful items plus pending continuation stays pending, not
        // completed.
        assert_eq!(envelope.status, TaskStatus::Pending);
    }

    #[test]
    fn test_status_and_message_are_transport_independent() {
        let result = DomainResult {
            creatives: vec![
                creative("a", CreativeStatus::Approved),
                creative("b", CreativeStatus::Rejected),
            ],
            ..Default::default()
        };
        let tool = wrap(result.clone(), TransportKind::ToolCall, Some("t-1".into()));
        let task = wrap(result, TransportKind::TaskArtifact, Some("t-1".into()));
        assert_eq!(tool.status, task.status);
        assert_eq!(tool.message, task.message);
        assert_ne!(
            tool.to_wire().unwrap(),
            task.to_wire().unwrap(),
            "shapes differ even though semantics agree"
        );
    }

    #[test]
    fn test_wire_shapes() {
        let result = DomainResult {
            media_buy_id: Some("mb-7".into()),
            ..Default::default()
        };
        let tool = wrap(result.clone(), TransportKind::ToolCall, Some("t-9".into()));
        let wire = tool.to_wire().unwrap();
        assert_eq!(wire["status"], serde_json::json!("completed"));
        assert_eq!(wire["context_id"], serde_json::json!("t-9"));
        assert_eq!(wire["result"]["media_buy_id"], serde_json::json!("mb-7"));

        let task = wrap(result, TransportKind::TaskArtifact, Some("t-9".into()));
        let wire = task.to_wire().unwrap();
        assert_eq!(wire["task"]["state"], serde_json::json!("completed"));
        assert_eq!(
            wire["artifacts"][0]["parts"][0]["data"]["media_buy_id"],
            serde_json::json!("mb-7")
        );
    }

    #[test]
    fn test_correlation_id_minted_when_absent() {
        let envelope = wrap(DomainResult::default(), TransportKind::ToolCall, None);
        assert!(!envelope.task_id.is_empty());
    }
}
