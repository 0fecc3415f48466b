use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::EnablementError;
use crate::scanning::ScanEnablementManager;

/// Lifecycle event kinds emitted by the deployment framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LifecycleRequestType {
    Create,
    Update,
    Delete,
}

/// Envelope of a deployment lifecycle event.
///
/// Only the fields this tool acts on are modeled; anything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: LifecycleRequestType,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl LifecycleEvent {
    /// An event equivalent to a first-time deployment.
    pub fn create() -> Self {
        Self {
            request_type: LifecycleRequestType::Create,
            request_id: None,
        }
    }
}

/// How a failed enablement surfaces to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure in the response body with status 500.
    #[default]
    Structured,
    /// Bubble the error up so the invocation itself fails.
    Propagate,
}

/// Terminal report of one enablement pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablementResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl EnablementResponse {
    fn success() -> Self {
        Self {
            status: 200,
            message: "Enhanced scanning enabled successfully!".to_string(),
            error_detail: None,
        }
    }

    fn failure(err: &EnablementError) -> Self {
        Self {
            status: 500,
            message: "Failed to enable enhanced scanning".to_string(),
            error_detail: Some(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Entry point tying lifecycle events to the enablement sequence.
pub struct EnablementHandler {
    manager: ScanEnablementManager,
    policy: FailurePolicy,
}

impl EnablementHandler {
    /// Create a new handler over a manager and failure policy.
    pub fn new(manager: ScanEnablementManager, policy: FailurePolicy) -> Self {
        Self { manager, policy }
    }

    /// Run one enablement pass for a lifecycle event.
    ///
    /// Create, update and delete all converge on the same pass: deletes
    /// reapply the configuration rather than tearing scanning down, since
    /// other stacks may rely on it staying enabled. Under the structured
    /// policy a failure comes back as a 500 response; under the propagate
    /// policy it is returned as an error.
    pub async fn handle(
        &self,
        event: &LifecycleEvent,
    ) -> Result<EnablementResponse, EnablementError> {
        info!(
            "Handling {:?} lifecycle event (request id: {})",
            event.request_type,
            event.request_id.as_deref().unwrap_or("-")
        );

        match self.manager.apply().await {
            Ok(()) => {
                info!("Enhanced scanning enabled successfully");
                Ok(EnablementResponse::success())
            }
            Err(err) => match self.policy {
                FailurePolicy::Structured => {
                    error!("Failed to enable enhanced scanning: {}", err);
                    Ok(EnablementResponse::failure(&err))
                }
                FailurePolicy::Propagate => Err(err),
            },
        }
    }
}
