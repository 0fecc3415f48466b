use std::sync::Arc;

use tracing::debug;

use crate::error::EnablementError;
use crate::scanning::{ScanScope, ScanningBackend, ScanningConfiguration};

/// Drives the enablement sequence for a configured scope.
pub struct ScanEnablementManager {
    backend: Arc<dyn ScanningBackend>,
    scope: ScanScope,
}

impl ScanEnablementManager {
    /// Create a new manager over a backend and scope.
    pub fn new(backend: Arc<dyn ScanningBackend>, scope: ScanScope) -> Self {
        Self { backend, scope }
    }

    /// Validate the scope, enable scanning, then apply the configuration.
    ///
    /// The order is fixed: the configuration is only submitted once the
    /// enable call has succeeded. There are no retries and no rollback; a
    /// re-run after a partial failure converges because both calls are
    /// idempotent.
    pub async fn apply(&self) -> Result<(), EnablementError> {
        self.scope.validate()?;

        let configuration = ScanningConfiguration::enhanced(self.scope.rules());
        debug!("Derived scanning configuration: {:?}", configuration);

        self.backend
            .enable_scanning(self.scope.account_id())
            .await?;
        self.backend
            .put_scanning_configuration(&configuration)
            .await?;

        Ok(())
    }
}
