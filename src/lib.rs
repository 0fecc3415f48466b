pub mod error;
pub mod scanning;
pub mod settings;

use std::sync::Arc;

use anyhow::Result;

use crate::scanning::{
    AwsScanningBackend, EnablementHandler, EnablementResponse, LifecycleEvent,
    ScanEnablementManager,
};
use crate::settings::Settings;

/// Run one enablement pass against AWS for a lifecycle event.
///
/// Wires the settings into a backend, manager and handler, then handles the
/// event. Under the propagate failure policy an enablement failure comes
/// back as an error from here instead of a 500 response.
pub async fn run_enablement(
    settings: &Settings,
    event: &LifecycleEvent,
) -> Result<EnablementResponse> {
    let backend = AwsScanningBackend::new(&settings.aws).await?;
    let manager = ScanEnablementManager::new(Arc::new(backend), settings.scanning.scope.clone());
    let handler = EnablementHandler::new(manager, settings.scanning.failure_policy);

    let response = handler.handle(event).await?;
    Ok(response)
}
