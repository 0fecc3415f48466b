mod backend;
mod handler;
mod manager;
mod models;
mod scope;

pub use backend::{AwsScanningBackend, ScanningBackend};
pub use handler::{
    EnablementHandler, EnablementResponse, FailurePolicy, LifecycleEvent, LifecycleRequestType,
};
pub use manager::ScanEnablementManager;
pub use models::{
    ScanFilter, ScanFilterType, ScanFrequency, ScanRule, ScanType, ScanningConfiguration,
};
pub use scope::ScanScope;

/// Filter expression that matches every repository in the registry.
pub const WILDCARD_FILTER: &str = "*";
