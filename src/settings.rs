use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::scanning::{FailurePolicy, ScanScope};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub aws: AwsSettings,
    #[serde(default)]
    pub scanning: ScanningSettings,
}

/// AWS connection settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AwsSettings {
    /// Region the clients talk to (defaults to the SDK's own resolution)
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

/// What gets scanned and how failures surface.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScanningSettings {
    #[serde(default)]
    pub scope: ScanScope,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("ECR_SCAN_CONFIG_DIR").unwrap_or_else(|_| "/config".into());

        let mut settings: Settings = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name(&format!("{}/default.toml", config_dir)))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is optional
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            // Add in settings from the environment (with a prefix of ECR_SCAN)
            // Eg. `ECR_SCAN_AWS__REGION=eu-central-1` would set `aws.region`
            .add_source(
                Environment::with_prefix("ECR_SCAN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        // Special handling for the AWS_REGION environment variable (common convention)
        // This takes precedence over both TOML config and ECR_SCAN_AWS__REGION
        if let Ok(region) = env::var("AWS_REGION") {
            if !region.is_empty() {
                settings.aws.region = Some(region);
            }
        }

        // Reject scopes that could never produce a valid API call
        settings
            .scanning
            .scope
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(settings)
    }
}
