use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::types::{
    RegistryScanningRule, ScanFrequency as EcrScanFrequency, ScanType as EcrScanType,
    ScanningRepositoryFilter, ScanningRepositoryFilterType,
};
use aws_sdk_ecr::Client as EcrClient;
use aws_sdk_inspector2::types::ResourceScanType;
use aws_sdk_inspector2::Client as InspectorClient;
use tracing::{debug, info};

use crate::error::EnablementError;
use crate::scanning::{ScanFilter, ScanFrequency, ScanRule, ScanType, ScanningConfiguration};
use crate::settings::AwsSettings;

const ENABLE_OPERATION: &str = "Inspector2 Enable";
const CONFIGURE_OPERATION: &str = "ECR PutRegistryScanningConfiguration";

/// Extract a clean error message from an AWS SDK error's Debug output
///
/// The AWS SDK errors have verbose Debug output, but we can extract just the
/// meaningful message by parsing for the `message: Some("...")` pattern.
fn format_sdk_error<E: std::fmt::Debug>(err: &E) -> String {
    let debug_str = format!("{:?}", err);

    // Pattern: message: Some("actual error message")
    if let Some(start) = debug_str.find("message: Some(\"") {
        let start = start + 15; // length of 'message: Some("'
        if let Some(end) = debug_str[start..].find("\")") {
            return debug_str[start..start + end].to_string();
        }
    }

    // Fallback: a raw Message field, as in an unmodeled JSON response
    if let Some(start) = debug_str.find("\"Message\":\"") {
        let start = start + 11; // length of '"Message":"'
        if let Some(end) = debug_str[start..].find("\"") {
            return debug_str[start..start + end].to_string();
        }
    }

    // Last resort: return a truncated debug string. The cut has to land on
    // a char boundary or the slice panics on non-ASCII output.
    if debug_str.len() > 200 {
        let mut end = 200;
        while !debug_str.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &debug_str[..end])
    } else {
        debug_str
    }
}

/// Upstream calls made during enablement.
///
/// The two operations mirror the two service calls this tool performs. Both
/// are idempotent on the service side: re-running either with the same input
/// lands in the same end state.
#[async_trait]
pub trait ScanningBackend: Send + Sync {
    /// Turn on enhanced scanning for ECR, optionally scoped to one account.
    async fn enable_scanning(&self, account_id: Option<&str>) -> Result<(), EnablementError>;

    /// Replace the registry scanning configuration with the given one.
    async fn put_scanning_configuration(
        &self,
        configuration: &ScanningConfiguration,
    ) -> Result<(), EnablementError>;
}

/// Backend that talks to Amazon Inspector and ECR.
pub struct AwsScanningBackend {
    inspector_client: InspectorClient,
    ecr_client: EcrClient,
}

impl AwsScanningBackend {
    /// Create a new backend from the AWS connection settings.
    pub async fn new(settings: &AwsSettings) -> Result<Self> {
        // Build AWS config
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            // Use static credentials if provided, otherwise the default
            // credential chain applies (IAM role, env vars, etc.)
            let creds =
                aws_sdk_ecr::config::Credentials::new(access_key, secret_key, None, None, "static");
            loader = loader.credentials_provider(creds);
        }

        let aws_config = loader.load().await;

        Ok(Self {
            inspector_client: InspectorClient::new(&aws_config),
            ecr_client: EcrClient::new(&aws_config),
        })
    }
}

#[async_trait]
impl ScanningBackend for AwsScanningBackend {
    async fn enable_scanning(&self, account_id: Option<&str>) -> Result<(), EnablementError> {
        match account_id {
            Some(id) => info!("Enabling Inspector ECR scanning for account {}", id),
            None => info!("Enabling Inspector ECR scanning for the calling account"),
        }

        let mut request = self
            .inspector_client
            .enable()
            .resource_types(ResourceScanType::Ecr);
        if let Some(id) = account_id {
            request = request.account_ids(id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EnablementError::upstream(ENABLE_OPERATION, format_sdk_error(&e)))?;

        // A partial success still means enhanced scanning is not on where it
        // was asked for, so it is treated as a failed call.
        let failed = response.failed_accounts();
        if !failed.is_empty() {
            debug!("Inspector enable reported failed accounts: {:?}", failed);
            return Err(EnablementError::upstream(
                ENABLE_OPERATION,
                format!("{} account(s) could not be enabled", failed.len()),
            ));
        }

        Ok(())
    }

    async fn put_scanning_configuration(
        &self,
        configuration: &ScanningConfiguration,
    ) -> Result<(), EnablementError> {
        let rules = to_sdk_rules(&configuration.rules)?;

        info!(
            "Applying registry scanning configuration with {} rule(s)",
            rules.len()
        );

        self.ecr_client
            .put_registry_scanning_configuration()
            .scan_type(to_sdk_scan_type(configuration.scan_type))
            .set_rules(Some(rules))
            .send()
            .await
            .map_err(|e| EnablementError::upstream(CONFIGURE_OPERATION, format_sdk_error(&e)))?;

        info!("Registry scanning configuration applied");
        Ok(())
    }
}

fn to_sdk_rules(rules: &[ScanRule]) -> Result<Vec<RegistryScanningRule>, EnablementError> {
    rules.iter().map(to_sdk_rule).collect()
}

fn to_sdk_rule(rule: &ScanRule) -> Result<RegistryScanningRule, EnablementError> {
    let mut filters = Vec::with_capacity(rule.repository_filters.len());
    for filter in &rule.repository_filters {
        filters.push(to_sdk_filter(filter)?);
    }

    RegistryScanningRule::builder()
        .scan_frequency(to_sdk_frequency(rule.scan_frequency))
        .set_repository_filters(Some(filters))
        .build()
        .map_err(|e| EnablementError::MissingConfiguration(format!("invalid scanning rule: {}", e)))
}

fn to_sdk_filter(filter: &ScanFilter) -> Result<ScanningRepositoryFilter, EnablementError> {
    // The SDK enum only models WILDCARD. The service also accepts
    // PREFIX_MATCH, so the filter type goes through the string conversion.
    ScanningRepositoryFilter::builder()
        .filter(&filter.filter)
        .filter_type(ScanningRepositoryFilterType::from(
            filter.filter_type.as_str(),
        ))
        .build()
        .map_err(|e| {
            EnablementError::MissingConfiguration(format!("invalid repository filter: {}", e))
        })
}

fn to_sdk_frequency(frequency: ScanFrequency) -> EcrScanFrequency {
    match frequency {
        ScanFrequency::ScanOnPush => EcrScanFrequency::ScanOnPush,
        ScanFrequency::ContinuousScan => EcrScanFrequency::ContinuousScan,
        ScanFrequency::Manual => EcrScanFrequency::Manual,
    }
}

fn to_sdk_scan_type(scan_type: ScanType) -> EcrScanType {
    match scan_type {
        ScanType::Enhanced => EcrScanType::Enhanced,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::ScanningBackend;
    use crate::error::EnablementError;
    use crate::scanning::ScanningConfiguration;

    /// One recorded backend invocation, in call order.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum BackendCall {
        Enable { account_id: Option<String> },
        Configure { configuration: ScanningConfiguration },
    }

    /// Test double that records calls and can fail on demand.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub(crate) calls: Mutex<Vec<BackendCall>>,
        pub(crate) fail_enable: bool,
        pub(crate) fail_configure: bool,
    }

    impl RecordingBackend {
        pub(crate) fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScanningBackend for RecordingBackend {
        async fn enable_scanning(&self, account_id: Option<&str>) -> Result<(), EnablementError> {
            self.calls.lock().unwrap().push(BackendCall::Enable {
                account_id: account_id.map(String::from),
            });
            if self.fail_enable {
                return Err(EnablementError::upstream(
                    super::ENABLE_OPERATION,
                    "simulated failure",
                ));
            }
            Ok(())
        }

        async fn put_scanning_configuration(
            &self,
            configuration: &ScanningConfiguration,
        ) -> Result<(), EnablementError> {
            self.calls.lock().unwrap().push(BackendCall::Configure {
                configuration: configuration.clone(),
            });
            if self.fail_configure {
                return Err(EnablementError::upstream(
                    super::CONFIGURE_OPERATION,
                    "simulated failure",
                ));
            }
            Ok(())
        }
    }
}
