use serde::{Deserialize, Serialize};

use crate::scanning::WILDCARD_FILTER;

/// How a filter expression is matched against repository names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanFilterType {
    Wildcard,
    PrefixMatch,
}

impl ScanFilterType {
    /// Wire spelling used by the registry scanning API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFilterType::Wildcard => "WILDCARD",
            ScanFilterType::PrefixMatch => "PREFIX_MATCH",
        }
    }
}

/// A single repository-name filter within a scan rule.
///
/// Field names follow the registry API wire format; snake case spellings
/// are accepted when read from config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFilter {
    /// Filter expression, e.g. "*" or a repository name prefix.
    pub filter: String,
    #[serde(alias = "filter_type")]
    pub filter_type: ScanFilterType,
}

impl ScanFilter {
    /// Filter matching every repository in the registry.
    pub fn wildcard() -> Self {
        Self {
            filter: WILDCARD_FILTER.to_string(),
            filter_type: ScanFilterType::Wildcard,
        }
    }

    /// Filter matching repositories whose name starts with the given prefix.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            filter: prefix.into(),
            filter_type: ScanFilterType::PrefixMatch,
        }
    }
}

/// How often matched repositories are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanFrequency {
    ScanOnPush,
    ContinuousScan,
    Manual,
}

impl ScanFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFrequency::ScanOnPush => "SCAN_ON_PUSH",
            ScanFrequency::ContinuousScan => "CONTINUOUS_SCAN",
            ScanFrequency::Manual => "MANUAL",
        }
    }
}

/// A scan frequency applied to an ordered list of repository filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRule {
    #[serde(alias = "scan_frequency")]
    pub scan_frequency: ScanFrequency,
    #[serde(alias = "repository_filters")]
    pub repository_filters: Vec<ScanFilter>,
}

impl ScanRule {
    pub fn new(scan_frequency: ScanFrequency, repository_filters: Vec<ScanFilter>) -> Self {
        Self {
            scan_frequency,
            repository_filters,
        }
    }

    /// Continuous scanning for the given filters.
    pub fn continuous(repository_filters: Vec<ScanFilter>) -> Self {
        Self::new(ScanFrequency::ContinuousScan, repository_filters)
    }

    /// The hardcoded default: continuously scan every repository.
    pub fn continuous_wildcard() -> Self {
        Self::continuous(vec![ScanFilter::wildcard()])
    }
}

/// The scan type submitted with every configuration write. Only enhanced
/// scanning is ever requested by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanType {
    Enhanced,
}

/// Desired registry-wide scanning state.
///
/// Submitted wholesale on every invocation: last write wins, rules are never
/// merged with whatever configuration the registry held before. Built fresh
/// from the configured scope on each handler invocation and discarded after
/// the API call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanningConfiguration {
    pub scan_type: ScanType,
    pub rules: Vec<ScanRule>,
}

impl ScanningConfiguration {
    /// Enhanced scanning with the given rule set.
    pub fn enhanced(rules: Vec<ScanRule>) -> Self {
        Self {
            scan_type: ScanType::Enhanced,
            rules,
        }
    }
}
