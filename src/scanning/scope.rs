use serde::{Deserialize, Serialize};

use crate::error::EnablementError;
use crate::scanning::{ScanFilter, ScanRule};

/// Scope of the enable-and-configure operation.
///
/// Unifies the input shapes this tool accepts behind a single mode
/// discriminant: whole-registry defaults, everything in one account, a
/// single repository, an explicit filter list, or fully explicit rules.
/// Every mode derives a complete rule set that replaces whatever scanning
/// configuration the registry held before.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ScanScope {
    /// Whole registry with the default continuous/wildcard rule.
    #[default]
    Registry,
    /// Everything in a specific account.
    Account { account_id: String },
    /// A single repository, matched by name prefix.
    Repository {
        account_id: String,
        repository_name: String,
    },
    /// Registry-wide continuous scanning restricted to explicit filters.
    Filters { filters: Vec<ScanFilter> },
    /// Fully explicit rule set, submitted as given.
    Rules { rules: Vec<ScanRule> },
}

impl ScanScope {
    /// Check that every field the mode requires is present and non-empty.
    ///
    /// Runs before any external call is attempted; violations surface as
    /// [`EnablementError::MissingConfiguration`] naming the offending field.
    pub fn validate(&self) -> Result<(), EnablementError> {
        match self {
            ScanScope::Registry => Ok(()),
            ScanScope::Account { account_id } => require(account_id, "account_id"),
            ScanScope::Repository {
                account_id,
                repository_name,
            } => {
                require(account_id, "account_id")?;
                require(repository_name, "repository_name")
            }
            ScanScope::Filters { filters } => validate_filters(filters),
            ScanScope::Rules { rules } => {
                if rules.is_empty() {
                    return Err(EnablementError::MissingConfiguration(
                        "rules list is empty".to_string(),
                    ));
                }
                for rule in rules {
                    validate_filters(&rule.repository_filters)?;
                }
                Ok(())
            }
        }
    }

    /// The full-replacement rule set submitted for this scope.
    pub fn rules(&self) -> Vec<ScanRule> {
        match self {
            ScanScope::Registry | ScanScope::Account { .. } => {
                vec![ScanRule::continuous_wildcard()]
            }
            ScanScope::Repository {
                repository_name, ..
            } => vec![ScanRule::continuous(vec![ScanFilter::prefix(
                repository_name.clone(),
            )])],
            ScanScope::Filters { filters } => vec![ScanRule::continuous(filters.clone())],
            ScanScope::Rules { rules } => rules.clone(),
        }
    }

    /// The account the enable call is scoped to, if any.
    pub fn account_id(&self) -> Option<&str> {
        match self {
            ScanScope::Account { account_id }
            | ScanScope::Repository { account_id, .. } => Some(account_id),
            _ => None,
        }
    }
}

fn require(value: &str, field: &str) -> Result<(), EnablementError> {
    if value.trim().is_empty() {
        return Err(EnablementError::MissingConfiguration(format!(
            "{} is required for this mode",
            field
        )));
    }
    Ok(())
}

fn validate_filters(filters: &[ScanFilter]) -> Result<(), EnablementError> {
    if filters.is_empty() {
        return Err(EnablementError::MissingConfiguration(
            "filter list is empty".to_string(),
        ));
    }
    for filter in filters {
        if filter.filter.trim().is_empty() {
            return Err(EnablementError::MissingConfiguration(
                "filter expression is empty".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::{ScanFilterType, ScanFrequency};
    use serde_json::json;

    #[test]
    fn test_default_scope_is_registry() {
        let scope = ScanScope::default();
        assert_eq!(scope, ScanScope::Registry);
        assert!(scope.validate().is_ok());
        assert_eq!(scope.rules(), vec![ScanRule::continuous_wildcard()]);
        assert_eq!(scope.account_id(), None);
    }

    #[test]
    fn test_repository_scope_derives_prefix_rule() {
        let scope = ScanScope::Repository {
            account_id: "123456789012".to_string(),
            repository_name: "team/app".to_string(),
        };

        assert_eq!(scope.account_id(), Some("123456789012"));

        let rules = scope.rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].scan_frequency, ScanFrequency::ContinuousScan);
        assert_eq!(rules[0].repository_filters[0].filter, "team/app");
        assert_eq!(
            rules[0].repository_filters[0].filter_type,
            ScanFilterType::PrefixMatch
        );
    }

    #[test]
    fn test_filters_scope_wraps_one_continuous_rule() {
        let filters = vec![ScanFilter::prefix("prod-"), ScanFilter::prefix("staging-")];
        let scope = ScanScope::Filters {
            filters: filters.clone(),
        };

        let rules = scope.rules();
        assert_eq!(rules, vec![ScanRule::continuous(filters)]);
        assert_eq!(scope.account_id(), None);
    }

    #[test]
    fn test_rules_scope_submits_rules_as_given() {
        let rules = vec![
            ScanRule::new(ScanFrequency::ScanOnPush, vec![ScanFilter::wildcard()]),
            ScanRule::continuous(vec![ScanFilter::prefix("prod-")]),
        ];
        let scope = ScanScope::Rules {
            rules: rules.clone(),
        };

        assert_eq!(scope.rules(), rules);
    }

    #[test]
    fn test_missing_account_id_rejected() {
        let scope = ScanScope::Account {
            account_id: "".to_string(),
        };
        let err = scope.validate().unwrap_err();
        assert!(matches!(err, EnablementError::MissingConfiguration(_)));
        assert!(err.to_string().contains("account_id"));
    }

    #[test]
    fn test_missing_repository_name_rejected() {
        let scope = ScanScope::Repository {
            account_id: "123456789012".to_string(),
            repository_name: "  ".to_string(),
        };
        let err = scope.validate().unwrap_err();
        assert!(err.to_string().contains("repository_name"));
    }

    #[test]
    fn test_empty_filter_list_rejected() {
        let scope = ScanScope::Filters { filters: vec![] };
        assert!(scope.validate().is_err());
    }

    #[test]
    fn test_empty_filter_expression_rejected() {
        let scope = ScanScope::Filters {
            filters: vec![ScanFilter::prefix("")],
        };
        assert!(scope.validate().is_err());
    }

    #[test]
    fn test_rule_without_filters_rejected() {
        let scope = ScanScope::Rules {
            rules: vec![ScanRule::continuous(vec![])],
        };
        assert!(scope.validate().is_err());

        let scope = ScanScope::Rules { rules: vec![] };
        assert!(scope.validate().is_err());
    }

    #[test]
    fn test_mode_tags_deserialize() {
        let scope: ScanScope = serde_json::from_value(json!({"mode": "registry"})).unwrap();
        assert_eq!(scope, ScanScope::Registry);

        let scope: ScanScope = serde_json::from_value(json!({
            "mode": "repository",
            "account_id": "123456789012",
            "repository_name": "team/app",
        }))
        .unwrap();
        assert!(matches!(scope, ScanScope::Repository { .. }));

        let scope: ScanScope = serde_json::from_value(json!({
            "mode": "filters",
            "filters": [{"filter": "*", "filterType": "WILDCARD"}],
        }))
        .unwrap();
        assert!(matches!(scope, ScanScope::Filters { .. }));
    }
}
