//! The allow/deny decision.

use super::grant::Permission;
use super::set::PermissionSet;
use crate::action::Action;
use serde::{Deserialize, Serialize};

/// Outcome of checking one `(resource, action)` pair against a permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    /// Permitted by `granted_by`.
    Allow { granted_by: Permission },
    /// Refused. `required` is the `resource:action` string that was missing.
    Deny { required: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    /// The missing permission, if this is a denial.
    pub fn required(&self) -> Option<&str> {
        match self {
            Decision::Allow { .. } => None,
            Decision::Deny { required } => Some(required),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allow { granted_by } => write!(f, "allowed by '{}'", granted_by),
            Decision::Deny { required } => write!(f, "denied, missing '{}'", required),
        }
    }
}

/// Decide whether `permissions` allow `action` on `resource`.
///
/// First match wins: the global wildcard, then the exact grant, then the
/// resource wildcard. The resource is lower-cased before comparison. There
/// is no prefix matching, so `custom:*` says nothing about `customer`.
pub fn decide(permissions: &PermissionSet, resource: &str, action: Action) -> Decision {
    let exact = Permission::exact(resource, action);

    let granted_by = if permissions.has_global() {
        Some(Permission::Global)
    } else if permissions.contains(&exact) {
        Some(exact.clone())
    } else {
        let wildcard = Permission::resource_wildcard(resource);
        permissions.contains(&wildcard).then_some(wildcard)
    };

    match granted_by {
        Some(granted_by) => {
            log::debug!("allow {} (granted by {})", exact, granted_by);
            Decision::Allow { granted_by }
        }
        None => {
            log::debug!("deny {}", exact);
            Decision::Deny {
                required: exact.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(values: &[&str]) -> PermissionSet {
        PermissionSet::from_strings(values)
    }

    #[test]
    fn test_global_wildcard_allows_anything() {
        let perms = set(&["*"]);
        for action in Action::ALL {
            assert_eq!(
                decide(&perms, "anything", action),
                Decision::Allow {
                    granted_by: Permission::Global
                }
            );
        }
    }

    #[test]
    fn test_exact_grant_allows_only_its_action() {
        let perms = set(&["customer:read"]);
        assert!(decide(&perms, "customer", Action::Read).is_allowed());

        let denied = decide(&perms, "customer", Action::Write);
        assert_eq!(
            denied,
            Decision::Deny {
                required: "customer:write".to_string()
            }
        );
        assert_eq!(denied.required(), Some("customer:write"));
    }

    #[test]
    fn test_resource_wildcard_allows_every_action() {
        let perms = set(&["orders:*"]);
        for action in Action::ALL {
            assert!(decide(&perms, "orders", action).is_allowed());
        }
        assert!(!decide(&perms, "customer", Action::Read).is_allowed());
    }

    #[test]
    fn test_wildcard_is_resource_exact() {
        let perms = set(&["customer:*"]);
        assert_eq!(
            decide(&perms, "customers", Action::Read),
            Decision::Deny {
                required: "customers:read".to_string()
            }
        );

        let perms = set(&["custom:*"]);
        assert!(!decide(&perms, "customer", Action::Read).is_allowed());
    }

    #[test]
    fn test_resource_is_case_normalized() {
        let perms = set(&["Customer:*"]);
        assert!(decide(&perms, "CUSTOMER", Action::Delete).is_allowed());

        let denied = decide(&PermissionSet::empty(), "Customer", Action::Read);
        assert_eq!(denied.required(), Some("customer:read"));
    }

    #[test]
    fn test_precedence_reports_first_match() {
        let perms = set(&["*", "customer:read", "customer:*"]);
        assert_eq!(
            decide(&perms, "customer", Action::Read),
            Decision::Allow {
                granted_by: Permission::Global
            }
        );

        let perms = set(&["customer:read", "customer:*"]);
        assert_eq!(
            decide(&perms, "customer", Action::Read),
            Decision::Allow {
                granted_by: Permission::exact("customer", Action::Read)
            }
        );
        assert_eq!(
            decide(&perms, "customer", Action::Update),
            Decision::Allow {
                granted_by: Permission::resource_wildcard("customer")
            }
        );
    }

    #[test]
    fn test_malformed_strings_grant_nothing() {
        let perms = set(&["customer", "customer:drop", "*:read", ""]);
        assert!(perms.is_empty());
        assert!(!decide(&perms, "customer", Action::Read).is_allowed());
    }

    #[test]
    fn test_decision_display() {
        let allow = Decision::Allow {
            granted_by: Permission::resource_wildcard("orders"),
        };
        assert_eq!(allow.to_string(), "allowed by 'orders:*'");

        let deny = Decision::Deny {
            required: "orders:write".to_string(),
        };
        assert_eq!(deny.to_string(), "denied, missing 'orders:write'");
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn resource_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["customer", "customers", "custom", "orders", "users"])
            .prop_map(str::to_string)
    }

    fn permission_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("*".to_string()),
            resource_strategy().prop_map(|r| format!("{}:*", r)),
            (resource_strategy(), action_strategy()).prop_map(|(r, a)| format!("{}:{}", r, a)),
            "[a-z:*]{0,10}",
        ]
    }

    proptest! {
        #[test]
        fn prop_allow_iff_matching_grant_present(
            raw in prop::collection::vec(permission_strategy(), 0..8),
            resource in resource_strategy(),
            action in action_strategy(),
        ) {
            let perms = PermissionSet::from_strings(&raw);
            let expected = raw.iter().any(|p| {
                p == "*"
                    || *p == format!("{}:{}", resource, action)
                    || *p == format!("{}:*", resource)
            });
            prop_assert_eq!(decide(&perms, &resource, action).is_allowed(), expected);
        }
    }
}
