use super::grant::Permission;
use std::collections::BTreeSet;

/// The effective permissions of a principal.
///
/// Built wholesale from the permission strings of every role the principal
/// holds. There is no way to add or remove a grant after construction; a
/// change to roles produces a new set.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    grants: BTreeSet<Permission>,
    ignored: usize,
}

impl PermissionSet {
    /// An empty set. Grants nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse permission strings from role definitions.
    ///
    /// Malformed strings are logged and skipped; they never match anything.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grants = BTreeSet::new();
        let mut ignored = 0;

        for value in values {
            let value = value.as_ref();
            match Permission::parse(value) {
                Some(grant) => {
                    grants.insert(grant);
                }
                None => {
                    log::warn!("ignoring malformed permission string {:?}", value);
                    ignored += 1;
                }
            }
        }

        Self { grants, ignored }
    }

    /// Union of several sets.
    pub fn union<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = PermissionSet>,
    {
        sets.into_iter().fold(Self::empty(), |mut acc, set| {
            acc.grants.extend(set.grants);
            acc.ignored += set.ignored;
            acc
        })
    }

    /// Whether the set holds exactly this grant.
    pub fn contains(&self, permission: &Permission) -> bool {
        self.grants.contains(permission)
    }

    /// Whether the set holds the global wildcard.
    pub fn has_global(&self) -> bool {
        self.grants.contains(&Permission::Global)
    }

    /// Grants in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.grants.iter()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Number of malformed strings skipped while building the set.
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Canonical permission strings, sorted.
    pub fn to_strings(&self) -> Vec<String> {
        self.grants.iter().map(ToString::to_string).collect()
    }
}

/// Two sets are equal when they grant the same things.
impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.grants == other.grants
    }
}

impl Eq for PermissionSet {}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self {
            grants: iter.into_iter().collect(),
            ignored: 0,
        }
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn test_from_strings_skips_malformed() {
        let set = PermissionSet::from_strings(["customer:read", "bogus", "orders:*", ""]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.ignored(), 2);
        assert!(set.contains(&Permission::exact("customer", Action::Read)));
        assert!(set.contains(&Permission::resource_wildcard("orders")));
    }

    #[test]
    fn test_duplicates_collapse() {
        let set = PermissionSet::from_strings(["customer:read", "Customer:read", "customer:read"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_union_merges_grants_and_counts() {
        let a = PermissionSet::from_strings(["customer:read", "nope"]);
        let b = PermissionSet::from_strings(["customer:read", "*"]);
        let merged = PermissionSet::union([a, b]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.ignored(), 1);
        assert!(merged.has_global());
    }

    #[test]
    fn test_equality_ignores_malformed_count() {
        let a = PermissionSet::from_strings(["customer:read"]);
        let b = PermissionSet::from_strings(["customer:read", "garbage"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_strings_is_sorted_and_canonical() {
        let set = PermissionSet::from_strings(["Orders:write", "customer:*"]);
        assert_eq!(set.to_strings(), vec!["customer:*", "orders:write"]);
    }

    #[test]
    fn test_empty_set() {
        let set = PermissionSet::empty();
        assert!(set.is_empty());
        assert!(!set.has_global());
        assert_eq!(set.iter().count(), 0);
    }
}
