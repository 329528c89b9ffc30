//! Default permission rule for authenticated requests

use axum::http::Method;
use std::{collections::HashSet, sync::Arc};

use crate::{authenticator::PermissionRule, models::Identity};

/// Path-based access policy.
///
/// Bootstrap sessions may only reach the allow-listed paths. Paths under an
/// admin prefix need an admin identity. Everything else is open to any
/// logged-in identity.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    bootstrap_paths: HashSet<String>,
    admin_prefixes: Vec<String>,
}

impl AccessPolicy {
    /// Create a policy from the bootstrap allow-list and admin prefixes
    pub fn new<B, A>(bootstrap_paths: B, admin_prefixes: A) -> Self
    where
        B: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
    {
        Self {
            bootstrap_paths: bootstrap_paths.into_iter().collect(),
            admin_prefixes: admin_prefixes
                .into_iter()
                .map(|prefix| prefix.trim_end_matches('/').to_string())
                .filter(|prefix| !prefix.is_empty())
                .collect(),
        }
    }

    fn is_admin_path(&self, path: &str) -> bool {
        self.admin_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether `identity` may perform `method` on `path`
    pub fn allows(&self, identity: &Identity, _method: &Method, path: &str) -> bool {
        if identity.is_bootstrap() {
            return self.bootstrap_paths.contains(path);
        }

        if self.is_admin_path(path) {
            return identity.admin;
        }

        true
    }

    /// Wrap the policy as a permission rule for the authenticator
    pub fn into_rule(self) -> PermissionRule {
        Arc::new(move |identity: &Identity, method: &Method, path: &str| {
            self.allows(identity, method, path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(
            ["/".to_string(), "/api/users".to_string()],
            ["/api/users/".to_string()],
        )
    }

    fn member(admin: bool) -> Identity {
        Identity {
            id: 3,
            username: "carol".to_string(),
            admin,
            ..Default::default()
        }
    }

    #[test]
    fn test_bootstrap_identity_limited_to_allow_list() {
        let policy = policy();
        let bootstrap = Identity::default();

        assert!(policy.allows(&bootstrap, &Method::GET, "/"));
        assert!(policy.allows(&bootstrap, &Method::POST, "/api/users"));
        assert!(!policy.allows(&bootstrap, &Method::GET, "/api/entries"));
    }

    #[test]
    fn test_admin_prefix_requires_admin() {
        let policy = policy();

        assert!(!policy.allows(&member(false), &Method::DELETE, "/api/users"));
        assert!(!policy.allows(&member(false), &Method::PUT, "/api/users/4"));
        assert!(policy.allows(&member(true), &Method::PUT, "/api/users/4"));
    }

    #[test]
    fn test_prefix_match_respects_segments() {
        let policy = policy();
        assert!(policy.allows(&member(false), &Method::GET, "/api/usersettings"));
        assert!(policy.allows(&member(false), &Method::GET, "/api/entries"));
    }
}
