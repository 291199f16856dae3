// src/jobs/tenant.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::paths;
use crate::core::DocumentStore;

/// Who is asking. Identity is verified upstream; only the uid reaches us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User { uid: String },
}

impl Caller {
    pub fn user(uid: impl Into<String>) -> Self {
        Caller::User { uid: uid.into() }
    }
}

/// Maps a caller to the university (tenant) that scopes their jobs
#[derive(Clone)]
pub struct TenantResolver {
    store: Arc<dyn DocumentStore>,
}

impl TenantResolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// `None` means the unscoped global job list. For a signed-in user this is
    /// an inconsistency in their profile; it is logged and the fallback runs.
    pub async fn resolve(&self, caller: &Caller) -> Result<Option<String>> {
        let uid = match caller {
            Caller::Anonymous => return Ok(None),
            Caller::User { uid } => uid,
        };

        let profile = self
            .store
            .get(&paths::user_doc(uid))
            .await
            .with_context(|| format!("Failed to load profile for user {}", uid))?;

        let tenant = profile
            .as_ref()
            .and_then(|doc| doc.str_field("universityId"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        match &tenant {
            Some(tenant) => debug!("User {} resolved to tenant {}", uid, tenant),
            None => warn!(
                "No tenant resolved for authenticated user {}; falling back to the global job list",
                uid
            ),
        }

        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_tenant_from_profile() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "users/hr-1",
                json!({"universityId": "u1"}).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
        store
            .set(
                "users/hr-2",
                json!({"universityId": ""}).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
        let resolver = TenantResolver::new(store);

        assert_eq!(
            resolver.resolve(&Caller::user("hr-1")).await.unwrap(),
            Some("u1".to_string())
        );
        assert_eq!(resolver.resolve(&Caller::user("hr-2")).await.unwrap(), None);
        assert_eq!(resolver.resolve(&Caller::user("ghost")).await.unwrap(), None);
        assert_eq!(resolver.resolve(&Caller::Anonymous).await.unwrap(), None);
    }
}
