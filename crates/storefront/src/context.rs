use uuid::Uuid;

use crate::store::RecordStore;
use crate::{Result, Role, StorefrontError};

/// Identity and client details of a single request
///
/// Authentication happens upstream; whatever user id the identity provider
/// vouched for arrives here and is passed explicitly into each operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Option<Uuid>,
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }

    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::anonymous()
        }
    }

    pub fn with_client(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

pub async fn require_role(
    store: &dyn RecordStore,
    ctx: &RequestContext,
    role: Role,
) -> Result<Uuid> {
    let user_id = ctx.user_id.ok_or(StorefrontError::Unauthenticated)?;
    if store.has_role(user_id, role).await? {
        Ok(user_id)
    } else {
        Err(StorefrontError::PermissionDenied(format!(
            "user {} lacks role {}",
            user_id, role
        )))
    }
}
