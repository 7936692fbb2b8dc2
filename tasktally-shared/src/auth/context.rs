/// Request-scoped identity
///
/// Every core operation receives the acting user explicitly as an
/// `AuthContext`. Nothing in the crate keeps a "current user" anywhere else.
///
/// # Example
///
/// ```
/// use tasktally_shared::auth::context::AuthContext;
/// use tasktally_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let ctx = AuthContext::new(Uuid::new_v4(), UserRole::User, None);
/// assert!(!ctx.is_admin());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role as stored when the request started
    pub role: UserRole,

    /// Group as stored when the request started
    pub group_id: Option<Uuid>,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole, group_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            role,
            group_id,
        }
    }

    /// Builds the context for a freshly loaded user
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, user.role, user.group_id)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for AuthContext {
    fn from(user: &User) -> Self {
        Self::from_user(user)
    }
}
