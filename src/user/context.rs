use super::UserRole;

/// Identity of the caller of a core operation.
///
/// Built once per request from the authenticated session and passed explicitly into the
/// moderation and document services, which trust it as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: usize,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn new(user_id: usize, role: UserRole) -> Self {
        Self {
            user_id,
            is_admin: role.is_admin(),
        }
    }

    pub fn student(user_id: usize) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: usize) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Owners and administrators may act on a document.
    pub fn can_manage(&self, owner_id: usize) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}
