//! Session and role guards for API routes

use std::sync::Arc;

use crate::api::session::SessionManager;
use crate::models::Role;

pub mod middleware;

pub use middleware::reject_login;
pub use middleware::require_login;

/// Which roles a route group admits
#[derive(Clone)]
pub struct AccessPolicy {
    pub sessions: Arc<SessionManager>,
    pub roles: &'static [Role],
}

impl AccessPolicy {
    #[must_use]
    pub const fn new(sessions: Arc<SessionManager>, roles: &'static [Role]) -> Self {
        Self { sessions, roles }
    }

    /// True when `role_id` is one of the admitted roles
    #[must_use]
    pub fn admits(&self, role_id: i32) -> bool {
        self.roles.iter().any(|r| r.id() == role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::redis_client::RedisClient;

    fn policy(roles: &'static [Role]) -> AccessPolicy {
        let config = AppConfig::default();
        let redis = Arc::new(RedisClient::connect(&config.redis).unwrap());
        AccessPolicy::new(Arc::new(SessionManager::new(redis, &config.session)), roles)
    }

    #[test]
    fn test_all_roles_admit_every_known_role() {
        let members = policy(Role::ALL);
        assert!(members.admits(Role::Admin.id()));
        assert!(members.admits(Role::User.id()));
        assert!(members.admits(Role::Writer.id()));
        assert!(!members.admits(0));
    }

    #[test]
    fn test_staff_rejects_plain_users() {
        let staff = policy(Role::STAFF);
        assert!(staff.admits(1));
        assert!(staff.admits(3));
        assert!(!staff.admits(2));
    }

    #[test]
    fn test_admin_rejects_writers() {
        let admin = policy(Role::ADMIN);
        assert!(admin.admits(1));
        assert!(!admin.admits(2));
        assert!(!admin.admits(3));
    }
}
