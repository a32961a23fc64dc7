//! Cookie sessions backed by Redis
//!
//! The cookie holds a random id; the session itself lives at `session:{id}`
//! with the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::models::Role;
use crate::redis_client::RedisClient;

/// A logged-in user, as stored in Redis and handed to handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: String,
    pub user_id: i32,
    pub phone: String,
    pub role_id: i32,
    pub created_at: i64,
}

impl UserSession {
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Admins may act on any user's rows
    #[must_use]
    pub fn may_access(&self, owner_id: i32) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

pub struct SessionManager {
    redis: Arc<RedisClient>,
    cookie_name: String,
    ttl: Duration,
    secure: bool,
}

impl SessionManager {
    pub fn new(redis: Arc<RedisClient>, config: &SessionConfig) -> Self {
        Self {
            redis,
            cookie_name: config.cookie_name.clone(),
            ttl: Duration::from_secs(config.ttl_secs),
            secure: config.secure_cookie,
        }
    }

    fn key(session_id: &str) -> String {
        format!("session:{session_id}")
    }

    /// Store a new session for the user
    ///
    /// # Errors
    /// Returns error if Redis operation fails or session serialization fails
    pub async fn create_session(
        &self,
        user_id: i32,
        phone: &str,
        role: Role,
    ) -> crate::Result<UserSession> {
        let session = UserSession {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            phone: phone.to_string(),
            role_id: role.id(),
            created_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_string(&session)?;
        self.redis
            .set_json_with_ttl(&Self::key(&session.session_id), &json, Some(self.ttl))
            .await?;
        Ok(session)
    }

    pub async fn get_session(&self, session_id: &str) -> crate::Result<Option<UserSession>> {
        match self.redis.get_json(&Self::key(session_id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> crate::Result<()> {
        self.redis.delete(&Self::key(session_id)).await
    }

    /// Session referenced by the request's cookie, if any
    ///
    /// # Errors
    /// Only Redis and deserialization failures; a missing or unknown cookie is `Ok(None)`
    pub async fn from_headers(&self, headers: &HeaderMap) -> crate::Result<Option<UserSession>> {
        match self.session_id(headers) {
            Some(id) => self.get_session(&id).await,
            None => Ok(None),
        }
    }

    /// Value of our cookie in the request
    #[must_use]
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    /// `Set-Cookie` value carrying a session id
    #[must_use]
    pub fn cookie(&self, session_id: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; Max-Age={}",
            self.cookie_name,
            session_id,
            self.ttl.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that removes the session cookie
    #[must_use]
    pub fn expired_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; Max-Age=0", self.cookie_name)
    }
}
