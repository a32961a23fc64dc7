//! Authentication middleware for Axum

use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use tracing::debug;
use tracing::warn;

use super::AccessPolicy;
use crate::api::error::ApiError;
use crate::api::session::SessionManager;

fn access_denied(role_id: i32) -> ApiError {
    ApiError::unauthorized(format!("Access Denied for role {role_id}"))
}

/// Admit only logged-in users whose role the policy allows
///
/// On success the [`UserSession`](crate::api::session::UserSession) is
/// inserted into the request extensions for handlers to extract.
pub async fn require_login(
    State(policy): State<AccessPolicy>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match policy.sessions.from_headers(request.headers()).await {
        Ok(Some(session)) => session,
        Ok(None) => return ApiError::unauthorized("User not logged in").into_response(),
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            return ApiError::internal("Failed to load session")
                .caused_by(&e)
                .into_response();
        }
    };

    if !policy.admits(session.role_id) {
        debug!(
            "Role {} denied for {}",
            session.role_id,
            request.uri().path()
        );
        return access_denied(session.role_id).into_response();
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Turn away callers that already hold a valid session
pub async fn reject_login(
    State(sessions): State<Arc<SessionManager>>,
    request: Request,
    next: Next,
) -> Response {
    match sessions.from_headers(request.headers()).await {
        Ok(Some(_)) => ApiError::unauthorized("User Already logged in").into_response(),
        Ok(None) => next.run(request).await,
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            ApiError::internal("Failed to load session")
                .caused_by(&e)
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::models::Role;
    use crate::redis_client::RedisClient;

    fn sessions() -> Arc<SessionManager> {
        let config = AppConfig::default();
        let redis = Arc::new(RedisClient::connect(&config.redis).unwrap());
        Arc::new(SessionManager::new(redis, &config.session))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_access_denied_names_the_role() {
        let err = access_denied(2);
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Access Denied for role 2");
    }

    #[tokio::test]
    async fn test_require_login_without_cookie() {
        let policy = AccessPolicy::new(sessions(), Role::STAFF);
        let app = Router::new()
            .route("/staff", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(policy, require_login));

        let response = app
            .oneshot(Request::get("/staff").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["Message"], "User not logged in");
    }

    #[tokio::test]
    async fn test_reject_login_lets_anonymous_callers_through() {
        let app = Router::new()
            .route("/open", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(sessions(), reject_login));

        let response = app
            .oneshot(Request::get("/open").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
