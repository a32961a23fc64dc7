/// API request handlers
use std::sync::Arc;

use axum::extract::Query;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use regex::Regex;
use tracing::info;

use crate::api::error::message;
use crate::api::error::ApiError;
use crate::api::error::ApiResult;
use crate::api::session::SessionManager;
use crate::api::types::LookupQuery;
use crate::cache::PostCache;
use crate::cache::UrlMemo;
use crate::config::AppConfig;
use crate::database::Database;
use crate::docstore::DocStore;
use crate::feed::Feed;
use crate::notify::Notifier;
use crate::payment::PaymentService;
use crate::redis_client::RedisClient;
use crate::Result;
use crate::TwiqError;

pub mod commerce;
pub mod misc;
pub mod posts;
pub mod users;

pub use commerce::*;
pub use misc::*;
pub use posts::*;
pub use users::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: Database,
    pub docstore: DocStore,
    pub post_cache: Arc<PostCache>,
    pub url_memo: Arc<UrlMemo>,
    pub feed: Feed,
    pub payments: PaymentService,
    pub notifier: Arc<Notifier>,
    pub sessions: Arc<SessionManager>,
    pub deliverable: Arc<Regex>,
}

impl AppState {
    /// Wire the services together over an existing pool and Redis client
    ///
    /// # Errors
    /// `ConfigError` when the delivery postal code pattern is not a valid regex
    pub fn build(
        config: &AppConfig,
        database: Database,
        redis: Arc<RedisClient>,
        notifier: Notifier,
    ) -> Result<Self> {
        let docstore = DocStore::new(redis.clone());
        let post_cache = Arc::new(PostCache::new(
            Arc::new(docstore.clone()),
            config.post_cache_capacity(),
        ));
        let feed = Feed::new(database.clone(), post_cache.clone(), config.feed_page_size());
        let payments = PaymentService::new(
            database.clone(),
            Arc::new(docstore.clone()),
            Arc::new(database.clone()),
            config.payment.clone(),
        );
        let deliverable = Regex::new(&config.delivery.postal_code_pattern).map_err(|e| {
            TwiqError::ConfigError(format!("Invalid delivery.postal_code_pattern: {e}"))
        })?;
        info!(
            "Post cache capacity {}, feed page size {}",
            config.post_cache_capacity(),
            config.feed_page_size()
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            database,
            docstore,
            post_cache,
            url_memo: Arc::new(UrlMemo::new()),
            feed,
            payments,
            notifier: Arc::new(notifier),
            sessions: Arc::new(SessionManager::new(redis, &config.session)),
            deliverable: Arc::new(deliverable),
        })
    }
}

/// Plain-text success body
pub(crate) fn ok_message(msg: &str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message(msg))
}

/// Liveness check (GET|POST /ok)
pub async fn ok() -> impl IntoResponse {
    ok_message("OK")
}

/// Liveness check behind the session guard (GET|POST /login-ok)
pub async fn login_ok() -> impl IntoResponse {
    ok_message("Login ok")
}

/// App deep link carrying a verification token, query re-encoded
fn verify_location(token: &str) -> ApiResult<String> {
    let query = serde_urlencoded::to_string([("token", token)])
        .map_err(|e| ApiError::bad_request("Invalid token").caused_by(&e))?;
    Ok(format!("twiq://verify.token?{query}"))
}

/// Hand a verification token to the mobile app with a 302 (GET /vr)
pub async fn verify_redirect(
    Query(query): Query<LookupQuery>,
) -> ApiResult<impl IntoResponse> {
    let location = verify_location(&query.token)?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// Map a store failure to a "Database error: {context}" response
pub(crate) fn db(context: &'static str) -> impl FnOnce(TwiqError) -> ApiError {
    move |e| ApiError::database(context, e)
}
