//! Portal HTTP server

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::extract::Multipart;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Form;
use axum::Router;
use tracing::error;
use tracing::info;

use super::pages;
use super::PortalClient;
use super::DEFAULT_MASCOT_ID;
use crate::api::server::access_log_middleware;
use crate::api::server::shutdown_signal;
use crate::api::types::LoginForm;
use crate::api::types::PostIdForm;
use crate::api::types::PostLinkForm;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::TwiqError;

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 32 << 20;

#[derive(Clone)]
pub struct PortalState {
    pub client: Arc<PortalClient>,
    pub upload_dir: PathBuf,
    pub cdn_base_url: String,
}

impl PortalState {
    /// # Errors
    /// - HTTP client creation errors
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(PortalClient::new(&config.portal.api_base_url)?),
            upload_dir: PathBuf::from(&config.portal.upload_dir),
            cdn_base_url: config.portal.cdn_base_url.clone(),
        })
    }
}

fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Redirect that also hands the API's cookies to the browser
fn found_with_cookies(location: &'static str, cookies: Vec<HeaderValue>) -> Response {
    let mut response = found(location);
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

fn upstream_failed(action: &str, err: &TwiqError) -> Response {
    error!("Portal {} failed: {}", action, err);
    found("/error")
}

fn cookie(headers: &HeaderMap) -> Option<&HeaderValue> {
    headers.get(header::COOKIE)
}

/// Stored name for an upload: nanosecond prefix plus the bare file name
fn upload_name(nanos: i64, filename: &str) -> String {
    let bare = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    format!("{nanos}_{bare}")
}

async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN_PAGE)
}

async fn success_page() -> Html<&'static str> {
    Html(pages::SUCCESS_PAGE)
}

async fn error_page() -> Html<&'static str> {
    Html(pages::ERROR_PAGE)
}

async fn login(
    State(state): State<PortalState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match state
        .client
        .login(cookie(&headers), &form.phone, &form.password)
        .await
    {
        Ok(cookies) => {
            info!("🔑 Portal login for {}", form.phone);
            found_with_cookies("/list", cookies)
        }
        Err(e) => upstream_failed("login", &e),
    }
}

async fn logout(State(state): State<PortalState>, headers: HeaderMap) -> Response {
    match state.client.logout(cookie(&headers)).await {
        Ok(cookies) => found_with_cookies("/login", cookies),
        Err(e) => upstream_failed("logout", &e),
    }
}

async fn list(State(state): State<PortalState>, headers: HeaderMap) -> Response {
    match state.client.posts(cookie(&headers)).await {
        Ok(posts) => Html(pages::render_list(&posts)).into_response(),
        Err(e) => upstream_failed("list", &e),
    }
}

/// Save the uploaded image, create the post and queue it under the default mascot
async fn create(
    State(state): State<PortalState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    match create_post(&state, cookie(&headers), multipart).await {
        Ok(id) => {
            info!("📝 Portal created post {}", id);
            found("/success")
        }
        Err(e) => upstream_failed("create", &e),
    }
}

async fn create_post(
    state: &PortalState,
    cookie: Option<&HeaderValue>,
    mut multipart: Multipart,
) -> Result<String> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TwiqError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| TwiqError::Validation(format!("Invalid image upload: {e}")))?;
            image = Some((filename, bytes.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| TwiqError::Validation(format!("Invalid field {name}: {e}")))?;
            fields.push((name, value));
        }
    }

    let card_type = fields
        .iter()
        .find(|(k, _)| k == "CardType")
        .map(|(_, v)| v.as_str())
        .unwrap_or_default();
    if card_type.parse::<i32>().is_err() {
        return Err(TwiqError::Validation(
            "Invalid Request Parameter cardType".to_string(),
        ));
    }

    let (filename, bytes) =
        image.ok_or_else(|| TwiqError::Validation("Missing image upload".to_string()))?;
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let stored = upload_name(nanos, &filename);

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    tokio::fs::write(state.upload_dir.join(&stored), &bytes).await?;

    fields.retain(|(k, _)| k != "Src");
    fields.push(("Src".to_string(), format!("{}{}", state.cdn_base_url, stored)));

    let id = state.client.create_post(cookie, &fields).await?;
    state
        .client
        .link_post(cookie, &id, DEFAULT_MASCOT_ID)
        .await?;
    Ok(id)
}

async fn delete(
    State(state): State<PortalState>,
    headers: HeaderMap,
    Form(form): Form<PostIdForm>,
) -> Response {
    match state
        .client
        .delete_post(cookie(&headers), &form.post_id)
        .await
    {
        Ok(()) => found("/success"),
        Err(e) => upstream_failed("delete", &e),
    }
}

async fn postlink(
    State(state): State<PortalState>,
    headers: HeaderMap,
    Form(form): Form<PostLinkForm>,
) -> Response {
    match state
        .client
        .link_post(cookie(&headers), &form.post_id, &form.mascot_id)
        .await
    {
        Ok(()) => found("/success"),
        Err(e) => upstream_failed("postlink", &e),
    }
}

/// Portal routes plus access logging
pub fn build_portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/list", get(list))
        .route(
            "/create",
            post(create).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/delete", post(delete))
        .route("/postlink", post(postlink))
        .route("/success", get(success_page))
        .route("/error", get(error_page))
        .with_state(state)
        .layer(axum::middleware::from_fn(access_log_middleware))
}

/// Start the portal server
pub async fn serve_portal(config: &AppConfig, host: String, port: u16) -> Result<()> {
    info!("🚀 Starting Twiq portal...");
    let state = PortalState::from_config(config)?;
    info!("🔗 Proxying to API at {}", state.client.base_url());

    let app = build_portal_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Portal listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Portal stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    fn test_state() -> PortalState {
        PortalState {
            client: Arc::new(PortalClient::new("http://127.0.0.1:9").unwrap()),
            upload_dir: std::env::temp_dir(),
            cdn_base_url: "https://cdn.example.com/uploads/".to_string(),
        }
    }

    #[test]
    fn test_upload_name_strips_directories() {
        assert_eq!(upload_name(42, "cat.png"), "42_cat.png");
        assert_eq!(upload_name(7, "../../etc/passwd"), "7_passwd");
        assert_eq!(upload_name(1, ""), "1_upload");
    }

    #[tokio::test]
    async fn test_login_page_is_served() {
        let app = build_portal_router(test_state());
        let response = app
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upstream_failure_redirects_to_error() {
        let app = build_portal_router(test_state());
        let response = app
            .oneshot(Request::get("/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/error");
    }

    #[tokio::test]
    async fn test_failed_delete_redirects_to_error() {
        let app = build_portal_router(test_state());
        let request = Request::post("/delete")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("PostId=abc"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/error");
    }
}
