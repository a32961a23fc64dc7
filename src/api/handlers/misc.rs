//! Feedback and prefetch URL cache handlers

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Form;
use axum::Json;
use tracing::error;

use super::db;
use super::ok_message;
use super::AppState;
use crate::api::error::ApiError;
use crate::api::error::ApiResult;
use crate::api::session::UserSession;
use crate::api::types::CacheUrlForm;
use crate::api::types::FeedbackForm;
use crate::models::FeedbackType;

/// Store feedback and forward it to the info mailbox (POST /feedback)
///
/// A failed e-mail is logged; the feedback row is what counts.
pub async fn feedback(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Form(form): Form<FeedbackForm>,
) -> ApiResult<impl IntoResponse> {
    let kind = FeedbackType::parse(&form.feedback_type)
        .ok_or_else(|| ApiError::bad_request("Invalid type value"))?;
    if form.description.is_empty() {
        return Err(ApiError::bad_request("Description cannot be empty"));
    }

    state
        .database
        .add_feedback(session.user_id, kind, &form.description)
        .await
        .map_err(db("Writing feedback failed"))?;

    if let Err(e) = state
        .notifier
        .mail
        .feedback_email(&session.phone, kind, &form.description)
        .await
    {
        error!("Failed to trigger email on feedback request: {}", e);
    }

    Ok(ok_message("Feedback received"))
}

/// URLs the app should prefetch (GET /cache)
pub async fn get_cache_urls(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let urls = state
        .url_memo
        .urls(&state.database)
        .await
        .map_err(db("Failed to retrieve cache urls"))?;
    Ok(Json(urls))
}

/// Add (`Type=1`) or remove (`Type=0`) a prefetch URL (POST /cache)
pub async fn update_cache_urls(
    State(state): State<AppState>,
    Form(form): Form<CacheUrlForm>,
) -> ApiResult<impl IntoResponse> {
    match form.op.as_str() {
        "1" => state
            .database
            .insert_cache_url(&form.url)
            .await
            .map_err(db("Couldnt insert url"))?,
        "0" => {
            state
                .database
                .delete_cache_url(&form.url)
                .await
                .map_err(db("Couldnt delete url"))?;
        }
        _ => return Err(ApiError::bad_request("Invalid type value")),
    }
    state.url_memo.invalidate();
    Ok(ok_message("Successfully completed operation"))
}
