//! Post, post queue and feed handlers

use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Form;
use axum::Json;
use tracing::debug;
use tracing::info;

use super::db;
use super::ok_message;
use super::AppState;
use crate::api::error::ApiError;
use crate::api::error::ApiResult;
use crate::api::types::FeedForm;
use crate::api::types::PostIdForm;
use crate::api::types::PostLinkForm;
use crate::ids::ObjectId;
use crate::models::Post;
use crate::validate;
use crate::validate::PostForm;

/// Create a post from a card form (POST /post)
///
/// `ChildPosts` may repeat, so the form is read as raw pairs.
pub async fn create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ApiResult<Json<String>> {
    let post = validate::create_post(&PostForm::from_pairs(&pairs))?;
    let id = state
        .docstore
        .add_post(&post)
        .await
        .map_err(db("Failed to create a post"))?;
    info!("📝 Created post {}", id);
    Ok(Json(id))
}

/// GET /post?PostId=
pub async fn get_post(
    State(state): State<AppState>,
    Query(query): Query<PostIdForm>,
) -> ApiResult<Json<Post>> {
    let id = ObjectId::parse(&query.post_id)?.to_hex();
    let post = state
        .post_cache
        .get(&id)
        .await
        .map_err(db("Failed to fetch post from the DB"))?;
    Ok(Json(post))
}

/// Every stored post, newest first (GET /posts)
pub async fn get_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<Post>>> {
    let posts = state
        .docstore
        .get_posts()
        .await
        .map_err(db("Failed to retrieve the Posts"))?;
    debug!("Fetched {} posts", posts.len());
    Ok(Json(posts))
}

/// Queue an existing post on a mascot's feed (POST /postlink)
pub async fn create_post_link(
    State(state): State<AppState>,
    Form(form): Form<PostLinkForm>,
) -> ApiResult<impl IntoResponse> {
    let mascot_id: i32 = validate::int_field("MascotId", &form.mascot_id)?;
    let post_id = ObjectId::parse(&form.post_id)?.to_hex();

    match state.docstore.get_post(&post_id).await {
        Ok(_) => {}
        Err(e) if e.is_not_found() => return Err(ApiError::bad_request("Post doesn't exist")),
        Err(e) => return Err(ApiError::database("Failed to fetch post from the DB", e)),
    }

    state
        .database
        .link_post(mascot_id, &post_id)
        .await
        .map_err(db("Failed to create a post link"))?;
    Ok(ok_message("Post successfully linked to mascot"))
}

/// One page of a mascot feed (POST /feed)
pub async fn feed(
    State(state): State<AppState>,
    Form(form): Form<FeedForm>,
) -> ApiResult<Json<Vec<Post>>> {
    let query = validate::feed(&form.last_sync, &form.mascot_id, &form.flag)?;
    let posts = state
        .feed
        .get(query)
        .await
        .map_err(|e| ApiError::internal("Failed to get Feed").caused_by(&e))?;
    Ok(Json(posts))
}

/// Remove a post, its cache entry and every queue link to it (POST /deletePost)
///
/// Queue links go first, so a failure part way leaves a post that a retry
/// can still find and finish deleting.
pub async fn delete_post(
    State(state): State<AppState>,
    Form(form): Form<PostIdForm>,
) -> ApiResult<impl IntoResponse> {
    let post_id = ObjectId::parse(&form.post_id)?.to_hex();

    let unlinked = state
        .database
        .unlink_post(&post_id)
        .await
        .map_err(db("Couldnt unlink post"))?;
    let deleted = state.docstore.delete_post(&post_id).await;
    state.post_cache.evict(&post_id);
    deleted.map_err(db("Couldnt delete post"))?;

    info!("🗑️  Deleted post {} ({} queue links)", post_id, unlinked);
    Ok(ok_message("Successfully Deleted Post"))
}
