//! Mascot feed assembly
//!
//! A feed page is built in three steps:
//!
//! 1. fetch a page of post links from the mascot's queue (top, before or after a cursor)
//! 2. resolve each link to its post document through the post cache
//! 3. inline the children of every list card as JSON
//!
//! Links whose post cannot be resolved are dropped from the page. A list card
//! whose child cannot be resolved fails the whole request.

use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::cache::PostSource;
use crate::database::Database;
use crate::models::Post;
use crate::models::PostLink;
use crate::validate::FeedFlag;
use crate::validate::FeedQuery;
use crate::Result;

#[derive(Clone)]
pub struct Feed {
    database: Database,
    posts: Arc<dyn PostSource>,
    page_size: i64,
}

impl Feed {
    pub fn new(database: Database, posts: Arc<dyn PostSource>, page_size: i64) -> Self {
        Self {
            database,
            posts,
            page_size,
        }
    }

    /// One page of the mascot's feed, newest first
    ///
    /// # Errors
    /// - Database errors while reading the post queue
    /// - Failure to resolve a child of a list card
    pub async fn get(&self, query: FeedQuery) -> Result<Vec<Post>> {
        let links = match query.flag {
            FeedFlag::Top => {
                self.database
                    .top_post_links(query.mascot_id, self.page_size)
                    .await?
            }
            FeedFlag::Before => {
                self.database
                    .post_links_before(query.last_sync, query.mascot_id, self.page_size)
                    .await?
            }
            FeedFlag::After => {
                self.database
                    .post_links_after(query.last_sync, query.mascot_id, self.page_size)
                    .await?
            }
        };
        debug!(
            "Feed for mascot {} ({:?} {}): {} links",
            query.mascot_id,
            query.flag,
            query.last_sync,
            links.len()
        );

        assemble(self.posts.as_ref(), &links).await
    }
}

/// Resolve links to posts and expand list cards
pub async fn assemble(posts: &dyn PostSource, links: &[PostLink]) -> Result<Vec<Post>> {
    let resolved = resolve_links(posts, links).await;
    expand_list_cards(posts, resolved).await
}

/// Posts for the given links in link order, stamped with their link time
pub async fn resolve_links(posts: &dyn PostSource, links: &[PostLink]) -> Vec<Post> {
    let mut resolved = Vec::with_capacity(links.len());
    for link in links {
        match posts.load_post(&link.post_id).await {
            Ok(mut post) => {
                post.time_of_link = link.time_of_creation;
                resolved.push(post);
            }
            Err(e) => {
                warn!("Skipping post {} in feed: {}", link.post_id, e);
            }
        }
    }
    resolved
}

/// Inline the children of every list card into `ChildPostsJson`
///
/// Children inherit the parent's link time.
pub async fn expand_list_cards(posts: &dyn PostSource, mut feed: Vec<Post>) -> Result<Vec<Post>> {
    for parent in feed.iter_mut().filter(|p| p.is_list()) {
        let mut children = Vec::with_capacity(parent.child_posts.len());
        for child_id in &parent.child_posts {
            let mut child = posts.load_post(child_id).await?;
            child.time_of_link = parent.time_of_link;
            children.push(child);
        }
        parent.child_posts_json = serde_json::to_string(&children)?;
    }
    Ok(feed)
}
