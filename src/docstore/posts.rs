use async_trait::async_trait;
use tracing::debug;

use super::DocStore;
use crate::cache::PostSource;
use super::POSTS;
use crate::ids::ObjectId;
use crate::models::now_nanos;
use crate::models::Post;
use crate::Result;
use crate::TwiqError;

impl DocStore {
    /// Store a new post under a fresh id and return the id
    pub async fn add_post(&self, post: &Post) -> Result<String> {
        let id = ObjectId::new().to_hex();
        let doc = Post {
            id: id.clone(),
            time_of_creation: now_nanos(),
            ..post.stored()
        };
        self.insert(POSTS, &id, &doc).await?;
        debug!("Post successfully written. postId: {}", id);
        Ok(id)
    }

    /// # Errors
    /// `Validation("Invalid postId")` for malformed ids, `NotFound` when absent.
    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        let id = ObjectId::parse(post_id)?.to_hex();
        self.find(POSTS, &id)
            .await?
            .ok_or_else(|| TwiqError::NotFound(format!("Post {id} not found")))
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.find_all(POSTS).await?;
        posts.sort_by(|a, b| b.time_of_creation.cmp(&a.time_of_creation));
        Ok(posts)
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let id = ObjectId::parse(post_id)?.to_hex();
        if !self.remove(POSTS, &id, &[]).await? {
            return Err(TwiqError::NotFound(format!("Post {id} not found")));
        }
        debug!("Post {} removed", id);
        Ok(())
    }
}

#[async_trait]
impl PostSource for DocStore {
    async fn load_post(&self, post_id: &str) -> Result<Post> {
        self.get_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::RedisConfig;
    use crate::redis_client::RedisClient;

    fn store() -> DocStore {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            namespace: "test:twiq:posts:".to_string(),
            default_ttl_secs: 60,
        };
        DocStore::new(Arc::new(RedisClient::connect(&config).unwrap()))
    }

    #[tokio::test]
    async fn test_invalid_id_rejected_before_io() {
        let err = store().get_post("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid postId");
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn test_post_lifecycle() {
        let store = store();
        let post = Post {
            card_type: 3,
            title: "Monday".into(),
            time_of_link: 99,
            ..Post::default()
        };
        let id = store.add_post(&post).await.unwrap();
        let stored = store.get_post(&id).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "Monday");
        assert_eq!(stored.time_of_link, 0);
        assert!(stored.time_of_creation > 0);

        assert!(store.get_posts().await.unwrap().iter().any(|p| p.id == id));

        store.delete_post(&id).await.unwrap();
        assert!(store.get_post(&id).await.unwrap_err().is_not_found());
    }
}
