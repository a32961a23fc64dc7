//! Document store for posts and products, kept as JSON in Redis
//!
//! Each document lives at `doc:{collection}:{id}` and its id is tracked in the
//! `doc:{collection}:ids` set so whole collections can be listed.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::redis_client::RedisClient;
use crate::Result;

mod posts;
mod products;

pub const POSTS: &str = "posts";
pub const PRODUCTS: &str = "products";

#[derive(Clone)]
pub struct DocStore {
    redis: Arc<RedisClient>,
}

impl DocStore {
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }

    fn doc_key(collection: &str, id: &str) -> String {
        format!("doc:{collection}:{id}")
    }

    fn ids_key(collection: &str) -> String {
        format!("doc:{collection}:ids")
    }

    async fn insert<T: Serialize + Sync>(&self, collection: &str, id: &str, doc: &T) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        self.redis
            .set_with_member(
                &Self::doc_key(collection, id),
                &json,
                &Self::ids_key(collection),
                id,
            )
            .await
    }

    async fn find<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        match self.redis.get_json(&Self::doc_key(collection, id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn find_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let ids = self.redis.smembers(&Self::ids_key(collection)).await?;
        let keys: Vec<String> = ids.iter().map(|id| Self::doc_key(collection, id)).collect();
        let mut docs = Vec::with_capacity(keys.len());
        for json in self.redis.mget_json(&keys).await?.into_iter().flatten() {
            match serde_json::from_str(&json) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!("Skipping unreadable {} document: {}", collection, e),
            }
        }
        Ok(docs)
    }

    /// Remove a document plus any sidecar keys; true when the document existed
    async fn remove(&self, collection: &str, id: &str, extra_keys: &[String]) -> Result<bool> {
        let mut keys = vec![Self::doc_key(collection, id)];
        keys.extend_from_slice(extra_keys);
        let removed = self
            .redis
            .delete_with_member(&keys, &Self::ids_key(collection), id)
            .await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(DocStore::doc_key(POSTS, "abc"), "doc:posts:abc");
        assert_eq!(DocStore::ids_key(PRODUCTS), "doc:products:ids");
    }
}
