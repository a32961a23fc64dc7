//! In-process caches
//!
//! - [`PostCache`]: LRU of post documents in front of the document store
//! - [`UrlMemo`]: memoized prefetch URL list, dropped on every write

use std::num::NonZeroUsize;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;

use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::database::Database;
use crate::models::Post;
use crate::Result;

/// Anything that can resolve a post id to its document
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn load_post(&self, post_id: &str) -> Result<Post>;
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of post metadata
///
/// The lock is never held across an await; two concurrent misses for the
/// same id both load and the later insert wins. A load that overlaps an
/// eviction is returned but not cached, so an evicted post cannot come back
/// from a read that started before the eviction.
pub struct PostCache {
    source: Arc<dyn PostSource>,
    entries: Mutex<LruCache<String, Post>>,
    capacity: usize,
    /// Bumped under the entries lock by every eviction
    evictions: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PostCache {
    pub fn new(source: Arc<dyn PostSource>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            entries: Mutex::new(LruCache::new(size)),
            capacity,
            evictions: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Post>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached post, loading and caching it on a miss
    pub async fn get(&self, post_id: &str) -> Result<Post> {
        if let Some(post) = self.lock().get(post_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(post.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let epoch = self.evictions.load(Ordering::Acquire);
        let post = self.source.load_post(post_id).await?;

        let mut entries = self.lock();
        if self.evictions.load(Ordering::Acquire) == epoch {
            entries.put(post_id.to_string(), post.clone());
            debug!("Post {} cached", post_id);
        } else {
            debug!("Post {} loaded across an eviction, not cached", post_id);
        }
        Ok(post)
    }

    pub fn evict(&self, post_id: &str) -> Option<Post> {
        let mut entries = self.lock();
        self.evictions.fetch_add(1, Ordering::AcqRel);
        entries.pop(post_id)
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        self.evictions.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}

#[async_trait]
impl PostSource for PostCache {
    async fn load_post(&self, post_id: &str) -> Result<Post> {
        self.get(post_id).await
    }
}

impl std::fmt::Debug for PostCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[derive(Debug, Default)]
struct MemoState {
    generation: u64,
    urls: Option<Vec<String>>,
}

/// Memoized `url_cache` table
///
/// Each invalidation starts a new generation. A list read from the database
/// is only stored if no invalidation happened since the read began.
#[derive(Debug, Default)]
pub struct UrlMemo {
    state: RwLock<MemoState>,
}

impl UrlMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation and the list memoized for it, if any
    pub fn snapshot(&self) -> (u64, Option<Vec<String>>) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (state.generation, state.urls.clone())
    }

    pub fn cached(&self) -> Option<Vec<String>> {
        self.snapshot().1
    }

    /// Memoize `urls` read at `generation`; returns false for a stale list
    pub fn store(&self, generation: u64, urls: Vec<String>) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation != generation {
            return false;
        }
        state.urls = Some(urls);
        true
    }

    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.urls = None;
    }

    /// Memoized list, read from the database on first use after an invalidation
    pub async fn urls(&self, database: &Database) -> Result<Vec<String>> {
        let (generation, cached) = self.snapshot();
        if let Some(urls) = cached {
            return Ok(urls);
        }
        let urls = database.cache_urls().await?;
        if !self.store(generation, urls.clone()) {
            debug!("URL list changed while loading, not memoized");
        }
        Ok(urls)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::TwiqError;

    /// In-memory post source counting its loads
    #[derive(Default)]
    pub struct MemoryPosts {
        pub posts: Mutex<HashMap<String, Post>>,
        pub loads: AtomicUsize,
    }

    impl MemoryPosts {
        pub fn with(posts: Vec<Post>) -> Self {
            Self {
                posts: Mutex::new(posts.into_iter().map(|p| (p.id.clone(), p)).collect()),
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PostSource for MemoryPosts {
        async fn load_post(&self, post_id: &str) -> Result<Post> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.posts
                .lock()
                .unwrap()
                .get(post_id)
                .cloned()
                .ok_or_else(|| TwiqError::NotFound(format!("Post {post_id} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Notify;

    use super::test_support::MemoryPosts;
    use super::*;

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: format!("title {id}"),
            ..Post::default()
        }
    }

    #[tokio::test]
    async fn test_second_read_is_a_hit() {
        let source = Arc::new(MemoryPosts::with(vec![post("a")]));
        let cache = PostCache::new(source.clone(), 4);

        assert_eq!(cache.get("a").await.unwrap().title, "title a");
        assert_eq!(cache.get("a").await.unwrap().title, "title a");

        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_least_recent_entry_is_evicted() {
        let source = Arc::new(MemoryPosts::with(vec![post("a"), post("b"), post("c")]));
        let cache = PostCache::new(source.clone(), 2);

        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();
        cache.get("a").await.unwrap();
        cache.get("c").await.unwrap();

        assert_eq!(cache.len(), 2);
        cache.get("b").await.unwrap();
        assert_eq!(source.loads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let source = Arc::new(MemoryPosts::default());
        let cache = PostCache::new(source, 2);
        assert!(cache.get("nope").await.unwrap_err().is_not_found());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_evict_forces_reload() {
        let source = Arc::new(MemoryPosts::with(vec![post("a")]));
        let cache = PostCache::new(source.clone(), 2);
        cache.get("a").await.unwrap();
        assert!(cache.evict("a").is_some());
        cache.get("a").await.unwrap();
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = PostCache::new(Arc::new(MemoryPosts::default()), 0);
        assert_eq!(cache.stats().capacity, 1);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    /// Source that hands out the post it read, but only once released
    struct GatedPosts {
        inner: MemoryPosts,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl PostSource for GatedPosts {
        async fn load_post(&self, post_id: &str) -> Result<Post> {
            let post = self.inner.load_post(post_id).await;
            self.entered.notify_one();
            self.release.notified().await;
            post
        }
    }

    #[tokio::test]
    async fn test_evict_during_load_is_not_undone() {
        let source = Arc::new(GatedPosts {
            inner: MemoryPosts::with(vec![post("a")]),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let cache = Arc::new(PostCache::new(source.clone(), 4));

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get("a").await })
        };
        source.entered.notified().await;

        // Post deleted while the read is in flight
        source.inner.posts.lock().unwrap().clear();
        cache.evict("a");
        source.release.notify_one();

        assert_eq!(reader.await.unwrap().unwrap().title, "title a");
        assert!(cache.is_empty());

        let next = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get("a").await }
        });
        source.entered.notified().await;
        source.release.notify_one();
        assert!(next.await.unwrap().unwrap_err().is_not_found());
    }

    #[test]
    fn test_url_memo_invalidation() {
        let memo = UrlMemo::new();
        assert!(memo.cached().is_none());
        let (generation, _) = memo.snapshot();
        assert!(memo.store(generation, vec!["https://cdn.twiq.in/a.png".into()]));
        assert_eq!(memo.cached().unwrap().len(), 1);
        memo.invalidate();
        assert!(memo.cached().is_none());
    }

    #[test]
    fn test_url_memo_drops_list_read_before_invalidation() {
        let memo = UrlMemo::new();

        // A reader misses and starts loading the old list
        let (generation, cached) = memo.snapshot();
        assert!(cached.is_none());

        // An admin write lands meanwhile
        memo.invalidate();

        assert!(!memo.store(generation, vec!["https://cdn.twiq.in/old.png".into()]));
        assert!(memo.cached().is_none());

        let (generation, _) = memo.snapshot();
        assert!(memo.store(generation, vec!["https://cdn.twiq.in/new.png".into()]));
        assert_eq!(memo.cached().unwrap(), vec!["https://cdn.twiq.in/new.png"]);
    }
}
