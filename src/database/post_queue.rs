//! Per-mascot post queue used for cursor pagination
//!
//! Every page is returned newest first.

use super::Database;
use crate::models::now_nanos;
use crate::models::PostLink;
use crate::models::DEFAULT_TIMESTAMP;
use crate::Result;

impl Database {
    /// Newest `limit` links of a mascot
    pub async fn top_post_links(&self, mascot_id: i32, limit: i64) -> Result<Vec<PostLink>> {
        let links = sqlx::query_as::<_, PostLink>(
            r"
            SELECT time_of_creation, post_id, mascot_id
            FROM post_queue
            WHERE mascot_id = $1 AND time_of_creation > $2
            ORDER BY time_of_creation DESC
            LIMIT $3
            ",
        )
        .bind(mascot_id)
        .bind(DEFAULT_TIMESTAMP)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    /// Up to `limit` links strictly older than `timestamp`
    pub async fn post_links_before(
        &self,
        timestamp: i64,
        mascot_id: i32,
        limit: i64,
    ) -> Result<Vec<PostLink>> {
        let links = sqlx::query_as::<_, PostLink>(
            r"
            SELECT time_of_creation, post_id, mascot_id
            FROM post_queue
            WHERE mascot_id = $1 AND time_of_creation < $2
            ORDER BY time_of_creation DESC
            LIMIT $3
            ",
        )
        .bind(mascot_id)
        .bind(timestamp)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    /// The `limit` links immediately newer than `timestamp`
    pub async fn post_links_after(
        &self,
        timestamp: i64,
        mascot_id: i32,
        limit: i64,
    ) -> Result<Vec<PostLink>> {
        let links = sqlx::query_as::<_, PostLink>(
            r"
            SELECT time_of_creation, post_id, mascot_id
            FROM (
                SELECT time_of_creation, post_id, mascot_id
                FROM post_queue
                WHERE mascot_id = $1 AND time_of_creation > $2
                ORDER BY time_of_creation ASC
                LIMIT $3
            ) AS page
            ORDER BY time_of_creation DESC
            ",
        )
        .bind(mascot_id)
        .bind(timestamp)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    /// Link a post into a mascot queue at the current time
    ///
    /// # Errors
    /// Fails if the mascot does not exist or the post is already linked to it.
    pub async fn link_post(&self, mascot_id: i32, post_id: &str) -> Result<PostLink> {
        let link = PostLink {
            time_of_creation: now_nanos(),
            post_id: post_id.to_string(),
            mascot_id,
        };
        sqlx::query("INSERT INTO post_queue (time_of_creation, post_id, mascot_id) VALUES ($1, $2, $3)")
            .bind(link.time_of_creation)
            .bind(&link.post_id)
            .bind(link.mascot_id)
            .execute(&self.pool)
            .await?;
        Ok(link)
    }

    pub async fn post_links(&self, mascot_id: i32) -> Result<Vec<PostLink>> {
        let links = sqlx::query_as::<_, PostLink>(
            "SELECT time_of_creation, post_id, mascot_id FROM post_queue WHERE mascot_id = $1
             ORDER BY time_of_creation DESC",
        )
        .bind(mascot_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    /// Remove a post from every mascot queue; returns the number of links removed
    pub async fn unlink_post(&self, post_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM post_queue WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use crate::ids::ObjectId;
    use crate::models::DEFAULT_MASCOT_ID;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_cursor_pages() {
        let db = test_support::database().await;
        let mut links = Vec::new();
        for _ in 0..5 {
            let id = ObjectId::new().to_hex();
            links.push(db.link_post(DEFAULT_MASCOT_ID, &id).await.unwrap());
        }
        let middle = links[2].time_of_creation;

        let before = db.post_links_before(middle, DEFAULT_MASCOT_ID, 2).await.unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].post_id, links[1].post_id);
        assert_eq!(before[1].post_id, links[0].post_id);

        let after = db.post_links_after(middle, DEFAULT_MASCOT_ID, 1).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].post_id, links[3].post_id);

        let top = db.top_post_links(DEFAULT_MASCOT_ID, 1).await.unwrap();
        assert!(top[0].time_of_creation >= links[4].time_of_creation);

        for link in &links {
            assert_eq!(db.unlink_post(&link.post_id).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_link_twice_fails() {
        let db = test_support::database().await;
        let id = ObjectId::new().to_hex();
        db.link_post(DEFAULT_MASCOT_ID, &id).await.unwrap();
        assert!(db.link_post(DEFAULT_MASCOT_ID, &id).await.is_err());
        db.unlink_post(&id).await.unwrap();
    }
}
