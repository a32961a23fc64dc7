use super::Database;
use crate::Result;

impl Database {
    /// URLs the clients should prefetch
    pub async fn cache_urls(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT url FROM url_cache ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    pub async fn insert_cache_url(&self, url: &str) -> Result<()> {
        sqlx::query("INSERT INTO url_cache (url) VALUES ($1)")
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every row holding `url`
    pub async fn delete_cache_url(&self, url: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM url_cache WHERE url = $1")
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_insert_and_delete_url() {
        let db = test_support::database().await;
        let url = format!("https://cdn.twiq.in/{}.png", uuid::Uuid::new_v4());
        db.insert_cache_url(&url).await.unwrap();
        assert!(db.cache_urls().await.unwrap().contains(&url));
        assert_eq!(db.delete_cache_url(&url).await.unwrap(), 1);
        assert!(!db.cache_urls().await.unwrap().contains(&url));
    }
}
