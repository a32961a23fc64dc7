//! Thin async Redis wrapper shared by the session and document stores
//!
//! Every key is prefixed with the configured namespace. Connections are
//! multiplexed and opened per call; `redis::Client::open` itself does no I/O.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::TwiqError;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    namespace: String,
    default_ttl: Duration,
}

impl RedisClient {
    pub fn connect(config: &RedisConfig) -> crate::Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| TwiqError::Redis(format!("Redis open error: {e}")))?;

        Ok(Self {
            client,
            namespace: config.namespace.clone(),
            default_ttl: Duration::from_secs(config.default_ttl_secs),
        })
    }

    /// Namespaced key
    #[must_use]
    pub fn key(&self, k: &str) -> String {
        format!("{}{}", self.namespace, k)
    }

    async fn conn(&self) -> crate::Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis connect error: {e}")))
    }

    /// Round-trip a PING; used at startup
    pub async fn ping(&self) -> crate::Result<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis PING error: {e}")))?;
        Ok(())
    }

    pub async fn get_json(&self, key: &str) -> crate::Result<Option<String>> {
        let k = self.key(key);
        let mut conn = self.conn().await?;
        let val: Option<String> = conn
            .get(k)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis GET error: {e}")))?;
        Ok(val)
    }

    /// Store without expiry
    pub async fn set_json(&self, key: &str, json: &str) -> crate::Result<()> {
        let k = self.key(key);
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(k, json)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis SET error: {e}")))?;
        Ok(())
    }

    pub async fn set_json_with_ttl(
        &self,
        key: &str,
        json: &str,
        ttl: Option<Duration>,
    ) -> crate::Result<()> {
        let k = self.key(key);
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut conn = self.conn().await?;
        redis::pipe()
            .set(&k, json)
            .ignore()
            .expire(&k, i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis SET/EXPIRE error: {e}")))?;
        Ok(())
    }

    /// Store a document and add its id to a membership set in one round trip
    pub async fn set_with_member(
        &self,
        key: &str,
        json: &str,
        set: &str,
        member: &str,
    ) -> crate::Result<()> {
        let mut conn = self.conn().await?;
        redis::pipe()
            .atomic()
            .set(self.key(key), json)
            .ignore()
            .sadd(self.key(set), member)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis SET/SADD error: {e}")))?;
        Ok(())
    }

    /// Delete keys and drop a member from a set; returns the number of keys removed
    pub async fn delete_with_member(
        &self,
        keys: &[String],
        set: &str,
        member: &str,
    ) -> crate::Result<i64> {
        let mut conn = self.conn().await?;
        let namespaced: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let (removed, _): (i64, i64) = redis::pipe()
            .atomic()
            .del(namespaced)
            .srem(self.key(set), member)
            .query_async(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis DEL/SREM error: {e}")))?;
        Ok(removed)
    }

    pub async fn delete(&self, key: &str) -> crate::Result<()> {
        let k = self.key(key);
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(k)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis DEL error: {e}")))?;
        Ok(())
    }

    pub async fn smembers(&self, set: &str) -> crate::Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let members: Vec<String> = conn
            .smembers(self.key(set))
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis SMEMBERS error: {e}")))?;
        Ok(members)
    }

    /// MGET over namespaced keys, preserving order
    pub async fn mget_json(&self, keys: &[String]) -> crate::Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let namespaced: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(namespaced)
            .query_async(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis MGET error: {e}")))?;
        Ok(values)
    }

    /// Run a Lua script against namespaced keys and return its integer reply
    pub async fn eval_i64(
        &self,
        script: &redis::Script,
        keys: &[&str],
        args: &[i64],
    ) -> crate::Result<i64> {
        let mut conn = self.conn().await?;
        let mut invocation = script.prepare_invoke();
        for k in keys {
            invocation.key(self.key(k));
        }
        for a in args {
            invocation.arg(*a);
        }
        invocation
            .invoke_async::<i64>(&mut conn)
            .await
            .map_err(|e| TwiqError::Redis(format!("Redis EVALSHA error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(namespace: &str) -> RedisClient {
        let config = RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: namespace.to_string(),
            default_ttl_secs: 60,
        };
        RedisClient::connect(&config).unwrap()
    }

    #[test]
    fn test_keys_are_namespaced() {
        let redis = client("twiq:");
        assert_eq!(redis.key("session:abc"), "twiq:session:abc");
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let config = RedisConfig {
            url: "not a url".to_string(),
            namespace: "x:".to_string(),
            default_ttl_secs: 60,
        };
        assert!(matches!(RedisClient::connect(&config), Err(TwiqError::Redis(_))));
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn test_set_get_delete() {
        let redis = client("test:twiq:client:");
        redis.set_json("k", r#"{"a":1}"#).await.unwrap();
        assert_eq!(redis.get_json("k").await.unwrap().as_deref(), Some(r#"{"a":1}"#));
        redis.delete("k").await.unwrap();
        assert!(redis.get_json("k").await.unwrap().is_none());
    }
}
