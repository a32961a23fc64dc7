//! Products keep their stock count in a sidecar integer key so it can be
//! changed atomically without rewriting the JSON document.

use async_trait::async_trait;
use lazy_static::lazy_static;
use tracing::debug;

use super::DocStore;
use super::PRODUCTS;
use crate::ids::ObjectId;
use crate::models::now_nanos;
use crate::models::Product;
use crate::payment::Inventory;
use crate::Result;
use crate::TwiqError;

/// Script result when the stock key is missing
const MISSING: i64 = -2;
/// Script result when there is nothing left to take
const EMPTY: i64 = -1;

lazy_static! {
    static ref DECREMENT_STOCK: redis::Script = redis::Script::new(
        r"
local q = redis.call('GET', KEYS[1])
if not q then return -2 end
if tonumber(q) < 1 then return -1 end
return redis.call('DECR', KEYS[1])
"
    );
    static ref INCREMENT_STOCK: redis::Script = redis::Script::new(
        r"
if redis.call('EXISTS', KEYS[1]) == 0 then return -2 end
return redis.call('INCR', KEYS[1])
"
    );
}

fn stock_key(id: &str) -> String {
    format!("stock:{PRODUCTS}:{id}")
}

fn parse_product_id(raw: &str) -> Result<String> {
    Ok(ObjectId::parse_labeled(raw, "productId")?.to_hex())
}

fn not_found(id: &str) -> TwiqError {
    TwiqError::NotFound(format!("Product {id} not found"))
}

impl DocStore {
    pub async fn add_product(&self, product: &Product) -> Result<String> {
        let id = ObjectId::new().to_hex();
        let doc = Product {
            id: id.clone(),
            time_of_creation: now_nanos(),
            ..product.clone()
        };
        // Stock first so a listed product always has a counter
        self.redis
            .set_json(&stock_key(&id), &doc.quantity.to_string())
            .await?;
        self.insert(PRODUCTS, &id, &doc).await?;
        debug!("Product {} written with {} units", id, doc.quantity);
        Ok(id)
    }

    /// Product document with its live stock count
    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        let id = parse_product_id(product_id)?;
        let mut product: Product = self.find(PRODUCTS, &id).await?.ok_or_else(|| not_found(&id))?;
        if let Some(quantity) = self.stock(&id).await? {
            product.quantity = quantity;
        }
        Ok(product)
    }

    async fn stock(&self, id: &str) -> Result<Option<i32>> {
        match self.redis.get_json(&stock_key(id)).await? {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| TwiqError::Redis(format!("Corrupt stock counter for {id}"))),
            None => Ok(None),
        }
    }

    pub async fn is_product_in_stock(&self, product_id: &str) -> Result<bool> {
        let id = parse_product_id(product_id)?;
        let quantity = self.stock(&id).await?.ok_or_else(|| not_found(&id))?;
        Ok(quantity > 0)
    }

    pub async fn decrement_stock(&self, product_id: &str) -> Result<()> {
        let id = parse_product_id(product_id)?;
        match self
            .redis
            .eval_i64(&DECREMENT_STOCK, &[&stock_key(&id)], &[])
            .await?
        {
            MISSING => Err(not_found(&id)),
            EMPTY => Err(TwiqError::OutOfStock(
                "Cannot decrement out of stock product".to_string(),
            )),
            left => {
                debug!("Product {} stock now {}", id, left);
                Ok(())
            }
        }
    }

    pub async fn increment_stock(&self, product_id: &str) -> Result<()> {
        let id = parse_product_id(product_id)?;
        match self
            .redis
            .eval_i64(&INCREMENT_STOCK, &[&stock_key(&id)], &[])
            .await?
        {
            MISSING => Err(not_found(&id)),
            left => {
                debug!("Product {} stock now {}", id, left);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Inventory for DocStore {
    async fn in_stock(&self, product_id: &str) -> Result<bool> {
        self.is_product_in_stock(product_id).await
    }

    async fn decrement(&self, product_id: &str) -> Result<()> {
        self.decrement_stock(product_id).await
    }

    async fn increment(&self, product_id: &str) -> Result<()> {
        self.increment_stock(product_id).await
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
            namespace: "test:twiq:products:".to_string(),
            default_ttl_secs: 60,
        };
        DocStore::new(Arc::new(RedisClient::connect(&config).unwrap()))
    }

    #[tokio::test]
    async fn test_invalid_product_id() {
        let err = store().decrement_stock("123").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid productId");
    }

    #[tokio::test]
    #[ignore = "Requires Redis instance"]
    async fn test_stock_never_goes_negative() {
        let store = store();
        let id = store
            .add_product(&Product {
                title: "Mug".into(),
                quantity: 1,
                unit_price: 250,
                ..Product::default()
            })
            .await
            .unwrap();

        assert!(store.is_product_in_stock(&id).await.unwrap());
        store.decrement_stock(&id).await.unwrap();
        assert!(!store.is_product_in_stock(&id).await.unwrap());

        let err = store.decrement_stock(&id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot decrement out of stock product");
        assert_eq!(store.get_product(&id).await.unwrap().quantity, 0);

        store.increment_stock(&id).await.unwrap();
        assert_eq!(store.get_product(&id).await.unwrap().quantity, 1);
    }
}
