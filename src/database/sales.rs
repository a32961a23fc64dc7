use super::Database;
use crate::models::now_nanos;
use crate::models::Sale;
use crate::models::StatusResponse;
use crate::Result;
use crate::TwiqError;

const SALE_COLUMNS: &str = "id, title, brand, product_sku, description, thumb_nail, stock_units, \
     sale_start_time, sale_end_time, time_of_creation";

pub(super) fn out_of_stock() -> TwiqError {
    TwiqError::OutOfStock("Product Out Of Stock".to_string())
}

impl Database {
    /// Insert a sale and return its id
    pub async fn add_sale(&self, sale: &Sale) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO sale (title, brand, product_sku, description, thumb_nail,
                              stock_units, sale_start_time, sale_end_time, time_of_creation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(&sale.title)
        .bind(&sale.brand)
        .bind(&sale.product_sku)
        .bind(&sale.description)
        .bind(&sale.thumb_nail)
        .bind(sale.stock_units)
        .bind(sale.sale_start_time)
        .bind(sale.sale_end_time)
        .bind(now_nanos())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_sale(&self, id: i32) -> Result<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("SELECT {SALE_COLUMNS} FROM sale WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    pub async fn get_sales(&self) -> Result<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sale ORDER BY sale_start_time DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(sales)
    }

    /// Add `delta` to the sale's stock while at least one unit is left
    ///
    /// Returns the new stock count.
    ///
    /// # Errors
    /// - `OutOfStock("Product Out Of Stock")` when the stock is below one
    /// - `NotFound` when the sale does not exist
    pub async fn update_sale_stock(&self, id: i32, delta: i32) -> Result<i32> {
        let updated: Option<(i32,)> = sqlx::query_as(
            "UPDATE sale SET stock_units = stock_units + $2
             WHERE id = $1 AND stock_units >= 1
             RETURNING stock_units",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((stock,)) = updated {
            return Ok(stock);
        }
        match self.get_sale(id).await? {
            Some(_) => Err(out_of_stock()),
            None => Err(TwiqError::NotFound(format!("Sale {id} not found"))),
        }
    }

    /// Time left until the sale opens and the stock remaining
    pub async fn sale_status(&self, id: i32) -> Result<Option<StatusResponse>> {
        let row: Option<(i64, i32)> =
            sqlx::query_as("SELECT sale_start_time, stock_units FROM sale WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(start, stock_left)| StatusResponse {
            time_to_start: start.saturating_sub(now_nanos()),
            stock_left,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    fn flash_sale(stock_units: i32) -> Sale {
        Sale {
            title: "Flash".into(),
            brand: "Twiq".into(),
            product_sku: "SKU-1".into(),
            stock_units,
            sale_start_time: now_nanos() + 60_000_000_000,
            sale_end_time: now_nanos() + 120_000_000_000,
            ..Sale::default()
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_stock_stops_at_zero() {
        let db = test_support::database().await;
        let id = db.add_sale(&flash_sale(1)).await.unwrap();

        assert_eq!(db.update_sale_stock(id, -1).await.unwrap(), 0);
        let err = db.update_sale_stock(id, -1).await.unwrap_err();
        assert_eq!(err.to_string(), "Product Out Of Stock");
        assert!(db.update_sale_stock(-42, -1).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_status_counts_down() {
        let db = test_support::database().await;
        let id = db.add_sale(&flash_sale(7)).await.unwrap();
        let status = db.sale_status(id).await.unwrap().unwrap();
        assert_eq!(status.stock_left, 7);
        assert!(status.time_to_start > 0);
        assert!(db.sale_status(-1).await.unwrap().is_none());
    }
}
