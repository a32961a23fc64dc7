use super::Database;
use crate::models::now_nanos;
use crate::models::Shipping;
use crate::models::UNINITIATED;
use crate::Result;
use crate::TwiqError;

impl Database {
    /// Open a shipment for an order and point the order at it
    ///
    /// The tracking id is generated here; both rows change in one transaction.
    pub async fn place_order(&self, shipping: &Shipping) -> Result<i32> {
        let tracking_id = uuid::Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO shipping (order_id, user_id, tracking_id, address_id, shipping_status, time_of_creation)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(shipping.order_id)
        .bind(shipping.user_id)
        .bind(&tracking_id)
        .bind(shipping.address_id)
        .bind(UNINITIATED)
        .bind(now_nanos())
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE orders SET shipping_id = $2, shipping_status = $3 WHERE id = $1",
        )
        .bind(shipping.order_id)
        .bind(id)
        .bind(UNINITIATED)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(TwiqError::NotFound(format!(
                "Order {} not found",
                shipping.order_id
            )));
        }

        tx.commit().await?;
        tracing::debug!("Shipping {} opened for order {}", id, shipping.order_id);
        Ok(id)
    }

    pub async fn get_shipping(&self, id: i32) -> Result<Option<Shipping>> {
        let shipping = sqlx::query_as::<_, Shipping>(
            "SELECT id, order_id, user_id, tracking_id, address_id, shipping_status, time_of_creation
             FROM shipping WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(shipping)
    }
}
