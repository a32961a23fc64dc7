use super::Database;
use crate::models::now_nanos;
use crate::models::Order;
use crate::models::UNINITIATED;
use crate::models::UNINITIATED_ID;
use crate::Result;

pub(super) const ORDER_COLUMNS: &str = "id, product_id, product_title, product_thumb, user_id, \
     order_date, price, tax, shipping_cost, amount, trans_id, trans_status, sale_id, address_id, \
     shipping_id, shipping_status, tracking_id, time_of_creation";

impl Database {
    /// Insert an order with payment and shipping not yet started; returns its id
    pub async fn create_order(&self, order: &Order) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO orders (product_id, product_title, product_thumb, user_id, order_date,
                                price, tax, shipping_cost, amount, trans_id, trans_status,
                                sale_id, address_id, shipping_id, shipping_status, tracking_id,
                                time_of_creation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            ",
        )
        .bind(&order.product_id)
        .bind(&order.product_title)
        .bind(&order.product_thumb)
        .bind(order.user_id)
        .bind(order.order_date)
        .bind(order.price)
        .bind(order.tax)
        .bind(order.shipping_cost)
        .bind(order.amount)
        .bind(UNINITIATED_ID)
        .bind(UNINITIATED)
        .bind(order.sale_id)
        .bind(order.address_id)
        .bind(UNINITIATED_ID)
        .bind(UNINITIATED)
        .bind(UNINITIATED)
        .bind(now_nanos())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_order(&self, id: i32) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Orders placed by a user, newest first
    pub async fn get_orders(&self, user_id: i32) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY time_of_creation DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_new_order_is_uninitiated() {
        let db = test_support::database().await;
        let order = Order {
            product_id: "5a1b2c3d4e5f60718293a4b5".into(),
            product_title: "Mug".into(),
            user_id: 424_242,
            price: 200,
            tax: 20,
            shipping_cost: 30,
            amount: 250,
            sale_id: 1,
            address_id: 1,
            trans_id: 77,
            ..Order::default()
        };
        let id = db.create_order(&order).await.unwrap();
        let stored = db.get_order(id).await.unwrap().unwrap();
        assert_eq!(stored.trans_id, -1);
        assert_eq!(stored.shipping_id, -1);
        assert_eq!(stored.trans_status, "Uninitiated");
        assert_eq!(stored.tracking_id, "Uninitiated");
        assert_eq!(stored.amount, 250);

        let mine = db.get_orders(424_242).await.unwrap();
        assert!(mine.iter().any(|o| o.id == id));
    }
}
