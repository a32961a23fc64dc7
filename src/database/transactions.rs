use async_trait::async_trait;

use super::sales::out_of_stock;
use super::Database;
use crate::models::now_nanos;
use crate::models::Transaction;
use crate::models::UNINITIATED_ID;
use crate::payment::TransactionLedger;
use crate::Result;
use crate::TwiqError;

impl Database {
    /// Placeholder transaction not yet tied to an order
    #[must_use]
    pub fn default_transaction() -> Transaction {
        Transaction::placeholder(UNINITIATED_ID)
    }

    /// Take one unit of sale stock and record the transaction, atomically
    ///
    /// # Errors
    /// - `OutOfStock` when the sale has no units left
    /// - `NotFound` when the sale does not exist
    /// - Database errors; the stock change is rolled back with the transaction
    pub async fn initiate_transaction(&self, tran: &Transaction, sale_id: i32) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let taken: Option<(i32,)> = sqlx::query_as(
            "UPDATE sale SET stock_units = stock_units - 1
             WHERE id = $1 AND stock_units >= 1
             RETURNING stock_units",
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?;

        if taken.is_none() {
            let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM sale WHERE id = $1")
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => out_of_stock(),
                None => TwiqError::NotFound(format!("Sale {sale_id} not found")),
            });
        }

        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO transactions (amount, order_id, phone, time_of_creation, product_info, email,
                                      payment_method, payment_id, payment_status, first_name, hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(tran.amount)
        .bind(tran.order_id)
        .bind(tran.phone)
        .bind(now_nanos())
        .bind(&tran.product_info)
        .bind(&tran.email)
        .bind(&tran.payment_method)
        .bind(&tran.payment_id)
        .bind(&tran.payment_status)
        .bind(&tran.first_name)
        .bind(&tran.hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Record a gateway-confirmed payment on the transaction and its order
    pub async fn update_success_transaction(&self, tran: &Transaction) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE transactions
            SET amount = $2, phone = $3, product_info = $4, email = $5, payment_method = $6,
                payment_id = $7, payment_status = $8, first_name = $9, hash = $10
            WHERE id = $1
            ",
        )
        .bind(tran.id)
        .bind(tran.amount)
        .bind(tran.phone)
        .bind(&tran.product_info)
        .bind(&tran.email)
        .bind(&tran.payment_method)
        .bind(&tran.payment_id)
        .bind(&tran.payment_status)
        .bind(&tran.first_name)
        .bind(&tran.hash)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(TwiqError::NotFound(format!("Transaction {} not found", tran.id)));
        }

        sqlx::query("UPDATE orders SET trans_id = $2, trans_status = $3 WHERE id = $1")
            .bind(tran.order_id)
            .bind(tran.id)
            .bind(&tran.payment_status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_transaction(&self, id: i32) -> Result<Option<Transaction>> {
        let tran = sqlx::query_as::<_, Transaction>(
            r"
            SELECT id, amount, order_id, phone, time_of_creation, product_info, email,
                   payment_method, payment_id, payment_status, first_name, hash
            FROM transactions WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tran)
    }
}

#[async_trait]
impl TransactionLedger for Database {
    async fn initiate(&self, tran: &Transaction, sale_id: i32) -> Result<i32> {
        self.initiate_transaction(tran, sale_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;
    use crate::models::Order;
    use crate::models::Sale;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_initiate_and_complete() {
        let db = test_support::database().await;
        let sale_id = db
            .add_sale(&Sale {
                stock_units: 1,
                ..Sale::default()
            })
            .await
            .unwrap();
        let order_id = db
            .create_order(&Order {
                product_id: "5a1b2c3d4e5f60718293a4b5".into(),
                sale_id,
                ..Order::default()
            })
            .await
            .unwrap();

        let mut tran = Transaction::placeholder(order_id);
        let id = db.initiate_transaction(&tran, sale_id).await.unwrap();
        assert_eq!(db.get_sale(sale_id).await.unwrap().unwrap().stock_units, 0);

        // Second attempt finds no stock and writes nothing
        let err = db.initiate_transaction(&tran, sale_id).await.unwrap_err();
        assert!(matches!(err, TwiqError::OutOfStock(_)));

        tran.id = id;
        tran.payment_status = "success".into();
        db.update_success_transaction(&tran).await.unwrap();
        let order = db.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(order.trans_id, id);
        assert_eq!(order.trans_status, "success");
    }
}
