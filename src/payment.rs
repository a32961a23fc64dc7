//! PayU payment initiation
//!
//! Initiating a payment reserves one unit of product stock in the document
//! store and one unit of sale stock in the relational store. The sale side
//! runs in a database transaction together with the transaction row; if it
//! fails the product unit is handed back.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha512;
use tracing::error;
use tracing::info;

use crate::config::PaymentConfig;
use crate::database::Database;
use crate::models::HashResponse;
use crate::models::Transaction;
use crate::Result;
use crate::TwiqError;

/// Product stock held in the document store
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn in_stock(&self, product_id: &str) -> Result<bool>;
    async fn decrement(&self, product_id: &str) -> Result<()>;
    async fn increment(&self, product_id: &str) -> Result<()>;
}

/// Sale stock and transaction records in the relational store
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Take one unit of sale stock and record `tran`; returns the transaction id
    async fn initiate(&self, tran: &Transaction, sale_id: i32) -> Result<i32>;
}

/// `key|txnid|amount|productinfo|firstname|email|||||||||||salt`
#[must_use]
pub fn hash_sequence(
    key: &str,
    txn_id: i32,
    amount: i32,
    product_info: &str,
    first_name: &str,
    email: &str,
    salt: &str,
) -> String {
    format!("{key}|{txn_id}|{amount}|{product_info}|{first_name}|{email}|||||||||||{salt}")
}

/// Lowercase hex SHA-512 of a hash sequence
#[must_use]
pub fn payu_hash(sequence: &str) -> String {
    hex::encode(Sha512::digest(sequence.as_bytes()))
}

/// Reserve product then sale stock, handing the product unit back if the sale side fails
///
/// # Errors
/// - `OutOfStock("Product out of stock")` when the product has no units
/// - Whatever the inventory or ledger return; the ledger error wins over a
///   failed compensation, which is only logged
pub async fn reserve(
    inventory: &dyn Inventory,
    ledger: &dyn TransactionLedger,
    product_id: &str,
    tran: &Transaction,
    sale_id: i32,
) -> Result<i32> {
    if !inventory.in_stock(product_id).await? {
        return Err(TwiqError::OutOfStock("Product out of stock".to_string()));
    }
    inventory.decrement(product_id).await?;

    match ledger.initiate(tran, sale_id).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Err(undo) = inventory.increment(product_id).await {
                error!(
                    "Failed to return stock for product {} after failed transaction: {}",
                    product_id, undo
                );
            }
            Err(e)
        }
    }
}

#[derive(Clone)]
pub struct PaymentService {
    database: Database,
    inventory: Arc<dyn Inventory>,
    ledger: Arc<dyn TransactionLedger>,
    config: PaymentConfig,
}

impl PaymentService {
    pub fn new(
        database: Database,
        inventory: Arc<dyn Inventory>,
        ledger: Arc<dyn TransactionLedger>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            database,
            inventory,
            ledger,
            config,
        }
    }

    /// Reserve stock for an order and build the signed PayU request
    ///
    /// # Errors
    /// - `NotFound("OrderId not found")`, or `NotFound` for a missing user or address
    /// - `OutOfStock` from either store
    /// - Database and Redis errors
    pub async fn initiate(&self, order_id: i32, user_id: i32) -> Result<HashResponse> {
        let order = self
            .database
            .get_order(order_id)
            .await?
            .ok_or_else(|| TwiqError::NotFound("OrderId not found".to_string()))?;
        let user = self
            .database
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| TwiqError::NotFound("User not found".to_string()))?;
        let address = self
            .database
            .get_address(order.address_id)
            .await?
            .ok_or_else(|| TwiqError::NotFound("Address not found".to_string()))?;

        let mut response = HashResponse {
            amount: order.amount,
            product_info: order.product_title.clone(),
            first_name: user.first_name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            key: self.config.payu_key.clone(),
            phone: address.phone.parse().unwrap_or(0),
            surl: self.config.success_url.clone(),
            furl: self.config.failure_url.clone(),
            ..HashResponse::default()
        };

        let tran = Transaction::placeholder(order_id);
        response.txn_id = reserve(
            self.inventory.as_ref(),
            self.ledger.as_ref(),
            &order.product_id,
            &tran,
            order.sale_id,
        )
        .await?;

        response.hash = payu_hash(&hash_sequence(
            &response.key,
            response.txn_id,
            response.amount,
            &response.product_info,
            &response.first_name,
            &response.email,
            &self.config.payu_salt,
        ));

        info!("💳 Payment initiated: order {} txn {}", order_id, response.txn_id);
        Ok(response)
    }

    /// Record a confirmed payment
    pub async fn complete(&self, tran: &Transaction) -> Result<()> {
        self.database.update_success_transaction(tran).await
    }
}
