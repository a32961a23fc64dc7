use tracing::debug;
use tracing::info;

use super::Database;
use crate::models::Role;
use crate::models::DEFAULT_MASCOT_DESCRIPTION;
use crate::models::DEFAULT_MASCOT_ID;
use crate::models::DEFAULT_MASCOT_NAME;
use crate::Result;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            email VARCHAR(100),
            password VARCHAR(200),
            gender VARCHAR(6),
            first_name VARCHAR(100),
            last_name VARCHAR(100),
            phone VARCHAR(12) NOT NULL UNIQUE,
            time_of_creation BIGINT NOT NULL DEFAULT 0,
            verified INT NOT NULL DEFAULT 0,
            code VARCHAR(400),
            token VARCHAR(400),
            reset_password_token VARCHAR(400)
        )
        ",
    ),
    (
        "roles",
        r"
        CREATE TABLE IF NOT EXISTS roles (
            id INT PRIMARY KEY,
            name VARCHAR(50) NOT NULL
        )
        ",
    ),
    (
        "user_role",
        r"
        CREATE TABLE IF NOT EXISTS user_role (
            id SERIAL PRIMARY KEY,
            user_id INT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            role_id INT NOT NULL REFERENCES roles(id),
            UNIQUE (user_id)
        )
        ",
    ),
    (
        "mascot",
        r"
        CREATE TABLE IF NOT EXISTS mascot (
            id INT PRIMARY KEY,
            name VARCHAR(50),
            description VARCHAR(255)
        )
        ",
    ),
    (
        "post_queue",
        r"
        CREATE TABLE IF NOT EXISTS post_queue (
            time_of_creation BIGINT NOT NULL,
            post_id VARCHAR(255) NOT NULL,
            mascot_id INT NOT NULL REFERENCES mascot(id),
            PRIMARY KEY (mascot_id, post_id)
        )
        ",
    ),
    (
        "sale",
        r"
        CREATE TABLE IF NOT EXISTS sale (
            id SERIAL PRIMARY KEY,
            title VARCHAR(500) NOT NULL DEFAULT '',
            brand VARCHAR(200) NOT NULL DEFAULT '',
            product_sku VARCHAR(50) NOT NULL DEFAULT '',
            description VARCHAR(500) NOT NULL DEFAULT '',
            thumb_nail VARCHAR(500) NOT NULL DEFAULT '',
            stock_units INT NOT NULL DEFAULT 0,
            sale_start_time BIGINT NOT NULL DEFAULT 0,
            sale_end_time BIGINT NOT NULL DEFAULT 0,
            time_of_creation BIGINT NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "orders",
        r"
        CREATE TABLE IF NOT EXISTS orders (
            id SERIAL PRIMARY KEY,
            product_id VARCHAR(400) NOT NULL,
            product_title VARCHAR(400) NOT NULL DEFAULT '',
            product_thumb VARCHAR(400) NOT NULL DEFAULT '',
            user_id INT NOT NULL,
            order_date BIGINT NOT NULL DEFAULT 0,
            price INT NOT NULL DEFAULT 0,
            tax INT NOT NULL DEFAULT 0,
            shipping_cost INT NOT NULL DEFAULT 0,
            amount INT NOT NULL DEFAULT 0,
            trans_id INT NOT NULL DEFAULT -1,
            trans_status VARCHAR(400) NOT NULL DEFAULT 'Uninitiated',
            sale_id INT NOT NULL DEFAULT 0,
            address_id INT NOT NULL DEFAULT 0,
            shipping_id INT NOT NULL DEFAULT -1,
            shipping_status VARCHAR(400) NOT NULL DEFAULT 'Uninitiated',
            tracking_id VARCHAR(40) NOT NULL DEFAULT 'Uninitiated',
            time_of_creation BIGINT NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "address",
        r"
        CREATE TABLE IF NOT EXISTS address (
            id SERIAL PRIMARY KEY,
            user_id INT NOT NULL,
            address VARCHAR(1000) NOT NULL DEFAULT '',
            address_type VARCHAR(200) NOT NULL DEFAULT '',
            city VARCHAR(400) NOT NULL DEFAULT '',
            state VARCHAR(400) NOT NULL DEFAULT '',
            postal_code INT NOT NULL DEFAULT 0,
            phone VARCHAR(12) NOT NULL DEFAULT '',
            time_of_creation BIGINT NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "transactions",
        r"
        CREATE TABLE IF NOT EXISTS transactions (
            id SERIAL PRIMARY KEY,
            amount INT NOT NULL DEFAULT 0,
            order_id INT NOT NULL,
            phone BIGINT NOT NULL DEFAULT 0,
            time_of_creation BIGINT NOT NULL DEFAULT 0,
            product_info VARCHAR(500) NOT NULL DEFAULT '',
            email VARCHAR(100) NOT NULL DEFAULT '',
            payment_method VARCHAR(100) NOT NULL DEFAULT '',
            payment_id VARCHAR(100) NOT NULL DEFAULT '',
            payment_status VARCHAR(100) NOT NULL DEFAULT '',
            first_name VARCHAR(100) NOT NULL DEFAULT '',
            hash VARCHAR(500) NOT NULL DEFAULT ''
        )
        ",
    ),
    (
        "shipping",
        r"
        CREATE TABLE IF NOT EXISTS shipping (
            id SERIAL PRIMARY KEY,
            order_id INT NOT NULL,
            user_id INT NOT NULL,
            tracking_id VARCHAR(100) NOT NULL,
            address_id INT NOT NULL,
            shipping_status VARCHAR(200) NOT NULL,
            time_of_creation BIGINT NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "feedback",
        r"
        CREATE TABLE IF NOT EXISTS feedback (
            id SERIAL PRIMARY KEY,
            user_id INT NOT NULL,
            feedback_type VARCHAR(100) NOT NULL,
            description VARCHAR(2000) NOT NULL,
            time_of_creation BIGINT NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "url_cache",
        r"
        CREATE TABLE IF NOT EXISTS url_cache (
            id SERIAL PRIMARY KEY,
            url VARCHAR(1000) NOT NULL
        )
        ",
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_post_queue_mascot_time ON post_queue (mascot_id, time_of_creation)",
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_address_user ON address (user_id)",
];

impl Database {
    /// Create every table and index if missing, then seed roles and the default mascot
    ///
    /// Safe to run repeatedly.
    ///
    /// # Errors
    /// - Database connection errors
    /// - DDL failures (permissions, conflicting existing definitions)
    pub async fn init_schema(&self) -> Result<()> {
        for (name, ddl) in TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
            debug!("Table {} ready", name);
        }
        for ddl in INDEXES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        for role in Role::ALL {
            sqlx::query(
                "INSERT INTO roles (id, name) VALUES ($1, $2)
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            )
            .bind(role.id())
            .bind(role.name())
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            "INSERT INTO mascot (id, name, description) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(DEFAULT_MASCOT_ID)
        .bind(DEFAULT_MASCOT_NAME)
        .bind(DEFAULT_MASCOT_DESCRIPTION)
        .execute(&self.pool)
        .await?;

        info!("✅ Schema initialized ({} tables)", TABLES.len());
        Ok(())
    }
}
