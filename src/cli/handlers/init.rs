//! Database initialization

use tracing::info;

use crate::AppConfig;
use crate::Database;
use crate::Result;

pub async fn handle_init_command(config: &AppConfig) -> Result<()> {
    println!("🔧 Initializing Twiq database");
    println!("=============================\n");

    let database = Database::from_config(config).await?;
    database.init_schema().await?;

    info!("Database initialized");
    println!("✅ Tables, indexes, roles and the default mascot are in place");
    Ok(())
}
