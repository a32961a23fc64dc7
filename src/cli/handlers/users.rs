//! User administration

use tracing::info;

use crate::models::Role;
use crate::validate;
use crate::AppConfig;
use crate::Database;
use crate::Result;
use crate::TwiqError;

pub async fn handle_grant_role_command(config: &AppConfig, phone: &str, role: Role) -> Result<()> {
    let phone = validate::phone(phone)?;
    let database = Database::from_config(config).await?;

    let user = database
        .get_user_by_phone(&phone)
        .await?
        .ok_or_else(|| TwiqError::NotFound(format!("No User Exists for {phone}")))?;
    if !user.is_verified() {
        return Err(TwiqError::Validation(format!(
            "User {phone} has not completed signup"
        )));
    }

    database.set_user_role(user.id, role).await?;
    info!("User {} granted role {}", user.id, role.name());
    println!("✅ {phone} is now {}", role.name());
    Ok(())
}
