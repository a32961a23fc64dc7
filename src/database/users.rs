use super::Database;
use crate::models::now_nanos;
use crate::models::Role;
use crate::models::User;
use crate::Result;
use crate::TwiqError;

const USER_COLUMNS: &str = "id, email, password, gender, first_name, last_name, phone, \
     time_of_creation, verified, code, token, reset_password_token";

impl Database {
    pub async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a signup placeholder holding the OTP; returns the new user id
    ///
    /// # Errors
    /// Fails with a database error if the phone number is already registered.
    pub async fn create_unverified_user(&self, phone: &str, code: &str) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO users (phone, code, verified, time_of_creation)
             VALUES ($1, $2, 0, $3)
             RETURNING id",
        )
        .bind(phone)
        .bind(code)
        .bind(now_nanos())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Complete signup: set name and password hash, mark verified, grant the User role
    ///
    /// # Errors
    /// - `NotFound` if no user has this phone
    /// - Database errors; nothing is written when any statement fails
    pub async fn verify_user(
        &self,
        phone: &str,
        first_name: &str,
        password_hash: &str,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET first_name = $2, password = $3, verified = 1
             WHERE phone = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(phone)
        .bind(first_name)
        .bind(password_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| TwiqError::NotFound("User not found".to_string()))?;

        sqlx::query(
            "INSERT INTO user_role (user_id, role_id) VALUES ($1, $2)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user.id)
        .bind(Role::User.id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Role of a user; users without a row are treated as plain users
    pub async fn get_user_role(&self, user_id: i32) -> Result<Role> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT role_id FROM user_role WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some((role_id,)) => Role::from_id(role_id)
                .ok_or_else(|| TwiqError::Custom(format!("Unknown role id {role_id}"))),
            None => Ok(Role::User),
        }
    }

    /// Grant a role, replacing any existing one
    pub async fn set_user_role(&self, user_id: i32, role: Role) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_role (user_id, role_id) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET role_id = EXCLUDED.role_id",
        )
        .bind(user_id)
        .bind(role.id())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        first_name: &str,
        last_name: &str,
        gender: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET first_name = $2, last_name = $3, gender = $4 WHERE id = $1")
            .bind(user_id)
            .bind(first_name)
            .bind(last_name)
            .bind(gender)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(&self, phone: &str, token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET reset_password_token = $2 WHERE phone = $1")
            .bind(phone)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store a new password hash and clear the reset token
    pub async fn reset_password(&self, phone: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password = $2, reset_password_token = '' WHERE phone = $1")
            .bind(phone)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store the device's push registration token
    pub async fn update_push_token(&self, user_id: i32, token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_signup_flow_grants_user_role() {
        let db = test_support::database().await;
        let phone = test_support::unique_phone();

        let id = db.create_unverified_user(&phone, "4321").await.unwrap();
        let pending = db.get_user_by_phone(&phone).await.unwrap().unwrap();
        assert_eq!(pending.id, id);
        assert!(!pending.is_verified());
        assert_eq!(pending.code.as_deref(), Some("4321"));

        let user = db.verify_user(&phone, "Asha", "$pbkdf2$hash").await.unwrap();
        assert!(user.is_verified());
        assert_eq!(user.first_name.as_deref(), Some("Asha"));
        assert_eq!(db.get_user_role(id).await.unwrap(), Role::User);

        assert!(db.create_unverified_user(&phone, "1111").await.is_err());
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_reset_password_clears_token() {
        let db = test_support::database().await;
        let phone = test_support::unique_phone();
        db.create_unverified_user(&phone, "1000").await.unwrap();

        db.set_reset_token(&phone, "5555").await.unwrap();
        db.reset_password(&phone, "newhash").await.unwrap();

        let user = db.get_user_by_phone(&phone).await.unwrap().unwrap();
        assert_eq!(user.password.as_deref(), Some("newhash"));
        assert_eq!(user.reset_password_token.as_deref(), Some(""));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_set_user_role_replaces_role() {
        let db = test_support::database().await;
        let phone = test_support::unique_phone();
        let id = db.create_unverified_user(&phone, "2468").await.unwrap();
        db.verify_user(&phone, "Ravi", "$pbkdf2$hash").await.unwrap();

        db.set_user_role(id, Role::Writer).await.unwrap();
        assert_eq!(db.get_user_role(id).await.unwrap(), Role::Writer);
        db.set_user_role(id, Role::Admin).await.unwrap();
        assert_eq!(db.get_user_role(id).await.unwrap(), Role::Admin);
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_verify_unknown_phone() {
        let db = test_support::database().await;
        let err = db.verify_user("7999999999", "x", "y").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
