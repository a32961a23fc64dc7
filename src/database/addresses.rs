use super::Database;
use crate::models::now_nanos;
use crate::models::Address;
use crate::Result;

const ADDRESS_COLUMNS: &str =
    "id, user_id, address, address_type, city, state, postal_code, phone, time_of_creation";

impl Database {
    pub async fn add_address(&self, address: &Address) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO address (user_id, address, address_type, city, state, postal_code, phone, time_of_creation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(address.user_id)
        .bind(&address.address)
        .bind(&address.address_type)
        .bind(&address.city)
        .bind(&address.state)
        .bind(address.postal_code)
        .bind(&address.phone)
        .bind(now_nanos())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Overwrite the editable fields of an address; ownership is checked by the caller
    pub async fn edit_address(&self, address: &Address) -> Result<()> {
        sqlx::query(
            r"
            UPDATE address
            SET address = $2, address_type = $3, city = $4, state = $5, postal_code = $6, phone = $7
            WHERE id = $1
            ",
        )
        .bind(address.id)
        .bind(&address.address)
        .bind(&address.address_type)
        .bind(&address.city)
        .bind(&address.state)
        .bind(address.postal_code)
        .bind(&address.phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_address(&self, id: i32) -> Result<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    pub async fn get_addresses(&self, user_id: i32) -> Result<Vec<Address>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support;
    use super::*;

    #[tokio::test]
    #[ignore = "Requires PostgreSQL instance"]
    async fn test_add_then_edit() {
        let db = test_support::database().await;
        let user_id = test_support::unique_user_id();
        let mut address = Address {
            user_id,
            address: "12 MG Road".into(),
            address_type: "Home".into(),
            city: "Bengaluru".into(),
            state: "KA".into(),
            postal_code: 560_001,
            phone: "9000000000".into(),
            ..Address::default()
        };
        address.id = db.add_address(&address).await.unwrap();

        address.address_type = "Work".into();
        db.edit_address(&address).await.unwrap();

        let stored = db.get_address(address.id).await.unwrap().unwrap();
        assert_eq!(stored.address_type, "Work");
        assert_eq!(stored.user_id, user_id);
        assert_eq!(db.get_addresses(user_id).await.unwrap().len(), 1);
    }
}
