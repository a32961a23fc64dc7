use super::Database;
use crate::models::now_nanos;
use crate::models::FeedbackType;
use crate::Result;

impl Database {
    pub async fn add_feedback(
        &self,
        user_id: i32,
        feedback_type: FeedbackType,
        description: &str,
    ) -> Result<i32> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO feedback (user_id, feedback_type, description, time_of_creation)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(user_id)
        .bind(feedback_type.as_str())
        .bind(description)
        .bind(now_nanos())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}
