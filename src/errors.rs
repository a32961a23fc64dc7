use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwiqError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Malformed or missing request input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Stock could not be reserved
    #[error("{0}")]
    OutOfStock(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Custom error: {0}")]
    Custom(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TwiqError {
    /// True when the error means "the row/document does not exist"
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Database(sqlx::Error::RowNotFound)
        )
    }
}

impl From<&str> for TwiqError {
    fn from(msg: &str) -> Self {
        Self::Custom(msg.to_string())
    }
}

impl From<String> for TwiqError {
    fn from(msg: String) -> Self {
        Self::Custom(msg)
    }
}

pub type Result<T> = std::result::Result<T, TwiqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = TwiqError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Database error: "));
    }

    #[test]
    fn test_domain_messages_are_verbatim() {
        let err = TwiqError::OutOfStock("Product Out Of Stock".into());
        assert_eq!(err.to_string(), "Product Out Of Stock");
        assert!(!err.is_not_found());
    }
}
