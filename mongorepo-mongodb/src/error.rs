//! Error types for repository operations.

use thiserror::Error;

/// Result type for repository operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors that can occur while connecting to MongoDB or running repository operations.
#[derive(Error, Debug)]
pub enum MongoError {
    /// MongoDB driver error, propagated verbatim.
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// BSON serialization error.
    #[error("bson error: {0}")]
    Bson(#[from] bson::ser::Error),

    /// BSON deserialization error.
    #[error("bson deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),

    /// Configuration error, detected before any I/O.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingEnv(String),

    /// Connection error, prefixed with the stage that failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// No document matched where one was required.
    #[error("document not found: {0}")]
    NotFound(String),

    /// An identity value could not be interpreted as an ObjectId.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    /// Timeout error.
    #[error("operation timed out after {0}ms")]
    Timeout(u64),
}

impl MongoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a missing environment variable error.
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnv(name.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an invalid object id error.
    pub fn invalid_object_id(message: impl Into<String>) -> Self {
        Self::InvalidObjectId(message.into())
    }

    /// Check if this is a configuration error (including a missing environment variable).
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingEnv(_))
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error came from decoding a document.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::BsonDe(_))
    }
}

impl From<bson::oid::Error> for MongoError {
    fn from(err: bson::oid::Error) -> Self {
        MongoError::InvalidObjectId(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MongoError::config("empty connection string");
        assert!(err.is_config_error());

        let err = MongoError::missing_env("MONGODB_DATABASE");
        assert!(err.is_config_error());

        let err = MongoError::connection("failed to verify connectivity: refused");
        assert!(err.is_connection_error());

        let err = MongoError::Timeout(25_000);
        assert!(err.is_timeout());

        let err = MongoError::not_found("users");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = MongoError::config("database name is required");
        assert_eq!(
            err.to_string(),
            "invalid configuration: database name is required"
        );

        let err = MongoError::missing_env("MONGODB_CONNECTIONSTRING");
        assert_eq!(
            err.to_string(),
            "missing environment variable MONGODB_CONNECTIONSTRING"
        );

        let err = MongoError::NotFound("users".to_string());
        assert_eq!(err.to_string(), "document not found: users");
    }

    #[test]
    fn test_from_oid_error() {
        let oid_err = bson::oid::ObjectId::parse_str("not-hex").unwrap_err();
        let err: MongoError = oid_err.into();
        assert!(matches!(err, MongoError::InvalidObjectId(_)));
    }
}
