//! MongoDB connection configuration.

use std::time::Duration;

use mongodb::options::ClientOptions;

use crate::env::{ENV_CONNECTION_STRING, ENV_DATABASE_NAME, EnvSource, StdEnvSource};
use crate::error::{MongoError, MongoResult};

/// Upper bound on the whole connect-and-verify sequence.
pub const DEFAULT_CONNECT_DEADLINE: Duration = Duration::from_secs(25);

/// MongoDB connection configuration.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// MongoDB connection URI.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Application name (shown in server logs).
    pub app_name: Option<String>,
    /// Minimum connection pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum connection pool size.
    pub max_pool_size: Option<u32>,
    /// Maximum idle time for connections.
    pub max_idle_time: Option<Duration>,
    /// Driver-level connection timeout for a single socket.
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout.
    pub server_selection_timeout: Option<Duration>,
    /// Deadline applied around client construction and the liveness probe.
    pub connect_deadline: Duration,
    /// Read preference.
    pub read_preference: Option<ReadPreference>,
    /// Write concern.
    pub write_concern: Option<WriteConcern>,
    /// Retry writes.
    pub retry_writes: Option<bool>,
    /// Retry reads.
    pub retry_reads: Option<bool>,
    /// Direct connection (bypass replica set discovery).
    pub direct_connection: Option<bool>,
}

/// MongoDB read preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPreference {
    /// Read from primary only.
    #[default]
    Primary,
    /// Read from primary preferred, fallback to secondary.
    PrimaryPreferred,
    /// Read from secondary only.
    Secondary,
    /// Read from secondary preferred, fallback to primary.
    SecondaryPreferred,
    /// Read from nearest member.
    Nearest,
}

/// MongoDB write concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteConcern {
    /// Acknowledge writes from the specified number of nodes.
    W(u32),
    /// Acknowledge writes from majority of nodes.
    Majority,
    /// Custom tag set.
    Custom(String),
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: String::new(),
            app_name: Some("mongorepo".to_string()),
            min_pool_size: None,
            max_pool_size: Some(10),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            connect_deadline: DEFAULT_CONNECT_DEADLINE,
            read_preference: Some(ReadPreference::Primary),
            write_concern: None,
            retry_writes: Some(true),
            retry_reads: Some(true),
            direct_connection: Some(true),
        }
    }
}

impl MongoConfig {
    /// Create a new configuration from a MongoDB URI and database name.
    ///
    /// No validation happens here; [`MongoConfig::validate`] runs before connecting.
    pub fn from_uri(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Resolve the connection string and database name from the process environment.
    pub fn from_env() -> MongoResult<Self> {
        Self::from_env_source(&StdEnvSource)
    }

    /// Resolve the connection string and database name from an environment source.
    ///
    /// Reads `MONGODB_CONNECTIONSTRING` and `MONGODB_DATABASE`.
    pub fn from_env_source<S: EnvSource + ?Sized>(env: &S) -> MongoResult<Self> {
        let uri = env.require(ENV_CONNECTION_STRING)?;
        let database = env.require(ENV_DATABASE_NAME)?;
        Ok(Self::from_uri(uri, database))
    }

    /// Create a builder for configuration.
    pub fn builder() -> MongoConfigBuilder {
        MongoConfigBuilder::new()
    }

    /// Reject empty connection parameters.
    pub fn validate(&self) -> MongoResult<()> {
        if self.uri.trim().is_empty() {
            return Err(MongoError::config("connection string must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(MongoError::config("database name must not be empty"));
        }
        if self.connect_deadline.is_zero() {
            return Err(MongoError::config("connect deadline must be non-zero"));
        }
        Ok(())
    }

    /// Convert to MongoDB ClientOptions.
    pub async fn to_client_options(&self) -> MongoResult<ClientOptions> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| MongoError::config(format!("failed to parse URI: {}", e)))?;

        if let Some(ref app_name) = self.app_name {
            options.app_name = Some(app_name.clone());
        }

        if let Some(min_pool) = self.min_pool_size {
            options.min_pool_size = Some(min_pool);
        }

        if let Some(max_pool) = self.max_pool_size {
            options.max_pool_size = Some(max_pool);
        }

        if let Some(max_idle) = self.max_idle_time {
            options.max_idle_time = Some(max_idle);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            options.connect_timeout = Some(connect_timeout);
        }

        if let Some(selection_timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(selection_timeout);
        }

        if let Some(read_pref) = self.read_preference {
            options.selection_criteria = Some(mongodb::options::SelectionCriteria::ReadPreference(
                read_pref.to_driver(),
            ));
        }

        if let Some(ref wc) = self.write_concern {
            options.write_concern = Some(wc.to_driver());
        }

        if let Some(retry_writes) = self.retry_writes {
            options.retry_writes = Some(retry_writes);
        }

        if let Some(retry_reads) = self.retry_reads {
            options.retry_reads = Some(retry_reads);
        }

        if let Some(direct) = self.direct_connection {
            options.direct_connection = Some(direct);
        }

        Ok(options)
    }
}

impl ReadPreference {
    fn to_driver(self) -> mongodb::options::ReadPreference {
        use mongodb::options::ReadPreference as Driver;

        match self {
            ReadPreference::Primary => Driver::Primary,
            ReadPreference::PrimaryPreferred => Driver::PrimaryPreferred {
                options: Default::default(),
            },
            ReadPreference::Secondary => Driver::Secondary {
                options: Default::default(),
            },
            ReadPreference::SecondaryPreferred => Driver::SecondaryPreferred {
                options: Default::default(),
            },
            ReadPreference::Nearest => Driver::Nearest {
                options: Default::default(),
            },
        }
    }
}

impl WriteConcern {
    fn to_driver(&self) -> mongodb::options::WriteConcern {
        use mongodb::options::Acknowledgment;

        let w = match self {
            WriteConcern::W(n) => Acknowledgment::Nodes(*n),
            WriteConcern::Majority => Acknowledgment::Majority,
            WriteConcern::Custom(tag) => Acknowledgment::Custom(tag.clone()),
        };
        mongodb::options::WriteConcern::builder().w(w).build()
    }
}

/// Builder for MongoDB configuration.
#[derive(Debug, Default)]
pub struct MongoConfigBuilder {
    uri: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    min_pool_size: Option<u32>,
    max_pool_size: Option<u32>,
    max_idle_time: Option<Duration>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    connect_deadline: Option<Duration>,
    read_preference: Option<ReadPreference>,
    write_concern: Option<WriteConcern>,
    retry_writes: Option<bool>,
    retry_reads: Option<bool>,
    direct_connection: Option<bool>,
}

impl MongoConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the MongoDB URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set the minimum pool size.
    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = Some(size);
        self
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the maximum idle time for connections.
    pub fn max_idle_time(mut self, duration: Duration) -> Self {
        self.max_idle_time = Some(duration);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Set the server selection timeout.
    pub fn server_selection_timeout(mut self, duration: Duration) -> Self {
        self.server_selection_timeout = Some(duration);
        self
    }

    /// Set the deadline for the connect-and-verify sequence.
    pub fn connect_deadline(mut self, duration: Duration) -> Self {
        self.connect_deadline = Some(duration);
        self
    }

    /// Set the read preference.
    pub fn read_preference(mut self, pref: ReadPreference) -> Self {
        self.read_preference = Some(pref);
        self
    }

    /// Set the write concern.
    pub fn write_concern(mut self, wc: WriteConcern) -> Self {
        self.write_concern = Some(wc);
        self
    }

    /// Enable or disable retry writes.
    pub fn retry_writes(mut self, enabled: bool) -> Self {
        self.retry_writes = Some(enabled);
        self
    }

    /// Enable or disable retry reads.
    pub fn retry_reads(mut self, enabled: bool) -> Self {
        self.retry_reads = Some(enabled);
        self
    }

    /// Enable direct connection (bypass replica set discovery).
    pub fn direct_connection(mut self, enabled: bool) -> Self {
        self.direct_connection = Some(enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MongoResult<MongoConfig> {
        let uri = self
            .uri
            .ok_or_else(|| MongoError::config("connection string is required"))?;
        let database = self
            .database
            .ok_or_else(|| MongoError::config("database name is required"))?;

        let defaults = MongoConfig::default();
        let config = MongoConfig {
            uri,
            database,
            app_name: self.app_name.or(defaults.app_name),
            min_pool_size: self.min_pool_size,
            max_pool_size: self.max_pool_size.or(defaults.max_pool_size),
            max_idle_time: self.max_idle_time.or(defaults.max_idle_time),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            server_selection_timeout: self
                .server_selection_timeout
                .or(defaults.server_selection_timeout),
            connect_deadline: self.connect_deadline.unwrap_or(defaults.connect_deadline),
            read_preference: self.read_preference.or(defaults.read_preference),
            write_concern: self.write_concern,
            retry_writes: self.retry_writes.or(defaults.retry_writes),
            retry_reads: self.retry_reads.or(defaults.retry_reads),
            direct_connection: self.direct_connection.or(defaults.direct_connection),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvSource;

    #[test]
    fn test_config_from_uri() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", "mydb");
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "mydb");
        assert_eq!(config.connect_deadline, Duration::from_secs(25));
        assert_eq!(config.direct_connection, Some(true));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MongoConfig::builder()
            .uri("mongodb://localhost:27017")
            .database("mydb")
            .app_name("test-app")
            .max_pool_size(20)
            .connect_deadline(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.database, "mydb");
        assert_eq!(config.app_name, Some("test-app".to_string()));
        assert_eq!(config.max_pool_size, Some(20));
        assert_eq!(config.connect_deadline, Duration::from_secs(5));
    }

    #[test]
    fn test_config_builder_missing_database() {
        let result = MongoConfig::builder()
            .uri("mongodb://localhost:27017")
            .build();

        assert!(result.unwrap_err().is_config_error());
    }

    #[test]
    fn test_config_builder_missing_uri() {
        let result = MongoConfig::builder().database("mydb").build();
        assert!(result.unwrap_err().is_config_error());
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        assert!(MongoConfig::from_uri("", "mydb").validate().is_err());
        assert!(
            MongoConfig::from_uri("mongodb://localhost:27017", "")
                .validate()
                .is_err()
        );
        assert!(MongoConfig::from_uri("  ", "mydb").validate().is_err());
    }

    #[test]
    fn test_from_env_source() {
        let env = MapEnvSource::new()
            .set(ENV_CONNECTION_STRING, "mongodb://db.internal:27017")
            .set(ENV_DATABASE_NAME, "inventory");

        let config = MongoConfig::from_env_source(&env).unwrap();
        assert_eq!(config.uri, "mongodb://db.internal:27017");
        assert_eq!(config.database, "inventory");
    }

    #[test]
    fn test_from_env_source_missing_variable() {
        let env = MapEnvSource::new().set(ENV_CONNECTION_STRING, "mongodb://localhost:27017");

        let err = MongoConfig::from_env_source(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing environment variable MONGODB_DATABASE"
        );
    }

    #[test]
    fn test_read_preference_default() {
        let pref: ReadPreference = Default::default();
        assert_eq!(pref, ReadPreference::Primary);
    }

    #[tokio::test]
    async fn test_to_client_options() {
        let config = MongoConfig::builder()
            .uri("mongodb://localhost:27017")
            .database("mydb")
            .app_name("orders-service")
            .max_pool_size(4)
            .build()
            .unwrap();

        let options = config.to_client_options().await.unwrap();
        assert_eq!(options.app_name.as_deref(), Some("orders-service"));
        assert_eq!(options.max_pool_size, Some(4));
        assert_eq!(options.direct_connection, Some(true));
    }
}
