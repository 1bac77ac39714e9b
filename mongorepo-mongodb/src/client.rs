//! Connection provider: establishes and verifies a MongoDB client.

use std::sync::Arc;
use std::time::Duration;

use bson::{Document, doc};
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use crate::config::MongoConfig;
use crate::error::{MongoError, MongoResult};

/// Connect to `database_name` on the server addressed by `connection_string`.
///
/// Both values must be non-empty; an empty value fails before any network I/O.
/// The whole construct-and-verify sequence is bounded by a 25 second deadline.
pub async fn connect(connection_string: &str, database_name: &str) -> MongoResult<MongoClient> {
    MongoClient::new(MongoConfig::from_uri(connection_string, database_name)).await
}

/// Connect using `MONGODB_CONNECTIONSTRING` and `MONGODB_DATABASE` from the environment.
pub async fn connect_default() -> MongoResult<MongoClient> {
    MongoClient::new(MongoConfig::from_env()?).await
}

/// A verified MongoDB client bound to one database.
///
/// A value of this type only exists after a successful connect, so anything that needs a
/// database handle (such as [`Repository`](crate::Repository)) takes one by reference.
/// The driver pools connections internally; cloning is cheap.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
    config: Arc<MongoConfig>,
}

impl MongoClient {
    /// Create a new client from configuration and verify the server is reachable.
    pub async fn new(config: MongoConfig) -> MongoResult<Self> {
        config.validate()?;

        let deadline = config.connect_deadline;
        match tokio::time::timeout(deadline, Self::establish(config)).await {
            Ok(result) => result,
            Err(_) => Err(MongoError::Timeout(millis(deadline))),
        }
    }

    async fn establish(config: MongoConfig) -> MongoResult<Self> {
        let client = Self::construct(&config).await?;

        client
            .database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| MongoError::connection(format!("failed to verify connectivity: {}", e)))?;

        info!(
            database = %client.config.database,
            app_name = ?client.config.app_name,
            "MongoDB client connected"
        );

        Ok(client)
    }

    /// Build the driver client without contacting the server.
    pub(crate) async fn construct(config: &MongoConfig) -> MongoResult<Self> {
        let options = config
            .to_client_options()
            .await
            .map_err(|e| MongoError::connection(format!("failed to construct client: {}", e)))?;

        let client = Client::with_options(options)
            .map_err(|e| MongoError::connection(format!("failed to construct client: {}", e)))?;

        let database = client.database(&config.database);

        Ok(Self {
            client,
            database,
            config: Arc::new(config.clone()),
        })
    }

    /// Create a builder for the client.
    pub fn builder() -> MongoClientBuilder {
        MongoClientBuilder::new()
    }

    /// Get a typed collection.
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.database.collection(name)
    }

    /// Get the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the underlying MongoDB client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// Check if the client is healthy by pinging the server.
    pub async fn is_healthy(&self) -> bool {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .is_ok()
    }

    /// List all collection names in the database.
    pub async fn list_collections(&self) -> MongoResult<Vec<String>> {
        let names = self.database.list_collection_names(None).await?;
        Ok(names)
    }

    /// Drop a collection.
    pub async fn drop_collection(&self, name: &str) -> MongoResult<()> {
        debug!(collection = %name, "Dropping collection");
        self.database
            .collection::<Document>(name)
            .drop(None)
            .await?;
        Ok(())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Builder for MongoClient.
#[derive(Debug, Default)]
pub struct MongoClientBuilder {
    uri: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    max_pool_size: Option<u32>,
    connect_deadline: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    direct_connection: Option<bool>,
}

impl MongoClientBuilder {
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

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    /// Set the deadline for connecting and verifying the server.
    pub fn connect_deadline(mut self, duration: Duration) -> Self {
        self.connect_deadline = Some(duration);
        self
    }

    /// Set the server selection timeout.
    pub fn server_selection_timeout(mut self, duration: Duration) -> Self {
        self.server_selection_timeout = Some(duration);
        self
    }

    /// Enable direct connection (bypass replica set discovery).
    pub fn direct_connection(mut self, enabled: bool) -> Self {
        self.direct_connection = Some(enabled);
        self
    }

    fn into_config(self) -> MongoResult<MongoConfig> {
        let mut config_builder = MongoConfig::builder();

        if let Some(uri) = self.uri {
            config_builder = config_builder.uri(uri);
        }

        if let Some(database) = self.database {
            config_builder = config_builder.database(database);
        }

        if let Some(app_name) = self.app_name {
            config_builder = config_builder.app_name(app_name);
        }

        if let Some(max_pool) = self.max_pool_size {
            config_builder = config_builder.max_pool_size(max_pool);
        }

        if let Some(deadline) = self.connect_deadline {
            config_builder = config_builder.connect_deadline(deadline);
        }

        if let Some(timeout) = self.server_selection_timeout {
            config_builder = config_builder.server_selection_timeout(timeout);
        }

        if let Some(direct) = self.direct_connection {
            config_builder = config_builder.direct_connection(direct);
        }

        config_builder.build()
    }

    /// Build the client, connecting and verifying the server.
    pub async fn build(self) -> MongoResult<MongoClient> {
        let config = self.into_config()?;
        MongoClient::new(config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let builder = MongoClientBuilder::new()
            .uri("mongodb://localhost:27017")
            .database("test")
            .max_pool_size(20);

        assert_eq!(builder.uri, Some("mongodb://localhost:27017".to_string()));
        assert_eq!(builder.database, Some("test".to_string()));
        assert_eq!(builder.max_pool_size, Some(20));
    }

    #[test]
    fn test_client_builder_into_config() {
        let config = MongoClientBuilder::new()
            .uri("mongodb://localhost:27017")
            .database("test")
            .connect_deadline(Duration::from_secs(3))
            .direct_connection(false)
            .into_config()
            .unwrap();

        assert_eq!(config.connect_deadline, Duration::from_secs(3));
        assert_eq!(config.direct_connection, Some(false));
    }

    #[tokio::test]
    async fn test_connect_empty_connection_string() {
        let err = connect("", "shop").await.err().unwrap();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_connect_empty_database_name() {
        let err = connect("mongodb://localhost:27017", "").await.err().unwrap();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_connect_malformed_uri() {
        let err = connect("not-a-mongodb-uri", "shop").await.err().unwrap();
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("failed to construct client"));
    }

    #[tokio::test]
    async fn test_connect_deadline_elapses() {
        // TEST-NET-1 is never routable, so server selection stalls until the deadline.
        let err = MongoClient::builder()
            .uri("mongodb://192.0.2.1:27017")
            .database("shop")
            .connect_deadline(Duration::from_millis(100))
            .build()
            .await
            .err()
            .unwrap();

        assert!(err.is_timeout(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_construct_binds_database() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", "shop");
        let client = MongoClient::construct(&config).await.unwrap();
        assert_eq!(client.database().name(), "shop");
        assert_eq!(client.config().database, "shop");
    }
}
