//! Environment variable sources for connection settings.

use std::collections::HashMap;

use crate::error::{MongoError, MongoResult};

/// Environment variable holding the MongoDB connection string.
pub const ENV_CONNECTION_STRING: &str = "MONGODB_CONNECTIONSTRING";

/// Environment variable holding the database name.
pub const ENV_DATABASE_NAME: &str = "MONGODB_DATABASE";

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Get a variable, failing with [`MongoError::MissingEnv`] if it is unset or empty.
    fn require(&self, name: &str) -> MongoResult<String> {
        self.get(name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| MongoError::missing_env(name))
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source_require() {
        let env = MapEnvSource::new().set(ENV_DATABASE_NAME, "shop");
        assert_eq!(env.require(ENV_DATABASE_NAME).unwrap(), "shop");

        let err = env.require(ENV_CONNECTION_STRING).unwrap_err();
        assert!(matches!(err, MongoError::MissingEnv(ref name) if name == ENV_CONNECTION_STRING));
    }

    #[test]
    fn test_empty_value_is_missing() {
        let env = MapEnvSource::new().set(ENV_DATABASE_NAME, "");
        assert!(env.require(ENV_DATABASE_NAME).is_err());
    }
}
