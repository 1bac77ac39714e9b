//! # mongorepo-mongodb
//!
//! Generic repositories over MongoDB collections.
//!
//! This crate provides:
//! - A verified connection provider with a bounded connect deadline
//! - [`Repository<T>`], a per-collection facade for find, aggregate, count, insert, update,
//!   replace and delete
//! - A result materializer that decodes cursors into a single record or a `Vec` of records
//! - Query, filter and aggregation pipeline builders
//!
//! ## Example
//!
//! ```rust,ignore
//! use mongorepo_mongodb::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<ObjectId>,
//!     name: String,
//!     age: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> MongoResult<()> {
//!     // Reads MONGODB_CONNECTIONSTRING and MONGODB_DATABASE
//!     let client = connect_default().await?;
//!     let users: Repository<User> = Repository::new(&client, "users");
//!
//!     let id = users.insert_one(&User { id: None, name: "Alice".into(), age: 30 }).await?;
//!
//!     let mut alice = User { id: None, name: String::new(), age: 0 };
//!     users.find_by_id(id, &mut alice).await?;
//!
//!     let qb = users.query();
//!     let mut adults = Vec::new();
//!     users
//!         .aggregate(
//!             qb.pipeline([
//!                 qb.match_single("age", doc! { "$gte": 18 }),
//!                 qb.sort_single("name", SortOrder::Ascending),
//!                 qb.limit(50),
//!             ]),
//!             Destination::Many(&mut adults),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod env;
pub mod error;
pub mod filter;
pub mod logging;
pub mod materialize;
pub mod query;
pub mod repository;

pub use bson;
pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};
pub use client::{MongoClient, MongoClientBuilder, connect, connect_default};
pub use config::{MongoConfig, MongoConfigBuilder, ReadPreference, WriteConcern};
pub use error::{MongoError, MongoResult};
pub use filter::FilterBuilder;
pub use materialize::Destination;
pub use query::{QueryBuilder, SortOrder, stages};
pub use repository::Repository;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{MongoClient, MongoClientBuilder, connect, connect_default};
    pub use crate::config::{MongoConfig, MongoConfigBuilder};
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::filter::FilterBuilder;
    pub use crate::materialize::Destination;
    pub use crate::query::{QueryBuilder, SortOrder, stages};
    pub use crate::repository::Repository;
    pub use bson::oid::ObjectId;
    pub use bson::{Bson, Document, doc};
}
