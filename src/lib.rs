//! # mongorepo
//!
//! Typed repositories over MongoDB collections.
//!
//! mongorepo provides:
//! - A connection provider that verifies the server before handing out a client
//! - Generic repositories that decode results into your own structs
//! - One call shape for single-record and many-record reads
//! - Pure helpers for filters, sorts and aggregation pipelines
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongorepo::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Product {
//!     pub sku: String,
//!     pub price: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> MongoResult<()> {
//!     let client = connect("mongodb://localhost:27017", "catalog").await?;
//!     let products: Repository<Product> = Repository::new(&client, "products");
//!
//!     let mut cheap = Vec::new();
//!     products
//!         .find(FilterBuilder::new().lt("price", 10.0).build(), Destination::Many(&mut cheap))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// MongoDB repositories, connection provider and builders.
pub mod mongodb {
    pub use mongorepo_mongodb::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mongorepo_mongodb::prelude::*;
}

pub use mongorepo_mongodb::logging;
pub use mongorepo_mongodb::{
    Destination, FilterBuilder, MongoClient, MongoError, MongoResult, QueryBuilder, Repository,
    SortOrder, connect, connect_default,
};
