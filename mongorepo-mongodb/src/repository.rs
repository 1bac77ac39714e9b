//! Per-collection repository over typed entities.

use std::fmt;

use bson::{Bson, Document, oid::ObjectId};
use mongodb::Collection;
use mongodb::options::{FindOptions, UpdateModifications};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::MongoClient;
use crate::document::from_document;
use crate::error::{MongoError, MongoResult};
use crate::materialize::{self, Destination};
use crate::query::QueryBuilder;

/// CRUD and aggregation access to one collection, decoding documents into `T`.
///
/// A repository can only be built from a connected [`MongoClient`], so it never observes an
/// unverified database handle. It holds no per-call state: clones share the driver's
/// connection pool and may be used from any number of tasks at once.
///
/// # Example
///
/// ```rust,ignore
/// use mongorepo_mongodb::{Destination, Repository, connect, doc};
///
/// let client = connect("mongodb://localhost:27017", "shop").await?;
/// let orders: Repository<Order> = Repository::new(&client, "orders");
///
/// let id = orders.insert_one(&order).await?;
///
/// let mut open = Vec::new();
/// orders.find(doc! { "status": "open" }, Destination::Many(&mut open)).await?;
/// ```
pub struct Repository<T> {
    collection: Collection<T>,
    query: QueryBuilder,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            query: self.query.clone(),
        }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection.name())
            .field("key_field", &self.query.key_field())
            .finish()
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    /// Bind `collection_name` in the client's database, keyed by `_id`.
    pub fn new(client: &MongoClient, collection_name: &str) -> Self {
        Self {
            collection: client.collection(collection_name),
            query: QueryBuilder::new(),
        }
    }

    /// Use `key_field` instead of `_id` for identity lookups and deletes.
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.query = QueryBuilder::with_key_field(key_field);
        self
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        self.collection.name()
    }

    /// The identity field.
    pub fn key_field(&self) -> &str {
        self.query.key_field()
    }

    /// A query builder bound to this repository's identity field.
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    /// The underlying typed collection.
    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    fn documents(&self) -> Collection<Document> {
        self.collection.clone_with_type()
    }

    /// Run `filter` and fill `destination` with the matching documents.
    ///
    /// A [`Destination::One`] receives the first match, or fails with
    /// [`MongoError::NotFound`] when nothing matches.
    pub async fn find(&self, filter: Document, destination: Destination<'_, T>) -> MongoResult<()> {
        debug!(collection = %self.name(), filter = %filter, "find");

        let options = (!destination.is_many()).then(|| FindOptions::builder().limit(1).build());
        let cursor = self.documents().find(filter, options).await?;
        let decoded = materialize::fill(destination, cursor).await?;

        debug!(collection = %self.name(), decoded, "find complete");
        Ok(())
    }

    /// Load the document whose identity field equals `id` into `target`.
    pub async fn find_by_id(&self, id: impl Into<Bson>, target: &mut T) -> MongoResult<()> {
        let filter = self.query.equals(self.key_field(), id);
        self.find(filter, Destination::One(target)).await
    }

    /// Run an aggregation pipeline and fill `destination` with its output.
    ///
    /// The output type `R` is independent of the entity type, since pipelines usually
    /// reshape documents.
    pub async fn aggregate<R>(
        &self,
        pipeline: impl IntoIterator<Item = Document>,
        destination: Destination<'_, R>,
    ) -> MongoResult<()>
    where
        R: DeserializeOwned,
    {
        let pipeline: Vec<Document> = pipeline.into_iter().collect();
        debug!(collection = %self.name(), stages = pipeline.len(), "aggregate");

        let cursor = self.documents().aggregate(pipeline, None).await?;
        let decoded = materialize::fill(destination, cursor).await?;

        debug!(collection = %self.name(), decoded, "aggregate complete");
        Ok(())
    }

    /// Count the documents matching `filter`.
    pub async fn count(&self, filter: Document) -> MongoResult<u64> {
        let count = self.collection.count_documents(filter, None).await?;
        debug!(collection = %self.name(), count, "count");
        Ok(count)
    }

    /// Insert `entity` and return the identity the server assigned to it.
    ///
    /// Fails with [`MongoError::InvalidObjectId`] if the stored identity is not an ObjectId,
    /// which happens when the entity supplies its own non-ObjectId `_id`.
    pub async fn insert_one(&self, entity: &T) -> MongoResult<ObjectId> {
        let result = self.collection.insert_one(entity, None).await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            MongoError::invalid_object_id(format!(
                "inserted id {} is not an ObjectId",
                result.inserted_id
            ))
        })?;

        debug!(collection = %self.name(), id = %id, "insert_one");
        Ok(id)
    }

    /// Atomically apply `update` to the first document matching `filter`.
    ///
    /// When `destination` is given it receives the document as it was before the update.
    /// A filter matching nothing fails with [`MongoError::NotFound`].
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
        destination: Option<&mut T>,
    ) -> MongoResult<()> {
        debug!(collection = %self.name(), filter = %filter, "update_one");

        let matched = self
            .documents()
            .find_one_and_update(filter, update, None)
            .await?
            .ok_or_else(|| MongoError::not_found(self.name()))?;

        if let Some(target) = destination {
            *target = from_document(matched)?;
        }
        Ok(())
    }

    /// Replace the first document matching `filter` with `entity`.
    pub async fn replace_one(&self, filter: Document, entity: &T) -> MongoResult<()> {
        let result = self.collection.replace_one(filter, entity, None).await?;
        debug!(
            collection = %self.name(),
            matched = result.matched_count,
            modified = result.modified_count,
            "replace_one"
        );
        Ok(())
    }

    /// Delete the document whose identity field equals `id`.
    ///
    /// Deleting an identity that does not exist is not an error; the returned count is zero.
    pub async fn delete_one(&self, id: impl Into<Bson>) -> MongoResult<u64> {
        let filter = self.query.equals(self.key_field(), id);
        let result = self.collection.delete_one(filter, None).await?;

        debug!(collection = %self.name(), deleted = result.deleted_count, "delete_one");
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::config::MongoConfig;

    #[derive(Debug, Serialize, Deserialize)]
    struct Order {
        customer: String,
        total: f64,
    }

    async fn offline_client() -> MongoClient {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", "shop");
        MongoClient::construct(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_repository_binds_collection() {
        let client = offline_client().await;
        let orders: Repository<Order> = Repository::new(&client, "orders");

        assert_eq!(orders.name(), "orders");
        assert_eq!(orders.key_field(), "_id");
        assert_eq!(orders.collection().namespace().db, "shop");
    }

    #[tokio::test]
    async fn test_repository_custom_key_field() {
        let client = offline_client().await;
        let orders: Repository<Order> =
            Repository::new(&client, "orders").with_key_field("order_number");

        assert_eq!(orders.key_field(), "order_number");
        assert_eq!(
            orders.query().equals_hex_id("bogus"),
            bson::doc! { "order_number": { "$in": [] } }
        );
    }

    #[tokio::test]
    async fn test_repository_clone_and_debug() {
        let client = offline_client().await;
        let orders: Repository<Order> = Repository::new(&client, "orders");
        let copy = orders.clone();

        assert_eq!(copy.name(), orders.name());
        let rendered = format!("{:?}", copy);
        assert!(rendered.contains("orders"));
        assert!(rendered.contains("_id"));
    }
}
