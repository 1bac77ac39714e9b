//! Query and aggregation pipeline construction helpers.
//!
//! Everything here is a pure function producing BSON documents; nothing is validated locally,
//! the server rejects malformed expressions when they are used.

use bson::{Bson, Document, doc, oid::ObjectId};
use tracing::warn;

/// Default identity field of a MongoDB document.
pub const DEFAULT_KEY_FIELD: &str = "_id";

/// Sort direction for `$sort` stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl From<SortOrder> for Bson {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Ascending => Bson::Int32(1),
            SortOrder::Descending => Bson::Int32(-1),
        }
    }
}

/// Builds filters and pipeline stages for one collection's identity field.
///
/// # Example
///
/// ```rust
/// use mongorepo_mongodb::{QueryBuilder, SortOrder};
///
/// let qb = QueryBuilder::new();
/// let pipeline = qb.pipeline([
///     qb.match_single("status", "shipped"),
///     qb.sort_single("created_at", SortOrder::Descending),
///     qb.skip(20),
///     qb.limit(10),
/// ]);
/// assert_eq!(pipeline.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    key_field: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            key_field: DEFAULT_KEY_FIELD.to_string(),
        }
    }
}

impl QueryBuilder {
    /// Create a builder using `_id` as the identity field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder using `key_field` as the identity field.
    pub fn with_key_field(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
        }
    }

    /// The identity field used by [`equals_id`](Self::equals_id).
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// `{ field: value }`
    pub fn equals(&self, field: &str, value: impl Into<Bson>) -> Document {
        let mut filter = Document::new();
        filter.insert(field, value.into());
        filter
    }

    /// Equality on the identity field.
    pub fn equals_id(&self, id: ObjectId) -> Document {
        self.equals(&self.key_field, id)
    }

    /// Equality on the identity field, parsing `hex` as an ObjectId.
    ///
    /// A string that is not a valid ObjectId does not produce an error. Instead the result
    /// is a filter that can never match (`{ key: { "$in": [] } }`), so a lookup by a malformed
    /// identity finds nothing. Use [`parse_object_id`](crate::document::parse_object_id)
    /// first if the caller needs to tell the two cases apart.
    pub fn equals_hex_id(&self, hex: &str) -> Document {
        match ObjectId::parse_str(hex) {
            Ok(id) => self.equals_id(id),
            Err(e) => {
                warn!(key = %self.key_field, error = %e, "Unparseable identity, using empty match");
                self.matches_nothing()
            }
        }
    }

    fn matches_nothing(&self) -> Document {
        self.equals(&self.key_field, doc! { "$in": Bson::Array(Vec::new()) })
    }

    /// `{ "$match": { k1: v1, k2: v2, ... } }`, keeping the given field order.
    pub fn match_fields<I, K, V>(&self, fields: I) -> Document
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Bson>,
    {
        let filter: Document = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        stages::match_stage(filter)
    }

    /// `{ "$match": { field: value } }`
    pub fn match_single(&self, field: &str, value: impl Into<Bson>) -> Document {
        stages::match_stage(self.equals(field, value))
    }

    /// `{ "$sort": { k1: dir1, k2: dir2, ... } }`; earlier fields take precedence.
    pub fn sort<I, K>(&self, fields: I) -> Document
    where
        I: IntoIterator<Item = (K, SortOrder)>,
        K: Into<String>,
    {
        let keys: Document = fields
            .into_iter()
            .map(|(k, order)| (k.into(), Bson::from(order)))
            .collect();
        stages::sort_stage(keys)
    }

    /// `{ "$sort": { field: dir } }`
    pub fn sort_single(&self, field: &str, order: SortOrder) -> Document {
        stages::sort_stage(self.equals(field, order))
    }

    /// `{ "$limit": n }`
    pub fn limit(&self, limit: i64) -> Document {
        doc! { "$limit": limit }
    }

    /// `{ "$skip": n }`
    pub fn skip(&self, skip: i64) -> Document {
        doc! { "$skip": skip }
    }

    /// Assemble stages into a pipeline, in order.
    pub fn pipeline(&self, stages: impl IntoIterator<Item = Document>) -> Vec<Document> {
        stages.into_iter().collect()
    }
}

/// Helper functions for aggregation stages that do not depend on the identity field.
pub mod stages {
    use bson::{Bson, Document, doc};

    /// Create a $match stage.
    pub fn match_stage(filter: Document) -> Document {
        doc! { "$match": filter }
    }

    /// Create a $sort stage.
    pub fn sort_stage(sort: Document) -> Document {
        doc! { "$sort": sort }
    }

    /// Create a $project stage.
    pub fn project(fields: Document) -> Document {
        doc! { "$project": fields }
    }

    /// Create a $group stage.
    pub fn group(id: impl Into<Bson>, accumulators: Document) -> Document {
        let mut group_doc = doc! { "_id": id.into() };
        group_doc.extend(accumulators);
        doc! { "$group": group_doc }
    }

    /// Create a $lookup stage (left outer join).
    pub fn lookup(from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Document {
        doc! {
            "$lookup": {
                "from": from,
                "localField": local_field,
                "foreignField": foreign_field,
                "as": as_field
            }
        }
    }

    /// Create an $unwind stage.
    pub fn unwind(path: &str, preserve_null_and_empty: bool) -> Document {
        doc! {
            "$unwind": {
                "path": format!("${}", path),
                "preserveNullAndEmptyArrays": preserve_null_and_empty
            }
        }
    }

    /// Create a $count stage.
    pub fn count(field_name: &str) -> Document {
        doc! { "$count": field_name }
    }
}
