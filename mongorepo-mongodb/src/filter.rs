//! Fluent filter construction for `find`, `count` and `update_one`.

use bson::{Bson, Document, doc, oid::ObjectId};

use crate::error::MongoResult;
use crate::query::DEFAULT_KEY_FIELD;

/// Builder for MongoDB filter documents.
///
/// Operator conditions on the same field are merged, so a range reads naturally:
///
/// ```rust
/// use mongorepo_mongodb::FilterBuilder;
/// use mongorepo_mongodb::bson::doc;
///
/// let filter = FilterBuilder::new()
///     .eq("status", "active")
///     .gte("age", 18)
///     .lt("age", 65)
///     .build();
///
/// assert_eq!(filter, doc! { "status": "active", "age": { "$gte": 18, "$lt": 65 } });
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    doc: Document,
}

impl FilterBuilder {
    /// Create a new empty filter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing filter document.
    pub fn from_doc(doc: Document) -> Self {
        Self { doc }
    }

    fn operator(mut self, field: &str, op: &str, value: Bson) -> Self {
        if let Some(Bson::Document(existing)) = self.doc.get_mut(field) {
            if is_operator_doc(existing) {
                existing.insert(op, value);
                return self;
            }
        }

        let mut condition = Document::new();
        condition.insert(op, value);
        self.doc.insert(field, condition);
        self
    }

    /// Add an equality condition. Replaces any earlier condition on `field`.
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    /// Add a not-equal condition.
    pub fn ne(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$ne", value.into())
    }

    /// Add a greater-than condition.
    pub fn gt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$gt", value.into())
    }

    /// Add a greater-than-or-equal condition.
    pub fn gte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$gte", value.into())
    }

    /// Add a less-than condition.
    pub fn lt(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$lt", value.into())
    }

    /// Add a less-than-or-equal condition.
    pub fn lte(self, field: &str, value: impl Into<Bson>) -> Self {
        self.operator(field, "$lte", value.into())
    }

    /// Match if `field` equals any of `values`.
    pub fn in_array<V: Into<Bson>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.operator(field, "$in", Bson::Array(values))
    }

    /// Match if `field` equals none of `values`.
    pub fn not_in<V: Into<Bson>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.operator(field, "$nin", Bson::Array(values))
    }

    /// Add a regex condition.
    pub fn regex(self, field: &str, pattern: &str) -> Self {
        self.operator(field, "$regex", Bson::String(pattern.to_string()))
    }

    /// Require `field` to be present (or absent).
    pub fn exists(self, field: &str, exists: bool) -> Self {
        self.operator(field, "$exists", Bson::Boolean(exists))
    }

    /// Match the `_id` field.
    pub fn by_id(self, id: ObjectId) -> Self {
        self.eq(DEFAULT_KEY_FIELD, id)
    }

    /// Match the `_id` field, parsing `id` as a hex ObjectId.
    pub fn by_id_str(self, id: &str) -> MongoResult<Self> {
        let oid = ObjectId::parse_str(id)?;
        Ok(self.by_id(oid))
    }

    /// Require all of `conditions` ($and).
    pub fn and(mut self, conditions: Vec<Document>) -> Self {
        self.doc.insert("$and", conditions);
        self
    }

    /// Require any of `conditions` ($or).
    pub fn or(mut self, conditions: Vec<Document>) -> Self {
        self.doc.insert("$or", conditions);
        self
    }

    /// Build the filter document.
    pub fn build(self) -> Document {
        self.doc
    }

    /// Check if the filter is empty (matches every document).
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

/// A filter matching every document.
pub fn all() -> Document {
    doc! {}
}
