//! Integration tests for query, filter and pipeline construction.
//!
//! None of these need a server: they check the documents handed to the driver.

use mongorepo::mongodb::{Bson, QueryBuilder, SortOrder, doc, stages};
use mongorepo::{FilterBuilder, mongodb::ObjectId};
use pretty_assertions::assert_eq;

/// A full listing pipeline comes out in the order it was written
#[test]
fn test_listing_pipeline() {
    let qb = QueryBuilder::new();
    let pipeline = qb.pipeline([
        qb.match_fields([("status", Bson::from("published")), ("lang", Bson::from("en"))]),
        qb.sort([
            ("score", SortOrder::Descending),
            ("title", SortOrder::Ascending),
        ]),
        qb.skip(40),
        qb.limit(20),
    ]);

    assert_eq!(
        pipeline,
        vec![
            doc! { "$match": { "status": "published", "lang": "en" } },
            doc! { "$sort": { "score": -1, "title": 1 } },
            doc! { "$skip": 40_i64 },
            doc! { "$limit": 20_i64 },
        ]
    );
}

/// Report pipelines combine builder stages with the stage helpers
#[test]
fn test_report_pipeline() {
    let qb = QueryBuilder::new();
    let pipeline = qb.pipeline([
        qb.match_single("status", "paid"),
        stages::group("$customer_id", doc! { "revenue": { "$sum": "$total" } }),
        qb.sort_single("revenue", SortOrder::Descending),
        qb.limit(5),
    ]);

    assert_eq!(pipeline.len(), 4);
    assert_eq!(
        pipeline[1],
        doc! { "$group": { "_id": "$customer_id", "revenue": { "$sum": "$total" } } }
    );
}

/// Identity filters follow the configured key field
#[test]
fn test_identity_filters() {
    let oid = ObjectId::new();

    let by_default = QueryBuilder::new();
    assert_eq!(by_default.equals_hex_id(&oid.to_hex()), doc! { "_id": oid });

    let by_slug = QueryBuilder::with_key_field("legacy_id");
    assert_eq!(by_slug.equals_id(oid), doc! { "legacy_id": oid });
}

/// A malformed identity yields a filter that can never match, not a panic or error
#[test]
fn test_malformed_identity_sentinel() {
    let qb = QueryBuilder::new();
    let filter = qb.equals_hex_id("definitely-not-an-object-id");

    let condition = filter.get_document("_id").unwrap();
    assert_eq!(condition.get_array("$in").unwrap().len(), 0);
}

/// Filters built fluently can feed a match stage
#[test]
fn test_filter_into_match_stage() {
    let filter = FilterBuilder::new()
        .eq("status", "active")
        .gte("age", 21)
        .lte("age", 65)
        .in_array("plan", ["pro", "team"])
        .build();

    assert_eq!(
        stages::match_stage(filter),
        doc! {
            "$match": {
                "status": "active",
                "age": { "$gte": 21, "$lte": 65 },
                "plan": { "$in": ["pro", "team"] },
            }
        }
    );
}
