//! Document mapping and conversion utilities.

use bson::{Document, oid::ObjectId};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{MongoError, MongoResult};

/// Convert a struct to a BSON document.
pub fn to_document<T: Serialize>(value: &T) -> MongoResult<Document> {
    Ok(bson::to_document(value)?)
}

/// Decode a BSON document into a typed value.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> MongoResult<T> {
    Ok(bson::from_document(doc)?)
}

/// Parse an ObjectId from its 24 character hex form.
pub fn parse_object_id(s: &str) -> MongoResult<ObjectId> {
    ObjectId::parse_str(s).map_err(MongoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_to_document() {
        #[derive(Serialize)]
        struct User {
            name: String,
            age: i32,
        }

        let user = User {
            name: "Bob".to_string(),
            age: 25,
        };

        let doc = to_document(&user).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "Bob");
        assert_eq!(doc.get_i32("age").unwrap(), 25);
    }

    #[test]
    fn test_from_document() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            name: String,
            age: i32,
        }

        let doc = doc! { "name": "Carol", "age": 35 };
        let user: User = from_document(doc).unwrap();
        assert_eq!(
            user,
            User {
                name: "Carol".to_string(),
                age: 35
            }
        );
    }

    #[test]
    fn test_from_document_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct User {
            name: String,
        }

        let err = from_document::<User>(doc! { "name": 12 }).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_parse_object_id() {
        let oid = ObjectId::new();
        let parsed = parse_object_id(&oid.to_hex()).unwrap();
        assert_eq!(oid, parsed);

        assert!(matches!(
            parse_object_id("invalid"),
            Err(MongoError::InvalidObjectId(_))
        ));
    }
}
