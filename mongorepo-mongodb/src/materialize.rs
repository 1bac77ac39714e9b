//! Generic result materialization.
//!
//! Query and aggregation results arrive as a cursor of raw BSON documents. The functions in
//! this module decode those documents on demand into a caller-owned [`Destination`], whose
//! element type is chosen by the caller through a type parameter:
//!
//! - [`Destination::One`] receives exactly one decoded document; an empty cursor is a
//!   [`MongoError::NotFound`].
//! - [`Destination::Many`] receives every document, appended in the order the cursor yields
//!   them.
//!
//! The cursor is taken by value, so it is dropped (and the server-side cursor killed) on every
//! return path, including decode failures part-way through a batch.
//!
//! Destinations are always mutable borrows. Handing over a container by value does not
//! compile:
//!
//! ```compile_fail
//! use mongorepo_mongodb::Destination;
//!
//! let orders: Vec<String> = Vec::new();
//! let _ = Destination::Many(orders);
//! ```

use std::any::type_name;

use bson::Document;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::document::from_document;
use crate::error::{MongoError, MongoResult};

/// A caller-owned location that decoded documents are written into.
#[derive(Debug)]
pub enum Destination<'a, T> {
    /// A single record, overwritten by the first document.
    One(&'a mut T),
    /// A growable sequence; each document is decoded into a fresh element and appended.
    Many(&'a mut Vec<T>),
}

impl<T> Destination<'_, T> {
    /// Whether this destination accepts more than one document.
    pub fn is_many(&self) -> bool {
        matches!(self, Destination::Many(_))
    }
}

/// Fill `destination` from `cursor`, dispatching on the destination's shape.
///
/// Returns the number of documents decoded.
pub async fn fill<T, S, E>(destination: Destination<'_, T>, cursor: S) -> MongoResult<usize>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Document, E>> + Unpin,
    MongoError: From<E>,
{
    match destination {
        Destination::One(target) => fill_one(target, cursor).await.map(|()| 1),
        Destination::Many(target) => fill_many(target, cursor).await,
    }
}

/// Decode the first document of `cursor` into `target`.
///
/// Fails with [`MongoError::NotFound`] if the cursor is exhausted before yielding anything.
/// Any documents after the first are left unread.
pub async fn fill_one<T, S, E>(target: &mut T, mut cursor: S) -> MongoResult<()>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Document, E>> + Unpin,
    MongoError: From<E>,
{
    let doc = cursor
        .try_next()
        .await?
        .ok_or_else(|| MongoError::not_found(type_name::<T>()))?;

    *target = from_document(doc)?;
    Ok(())
}

/// Decode every document of `cursor` and append the results to `target`.
///
/// Existing elements are kept. Stops at the first cursor or decode error; elements decoded
/// before the error stay in `target`. Returns the number of elements appended.
pub async fn fill_many<T, S, E>(target: &mut Vec<T>, mut cursor: S) -> MongoResult<usize>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Document, E>> + Unpin,
    MongoError: From<E>,
{
    let start = target.len();

    while let Some(doc) = cursor.try_next().await? {
        target.push(from_document(doc)?);
    }

    let appended = target.len() - start;
    trace!(appended, element = type_name::<T>(), "Cursor drained");
    Ok(appended)
}
