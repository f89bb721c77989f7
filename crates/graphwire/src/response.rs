//! GraphQL response envelope types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// An error reported by the server as part of the response envelope.
///
/// This is a first-class error value rather than a plain string so callers
/// can pattern-match on it and inspect the failing path or any
/// server-specific extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// Positions in the operation document the error refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// Path to the response field that failed, if the error relates to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,

    /// Server-specific error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(path) = &self.path {
            write!(f, " at ")?;
            for (i, segment) in path.iter().enumerate() {
                if i > 0 {
                    f.write_str(".")?;
                }
                match segment {
                    PathSegment::Field(name) => f.write_str(name)?,
                    PathSegment::Index(index) => write!(f, "{index}")?,
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for GraphQLError {}

/// A line/column position in a GraphQL document, both 1-indexed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

/// One step in an error path: an object field or a list index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A field name.
    Field(String),
    /// A list index.
    Index(usize),
}

/// The `{data, errors}` envelope every GraphQL-over-HTTP response follows.
///
/// `T` is the caller-chosen destination for the `data` payload; use
/// [`serde_json::Value`] when dynamic access is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Response<T> {
    /// The decoded `data` payload, absent when the server returned none.
    #[serde(default)]
    pub data: Option<T>,

    /// Errors reported by the server, in server order. Empty on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,

    /// Response-level metadata, if the server sent any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl<T> Response<T> {
    /// Whether the server reported any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first reported error, if any.
    pub fn first_error(&self) -> Option<&GraphQLError> {
        self.errors.first()
    }

    /// Consume the envelope, applying the execution contract: the first
    /// reported error becomes the failure value, otherwise the data payload
    /// is handed to the caller. An envelope with neither is malformed.
    pub fn into_data(self) -> Result<T> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(Error::Operation(error));
        }
        self.data.ok_or(Error::MissingData)
    }
}
