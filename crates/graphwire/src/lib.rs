//! GraphQL-over-HTTP client with JSON and multipart file-upload transports.
//!
//! Graphwire executes exactly one request-response exchange per call: build
//! a [`Request`], hand it to a [`Client`], get back the decoded `data`
//! payload or a typed error. Requests without files travel as a plain JSON
//! body; attaching a file switches the request to the multipart upload
//! convention (`operations`/`map`/numbered file parts) understood by
//! compliant GraphQL servers.
//!
//! # Queries and mutations
//!
//! ```ignore
//! use graphwire::{Client, Request};
//!
//! let client = Client::new("https://api.example.com/graphql")?;
//!
//! #[derive(serde::Deserialize)]
//! struct Data {
//!     user: User,
//! }
//!
//! let request = Request::new(r#"
//!     query GetUser($id: ID!) {
//!         user(id: $id) { id name }
//!     }
//! "#)
//! .variable("id", "123")?;
//!
//! let data: Data = client.execute(request).await?;
//! ```
//!
//! # File uploads
//!
//! ```ignore
//! use graphwire::Request;
//!
//! let request = Request::new(r#"
//!     mutation Attach($files: [Upload!]!) {
//!         attach(files: $files) { id }
//!     }
//! "#)
//! .file("files", "notes.txt", "first")
//! .file("files", "todo.txt", "second");
//!
//! let receipt: serde_json::Value = client.execute(request).await?;
//! ```
//!
//! # Errors
//!
//! Every failure mode is a distinct [`Error`] variant: local encoding
//! failures, transport failures, timeouts, non-200 responses without a
//! parseable envelope, malformed 200 responses, and server-reported
//! operation errors (as structured [`GraphQLError`] values). A non-200
//! response that still carries a valid envelope surfaces the envelope's
//! error, not the status code.
//!
//! Out of scope by design: query validation, schema introspection,
//! caching, retries, and subscriptions.

mod client;
mod error;
mod request;
mod response;
mod upload;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use request::{FileSource, FileUpload, Request};
pub use response::{GraphQLError, Location, PathSegment, Response};
