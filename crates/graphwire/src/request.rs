//! GraphQL request types: the operation, its variables, and file
//! attachments.

use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A single GraphQL operation prepared for execution.
///
/// The document string is opaque to this layer: no parsing or validation is
/// performed. Attaching at least one file switches execution to the
/// multipart upload path; otherwise the request travels as a plain JSON
/// body.
///
/// # Example
///
/// ```ignore
/// use graphwire::Request;
///
/// let request = Request::new("mutation($file: Upload!) { upload(file: $file) { id } }")
///     .file("file", "report.csv", "a,b,c\n1,2,3\n");
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) query: String,
    pub(crate) variables: Option<Map<String, Value>>,
    pub(crate) operation_name: Option<String>,
    /// Extra headers for this request, merged into the outgoing HTTP
    /// request after the transport defaults. Repeated values per name are
    /// preserved; mutate directly or go through [`Request::header`].
    pub headers: HeaderMap,
    pub(crate) files: Vec<FileUpload>,
    pub(crate) timeout: Option<Duration>,
}

impl Request {
    /// Create a request from a GraphQL document.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
            headers: HeaderMap::new(),
            files: Vec::new(),
            timeout: None,
        }
    }

    /// The operation document.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set or overwrite a single variable.
    ///
    /// The value is converted through [`serde_json::to_value`]; a value
    /// that cannot be represented as JSON is an encode error.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value).map_err(Error::Encode)?;
        self.variables
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        Ok(())
    }

    /// Chainable form of [`Request::set_variable`].
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Result<Self> {
        self.set_variable(name, value)?;
        Ok(self)
    }

    /// The bound variables, if any were set.
    pub fn variables(&self) -> Option<&Map<String, Value>> {
        self.variables.as_ref()
    }

    /// Name the operation to run when the document contains several.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Append a header to this request.
    ///
    /// Appending the same name twice keeps both values.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| Error::InvalidHeader("invalid header name".into()))?;
        let value = value
            .try_into()
            .map_err(|_| Error::InvalidHeader("invalid header value".into()))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Attach a file to the variable path `field`.
    ///
    /// Attachment order is preserved on the wire. The same `field` may be
    /// used more than once; the files then fill consecutive indices of an
    /// array under that path.
    pub fn add_file(
        &mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<FileSource>,
    ) {
        self.files.push(FileUpload {
            field: field.into(),
            name: name.into(),
            source: content.into(),
        });
    }

    /// Chainable form of [`Request::add_file`].
    pub fn file(
        mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<FileSource>,
    ) -> Self {
        self.add_file(field, name, content);
        self
    }

    /// The attached files, in attachment order.
    pub fn files(&self) -> &[FileUpload] {
        &self.files
    }

    /// Deadline for the whole exchange. Elapsing surfaces as
    /// [`Error::Timeout`](crate::Error::Timeout); dropping the future
    /// returned by `execute` cancels the exchange outright.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The serialized body shape shared by the JSON transport and the
/// multipart `operations` field. `variables` is always present,
/// serializing as `null` when never set.
#[derive(Serialize)]
pub(crate) struct OperationPayload<'a> {
    pub query: &'a str,
    pub variables: Option<&'a Map<String, Value>>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

/// A file attachment bound to a variable path of the operation.
#[derive(Debug)]
pub struct FileUpload {
    pub(crate) field: String,
    pub(crate) name: String,
    pub(crate) source: FileSource,
}

impl FileUpload {
    /// The variable path this file fills.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The filename reported to the server.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A streaming byte source for an attached file.
///
/// Content is handed to the transport and read exactly once while the
/// multipart body is written; the client never buffers it eagerly. Build
/// one from in-memory bytes via the `From` impls, or from any fallible
/// byte stream with [`FileSource::from_stream`].
#[derive(Debug)]
pub struct FileSource(pub(crate) reqwest::Body);

impl FileSource {
    /// Wrap a stream of byte chunks, e.g. a framed file reader.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: futures_util::TryStream + Send + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        Self(reqwest::Body::wrap_stream(stream))
    }
}

impl From<Vec<u8>> for FileSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<Bytes> for FileSource {
    fn from(bytes: Bytes) -> Self {
        Self(bytes.into())
    }
}

impl From<String> for FileSource {
    fn from(text: String) -> Self {
        Self(text.into())
    }
}

impl From<&'static str> for FileSource {
    fn from(text: &'static str) -> Self {
        Self(text.into())
    }
}

impl From<&'static [u8]> for FileSource {
    fn from(bytes: &'static [u8]) -> Self {
        Self(bytes.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;

    fn payload_json(request: &Request) -> String {
        serde_json::to_string(&OperationPayload {
            query: &request.query,
            variables: request.variables.as_ref(),
            operation_name: request.operation_name.as_deref(),
        })
        .unwrap()
    }

    #[test]
    fn unset_variables_serialize_as_null() {
        let request = Request::new("{ ping }");
        assert_eq!(payload_json(&request), r#"{"query":"{ ping }","variables":null}"#);
    }

    #[test]
    fn variables_serialize_in_body() {
        let request = Request::new("query($id: ID!) { node(id: $id) { id } }")
            .variable("id", "42")
            .unwrap();
        assert_eq!(
            payload_json(&request),
            r#"{"query":"query($id: ID!) { node(id: $id) { id } }","variables":{"id":"42"}}"#
        );
    }

    #[test]
    fn set_variable_overwrites() {
        let mut request = Request::new("{ ping }");
        request.set_variable("limit", 10).unwrap();
        request.set_variable("limit", 25).unwrap();

        let variables = request.variables().unwrap();
        assert_eq!(variables.len(), 1);
        assert_eq!(variables["limit"], 25);
    }

    #[test]
    fn unserializable_variable_is_an_encode_error() {
        struct Opaque;
        impl Serialize for Opaque {
            fn serialize<S: Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("not representable"))
            }
        }

        let mut request = Request::new("{ ping }");
        let err = request.set_variable("blob", Opaque).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));
    }

    #[test]
    fn operation_name_only_serialized_when_set() {
        let request = Request::new("query A { a } query B { b }").operation_name("B");
        assert_eq!(
            payload_json(&request),
            r#"{"query":"query A { a } query B { b }","variables":null,"operationName":"B"}"#
        );
    }

    #[test]
    fn repeated_headers_are_preserved() {
        let request = Request::new("{ ping }")
            .header("x-tag", "a")
            .unwrap()
            .header("x-tag", "b")
            .unwrap();

        let values: Vec<_> = request.headers.get_all("x-tag").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = Request::new("{ ping }").header("bad name", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn files_keep_attachment_order() {
        let request = Request::new("mutation { upload }")
            .file("files", "one.txt", "1")
            .file("files", "two.txt", "2")
            .file("cover", "cover.png", vec![0u8, 1, 2]);

        let names: Vec<_> = request.files().iter().map(FileUpload::name).collect();
        assert_eq!(names, ["one.txt", "two.txt", "cover.png"]);
        assert_eq!(request.files()[1].field(), "files");
    }
}
