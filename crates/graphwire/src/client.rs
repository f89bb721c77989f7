//! GraphQL client: transport ownership, dispatch, and response decoding.

use std::fmt;
use std::time::Duration;

use http::{HeaderMap, header};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::request::{OperationPayload, Request};
use crate::response::Response;
use crate::upload;

const TARGET: &str = "graphwire::client";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const JSON_ACCEPT: &str = "application/json; charset=utf-8";

/// Default timeout applied when the builder constructs its own transport.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for configuring a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: String,
    http: Option<reqwest::Client>,
    timeout: Duration,
    default_headers: HeaderMap,
    close_connection: bool,
}

impl ClientBuilder {
    fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: None,
            timeout: DEFAULT_TIMEOUT,
            default_headers: HeaderMap::new(),
            close_connection: false,
        }
    }

    /// Use an existing transport instead of building one.
    ///
    /// The [`ClientBuilder::timeout`] setting is ignored in that case; the
    /// supplied client keeps whatever configuration it was built with.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Set the transport-level request timeout (default 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request, e.g. an authorization token.
    pub fn default_header(
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
        self.default_headers.append(name, value);
        Ok(self)
    }

    /// Ask the server to close the connection after each exchange instead
    /// of keeping it pooled. Affects connection reuse, not correctness.
    pub fn close_connection(mut self, close: bool) -> Self {
        self.close_connection = close;
        self
    }

    /// Build the client, validating the endpoint URL.
    pub fn build(self) -> Result<Client> {
        let endpoint = Url::parse(&self.endpoint)?;
        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder().timeout(self.timeout).build()?,
        };
        Ok(Client {
            http,
            endpoint,
            default_headers: self.default_headers,
            close_connection: self.close_connection,
        })
    }
}

/// A GraphQL client bound to one endpoint.
///
/// The client is cheaply cloneable and safe for concurrent use; clones
/// share the underlying connection pool. Each [`Client::execute`] call
/// performs exactly one request-response exchange: no retries, no
/// background work.
///
/// # Example
///
/// ```ignore
/// use graphwire::{Client, Request};
///
/// let client = Client::new("https://api.example.com/graphql")?;
///
/// #[derive(serde::Deserialize)]
/// struct Data {
///     version: String,
/// }
///
/// let request = Request::new("{ version }");
/// let data: Data = client.execute(request).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: Url,
    default_headers: HeaderMap,
    close_connection: bool,
}

impl Client {
    /// Create a client with default configuration.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    /// Create a builder for a customized client.
    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }

    /// The endpoint this client posts operations to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Execute an operation and decode its `data` payload into `T`.
    ///
    /// File-bearing requests go out as multipart upload bodies, file-free
    /// requests as plain JSON. If the server reports errors, the first one
    /// is returned as [`Error::Operation`]; use [`Client::execute_raw`]
    /// when the full list matters. Use [`serde_json::Value`] as `T` for
    /// dynamic access to the payload.
    pub async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        self.exchange::<T>(request).await?.into_data()
    }

    /// Execute an operation and return the parsed envelope untouched:
    /// raw `data`, the complete error list, and any response extensions.
    ///
    /// Transport, status, and decode failures still surface as errors;
    /// server-reported operation errors do not.
    pub async fn execute_raw(&self, request: Request) -> Result<Response<Value>> {
        self.exchange(request).await
    }

    async fn exchange<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>> {
        let response = self.dispatch(request).await?;
        let status = response.status();

        // The whole body is read up front: a malformed body and a non-200
        // status can only be told apart once decoding has been attempted.
        let body = response.bytes().await?;
        tracing::trace!(
            target: TARGET,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "response received"
        );

        match serde_json::from_slice::<Response<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if status != StatusCode::OK => Err(Error::Status(status.as_u16())),
            Err(err) => Err(Error::Decode(err)),
        }
    }

    async fn dispatch(&self, request: Request) -> Result<reqwest::Response> {
        let Request {
            query,
            variables,
            operation_name,
            headers,
            files,
            timeout,
        } = request;

        tracing::debug!(
            target: TARGET,
            query = %query,
            variables = ?variables,
            files = files.len(),
            "executing operation"
        );

        let mut builder = if files.is_empty() {
            let body = serde_json::to_string(&OperationPayload {
                query: &query,
                variables: variables.as_ref(),
                operation_name: operation_name.as_deref(),
            })
            .map_err(Error::Encode)?;
            tracing::trace!(target: TARGET, body = %body, "encoded JSON body");

            self.http
                .post(self.endpoint.clone())
                .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .header(header::ACCEPT, JSON_ACCEPT)
                .body(body)
        } else {
            let form = upload::into_form(
                &query,
                variables.as_ref(),
                operation_name.as_deref(),
                files,
            )?;
            self.http
                .post(self.endpoint.clone())
                .multipart(form)
                .header(header::ACCEPT, JSON_ACCEPT)
        };

        if self.close_connection {
            builder = builder.header(header::CONNECTION, "close");
        }

        if !self.default_headers.is_empty() {
            builder = builder.headers(self.default_headers.clone());
        }

        // Caller headers go in last. reqwest merges them so that the first
        // value for a name replaces any default and additional values for
        // the same name are appended, never dropped.
        if !headers.is_empty() {
            builder = builder.headers(headers);
        }

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.send().await?)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint.as_str())
            .field("close_connection", &self.close_connection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_endpoint() {
        let err = Client::new("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn builder_defaults() {
        let client = Client::new("https://api.example.com/graphql").unwrap();
        assert_eq!(client.endpoint(), "https://api.example.com/graphql");
        assert!(!client.close_connection);
        assert!(client.default_headers.is_empty());
    }

    #[test]
    fn builder_rejects_invalid_default_header() {
        let err = Client::builder("https://api.example.com/graphql")
            .default_header("not a header name", "x")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn debug_shows_endpoint_only() {
        let client = Client::builder("https://api.example.com/graphql")
            .close_connection(true)
            .build()
            .unwrap();
        let repr = format!("{client:?}");
        assert!(repr.contains("api.example.com"));
        assert!(repr.contains("close_connection: true"));
    }
}
