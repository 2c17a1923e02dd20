//! HTTP client utilities for the Global Mobiles storefront.
//!
//! Provides a small builder API over a pluggable [`Transport`], with JSON and
//! multipart form bodies. On wasm32 the [`SpinTransport`] sends through the
//! Spin host; tests use [`testing::MockTransport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use gm_data::{FetchClient, Form};
//!
//! let client = FetchClient::new(transport).with_base_url("http://localhost:8000");
//!
//! // Simple GET request
//! let categories: Vec<MainCategory> = client
//!     .get("/main-categories")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//!
//! // Admin create with an image
//! let form = Form::new()
//!     .text("name", "Chargers")
//!     .file("image", "chargers.png", "image/png", bytes);
//! client
//!     .post("/admin/main-category")
//!     .bearer_auth(token)
//!     .form(form)
//!     .send()
//!     .await?;
//! ```

mod error;
mod form;
mod request;
mod response;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::FetchError;
pub use form::{FilePart, Form, Part, PartValue};
pub use request::{Body, Method, Request, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

#[cfg(target_arch = "wasm32")]
pub use transport::SpinTransport;

use std::collections::HashMap;
use std::rc::Rc;

/// HTTP client for making outbound requests.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    transport: Rc<dyn Transport>,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over `transport`.
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: None,
            default_headers: HashMap::new(),
        }
    }

    /// Create a client sending through the Spin host.
    #[cfg(target_arch = "wasm32")]
    pub fn spin() -> Self {
        Self::new(Rc::new(SpinTransport))
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let builder = RequestBuilder::new(method, full_url).headers(
            self.default_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        ClientRequestBuilder {
            transport: Rc::clone(&self.transport),
            builder,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    transport: Rc<dyn Transport>,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as a string.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.builder = self.builder.text(text);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Set the request body as a multipart form.
    pub fn form(mut self, form: Form) -> Self {
        self.builder = self.builder.form(form);
        self
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Add a bearer token if one is present.
    pub fn maybe_bearer_auth(self, token: Option<impl AsRef<str>>) -> Self {
        match token {
            Some(token) => self.bearer_auth(token),
            None => self,
        }
    }

    /// Send the request and return the response.
    ///
    /// HTTP error statuses are not errors here; see
    /// [`Response::error_for_status`].
    pub async fn send(self) -> Result<Response, FetchError> {
        let request = self.builder.build();
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(%method, %url, "sending request");

        match self.transport.send(request).await {
            Ok(response) => {
                tracing::debug!(%method, %url, status = response.status, "received response");
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(%method, %url, %error, "request failed");
                Err(error)
            }
        }
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Form, Method, Response, Transport};
}
