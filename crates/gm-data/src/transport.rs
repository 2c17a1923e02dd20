//! The seam between request building and the network.

use crate::{FetchError, Request, Response};
use async_trait::async_trait;

/// Sends a built [`Request`] and returns the raw [`Response`].
///
/// Non-2xx statuses are returned as responses, not errors. Only failures
/// to reach the server are errors.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

/// Outbound HTTP through the Spin host.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinTransport;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Transport for SpinTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        use crate::Method;
        use spin_sdk::http::Method as SpinMethod;

        let method = match request.method {
            Method::Get => SpinMethod::Get,
            Method::Post => SpinMethod::Post,
            Method::Put => SpinMethod::Put,
            Method::Patch => SpinMethod::Patch,
            Method::Delete => SpinMethod::Delete,
        };

        let mut builder = spin_sdk::http::Request::builder();
        builder.method(method).uri(request.url.as_str());
        for (key, value) in &request.headers {
            builder.header(key.as_str(), value.as_str());
        }
        builder.body(request.body.into_bytes());

        let response: spin_sdk::http::Response = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::RequestError(e.to_string()))?;

        let status = *response.status();
        let headers = response
            .headers()
            .map(|(k, v)| (k.to_string(), v.as_str().unwrap_or("").to_string()))
            .collect();

        Ok(Response::new(status, headers, response.into_body()))
    }
}
