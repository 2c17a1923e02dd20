//! HTTP response handling.

use crate::FetchError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A response with no body.
    pub fn empty(status: u16) -> Self {
        Self::new(status, HashMap::new(), Vec::new())
    }

    /// A response carrying `value` as JSON.
    pub fn with_json<T: Serialize>(status: u16, value: &T) -> Result<Self, FetchError> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Ok(Self::new(status, headers, serde_json::to_vec(value)?))
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response was a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response was a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Get the raw response body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// The server's error message.
    ///
    /// Error bodies look like `{"detail": "..."}`; anything else is returned
    /// as text.
    pub fn error_message(&self) -> String {
        #[derive(serde::Deserialize)]
        struct Detail {
            detail: serde_json::Value,
        }

        match serde_json::from_slice::<Detail>(&self.body) {
            Ok(Detail {
                detail: serde_json::Value::String(s),
            }) => s,
            Ok(Detail { detail }) => detail.to_string(),
            Err(_) => self.text().unwrap_or_else(|_| "Unknown error".to_string()),
        }
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::HttpError {
                status: self.status,
                message: self.error_message(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    #[test]
    fn test_response_status_classes() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(299, b"").is_success());
        assert!(!make_response(300, b"").is_success());
        assert!(make_response(404, b"").is_client_error());
        assert!(!make_response(500, b"").is_client_error());
        assert!(make_response(503, b"").is_server_error());
    }

    #[test]
    fn test_response_json() {
        use serde::Deserialize;

        #[derive(Deserialize, Debug, PartialEq)]
        struct Data {
            value: i32,
        }

        let resp = make_response(200, br#"{"value": 42}"#);
        let data: Data = resp.json().unwrap();
        assert_eq!(data, Data { value: 42 });
        assert!(make_response(200, b"not json").json::<Data>().is_err());
    }

    #[test]
    fn test_with_json_sets_header() {
        let resp = Response::with_json(201, &serde_json::json!({"id": 7})).unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.json::<serde_json::Value>().unwrap()["id"], 7);
    }

    #[test]
    fn test_error_for_status_uses_detail() {
        let resp = make_response(404, br#"{"detail": "Product not found"}"#);
        assert_eq!(
            resp.error_for_status().unwrap_err(),
            FetchError::HttpError {
                status: 404,
                message: "Product not found".to_string()
            }
        );
    }

    #[test]
    fn test_error_for_status_plain_body() {
        let resp = make_response(500, b"Internal Server Error");
        assert_eq!(
            resp.error_for_status().unwrap_err().to_string(),
            "HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn test_error_for_status_structured_detail() {
        let resp = make_response(422, br#"{"detail": [{"msg": "field required"}]}"#);
        let message = resp.error_message();
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_error_for_status_success() {
        assert!(make_response(200, b"OK").error_for_status().is_ok());
    }
}
