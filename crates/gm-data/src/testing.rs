//! In-process transport for tests.
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = Rc::new(MockTransport::new());
//! mock.respond_json(Method::Get, "/main-categories", 200, &json!([]));
//! let client = FetchClient::new(mock.clone()).with_base_url("http://api");
//! ```

use crate::{FetchError, Method, Request, Response, Transport};
use async_trait::async_trait;
use serde::Serialize;
use std::cell::RefCell;

type Handler = Box<dyn Fn(&Request) -> Result<Response, FetchError>>;

struct Route {
    method: Method,
    pattern: String,
    handler: Handler,
}

/// A [`Transport`] answering from registered routes.
///
/// Patterns match the request path segment by segment; a `{name}` segment
/// matches anything. The query string is ignored. When several routes match,
/// the most recently registered wins. Unmatched requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: RefCell<Vec<Route>>,
    log: RefCell<Vec<Request>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("routes", &self.routes.borrow().len())
            .field("requests", &self.log.borrow().len())
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn route<F>(&self, method: Method, pattern: &str, handler: F)
    where
        F: Fn(&Request) -> Result<Response, FetchError> + 'static,
    {
        self.routes.borrow_mut().push(Route {
            method,
            pattern: pattern.to_string(),
            handler: Box::new(handler),
        });
    }

    /// Always answer `pattern` with `status` and a JSON body.
    pub fn respond_json<T: Serialize>(&self, method: Method, pattern: &str, status: u16, body: &T) {
        let value = serde_json::to_value(body).unwrap_or(serde_json::Value::Null);
        self.route(method, pattern, move |_| Response::with_json(status, &value));
    }

    /// Always answer `pattern` with an empty body.
    pub fn respond_status(&self, method: Method, pattern: &str, status: u16) {
        self.route(method, pattern, move |_| Ok(Response::empty(status)));
    }

    /// Fail `pattern` as if the server were unreachable.
    pub fn fail(&self, method: Method, pattern: &str) {
        self.route(method, pattern, |req| {
            Err(FetchError::RequestError(format!(
                "connection refused: {}",
                req.url
            )))
        });
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.log.borrow().clone()
    }

    /// Requests whose method and path match `pattern`.
    pub fn requests_to(&self, method: Method, pattern: &str) -> Vec<Request> {
        self.log
            .borrow()
            .iter()
            .filter(|r| r.method == method && path_matches(pattern, r.path()))
            .cloned()
            .collect()
    }

    /// Forget recorded requests.
    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let path = path.split('?').next().unwrap_or("");
    let pat: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let got: Vec<&str> = path.trim_matches('/').split('/').collect();
    pat.len() == got.len()
        && pat
            .iter()
            .zip(&got)
            .all(|(p, g)| (p.starts_with('{') && p.ends_with('}')) || p == g)
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        self.log.borrow_mut().push(request.clone());
        let routes = self.routes.borrow();
        let route = routes
            .iter()
            .rev()
            .find(|r| r.method == request.method && path_matches(&r.pattern, request.path()));
        match route {
            Some(route) => (route.handler)(&request),
            None => Response::with_json(404, &serde_json::json!({"detail": "Not Found"})),
        }
    }
}
