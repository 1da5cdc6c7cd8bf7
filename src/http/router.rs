//! Maps a parsed request to its canned response.
//!
//! Routing is an ordered match on the request target, first match wins:
//!
//! | Target | Status | Content-Type | Body |
//! |---|---|---|---|
//! | `/`, `/healthcheck` | 200 | `application/json` | [`HEALTH_BODY`] |
//! | `/hello` (opt-in) | 200 | `text/plain` | greeting for `?name=` |
//! | anything else | 404 | `text/plain` | `Not Found` |
//!
//! The healthcheck targets are compared verbatim, so `/healthcheck?x=1`
//! is not a match.

use crate::greeting::{say_hello_to, UserType};
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

pub const SERVER_NAME: &str = "Boost Server";
pub const HEALTH_BODY: &str = r#"{"status": "ok", "message": "Server is running"}"#;
pub const NOT_FOUND_BODY: &str = "Not Found";

const HEALTH_TARGETS: [&str; 2] = ["/healthcheck", "/"];
const HELLO_PATH: &str = "/hello";

#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    hello_route: bool,
}

impl Router {
    pub fn new(hello_route: bool) -> Self {
        Self { hello_route }
    }

    /// Builds the response for `req`. Performs no I/O.
    pub fn route(&self, req: &Request) -> Response {
        let builder = if HEALTH_TARGETS.contains(&req.path.as_str()) {
            ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "application/json")
                .body(HEALTH_BODY)
        } else if self.hello_route && req.path_only() == HELLO_PATH {
            let name = req.query_arg("name").unwrap_or_default();
            ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "text/plain")
                .body(say_hello_to(&name, UserType::FirstTime))
        } else {
            ResponseBuilder::new(StatusCode::NotFound)
                .header("Content-Type", "text/plain")
                .body(NOT_FOUND_BODY)
        };

        builder.header("Server", SERVER_NAME).build()
    }
}

/// Routes with the default table (healthcheck and 404 only).
pub fn route(req: &Request) -> Response {
    Router::default().route(req)
}
