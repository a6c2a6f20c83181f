//! Path → handler table.
//!
//! Route errors after a successful parse keep the legacy contract: a JSON
//! error body with 200 status, connection stays open until the response is
//! written.

use serde_json::json;

use crate::server::response::{Response, SmallResponse};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Returns the response body and content type for a request path. The query
/// string is ignored for routing.
pub fn route(path: &str, response: &Response) -> (Vec<u8>, &'static str) {
    let clean = path.split('?').next().unwrap_or(path);
    let body = match clean {
        "/" | "/api/all" => response.to_json(),
        "/api/tls" => pretty(&json!({ "tls": response.tls })),
        "/api/clean" => pretty(&SmallResponse::from(response)),
        "/api/raw" => pretty(&response.tls.raw_surface()),
        _ => pretty(&json!({ "error": "page not found" })),
    };
    (body, CONTENT_TYPE_JSON)
}

fn pretty<T: serde::Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"{}".to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::response::Http2Details;

    fn sample() -> Response {
        Response {
            http_version: "h2".to_string(),
            method: "GET".to_string(),
            http2: Some(Http2Details::build(Vec::new())),
            ..Response::default()
        }
    }

    #[test]
    fn known_paths_route() {
        let res = sample();
        for path in ["/", "/api/all", "/api/tls", "/api/clean", "/api/raw"] {
            let (body, ctype) = route(path, &res);
            assert_eq!(ctype, CONTENT_TYPE_JSON);
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert!(value.get("error").is_none(), "{path} should not error");
        }
    }

    #[test]
    fn query_strings_are_ignored() {
        let res = sample();
        let (body, _) = route("/api/clean?by=something", &res);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(value.get("ja3").is_some());
    }

    #[test]
    fn unknown_path_errors_with_json() {
        let res = sample();
        let (body, ctype) = route("/definitely-not-a-page", &res);
        assert_eq!(ctype, CONTENT_TYPE_JSON);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value.get("error").and_then(|v| v.as_str()),
            Some("page not found")
        );
    }
}
