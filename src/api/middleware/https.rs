//! HTTPS redirection stage
//!
//! Plain-HTTP requests are answered with `307 Temporary Redirect` to the
//! HTTPS origin, preserving path and query. A request counts as HTTPS when
//! its URI scheme is `https` or a reverse proxy reports it through
//! `X-Forwarded-Proto`. Without a configured HTTPS port the stage passes
//! every request through.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Redirect target; `port: None` disables redirection
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpsRedirect {
    pub port: Option<u16>,
}

impl HttpsRedirect {
    pub fn new(port: Option<u16>) -> Self {
        Self { port }
    }
}

fn is_https(request: &Request) -> bool {
    if request.uri().scheme_str() == Some("https") {
        return true;
    }

    request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|proto| proto.to_str().ok())
        .map(|proto| proto.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Builds `https://host[:port]/path?query`; the port is omitted when 443
fn https_location(request: &Request, port: u16) -> Option<String> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())?;
    // Strip any port, keeping bracketed IPv6 literals intact
    let host = match host.rfind(':') {
        Some(idx) if !host[idx..].contains(']') => &host[..idx],
        _ => host,
    };

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Some(if port == 443 {
        format!("https://{}{}", host, path_and_query)
    } else {
        format!("https://{}:{}{}", host, port, path_and_query)
    })
}

pub async fn redirect_to_https(
    State(redirect): State<HttpsRedirect>,
    request: Request,
    next: Next,
) -> Response {
    let Some(port) = redirect.port else {
        return next.run(request).await;
    };
    if is_https(&request) {
        return next.run(request).await;
    }

    match https_location(&request, port).and_then(|l| HeaderValue::from_str(&l).ok()) {
        Some(location) => (
            StatusCode::TEMPORARY_REDIRECT,
            [(header::LOCATION, location)],
        )
            .into_response(),
        None => (StatusCode::BAD_REQUEST, "Invalid request").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn_with_state, routing::get, Router};
    use tower::util::ServiceExt;

    fn app(port: Option<u16>) -> Router {
        Router::new()
            .route("/api/books", get(|| async { "books" }))
            .layer(from_fn_with_state(HttpsRedirect::new(port), redirect_to_https))
    }

    fn request(uri: &str, host: Option<&str>, proto: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        if let Some(proto) = proto {
            builder = builder.header("x-forwarded-proto", proto);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn passes_through_without_https_port() {
        let response = app(None)
            .oneshot(request("/api/books", Some("books.io"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn redirects_plain_http_preserving_path_and_query() {
        let response = app(Some(443))
            .oneshot(request("/api/books?page=2", Some("books.io:5000"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://books.io/api/books?page=2"
        );
    }

    #[tokio::test]
    async fn redirect_includes_non_default_port() {
        let response = app(Some(5001))
            .oneshot(request("/api/books", Some("localhost:5000"), None))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://localhost:5001/api/books"
        );
    }

    #[tokio::test]
    async fn forwarded_https_passes_through() {
        let response = app(Some(443))
            .oneshot(request("/api/books", Some("books.io"), Some("HTTPS")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn forwarded_http_redirects() {
        let response = app(Some(443))
            .oneshot(request("/api/books", Some("books.io"), Some("http")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn missing_host_is_bad_request() {
        let response = app(Some(443))
            .oneshot(request("/api/books", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ipv6_host_keeps_brackets() {
        let request = request("/x", Some("[::1]:5000"), None);
        assert_eq!(
            https_location(&request, 5001).as_deref(),
            Some("https://[::1]:5001/x")
        );
    }
}
