//! Response headers and cross-origin rules applied to every route.

use axum::http::{
    HeaderValue, Method,
    header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

/// Only allow content, including scripts, from the server's own origin.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'self'; script-src 'self';";

/// The browser origin allowed to call the API when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

/// A layer that adds the `Content-Security-Policy` header to responses that do not set one.
pub fn content_security_policy_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    )
}

/// A layer that only lets browsers at `allowed_origin` make cross-origin requests.
///
/// Requests from any other origin get no `Access-Control-Allow-Origin` header.
pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([allowed_origin]))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{
            HeaderValue,
            header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_SECURITY_POLICY, ORIGIN},
        },
        routing::get,
    };
    use axum_test::TestServer;

    use super::{
        CONTENT_SECURITY_POLICY_VALUE, DEFAULT_ALLOWED_ORIGIN, content_security_policy_layer,
        cors_layer,
    };

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(content_security_policy_layer())
            .layer(cors_layer(HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn sets_content_security_policy() {
        let server = get_test_server();

        let response = server.get("/").await;

        assert_eq!(
            response.header(CONTENT_SECURITY_POLICY),
            CONTENT_SECURITY_POLICY_VALUE
        );
    }

    #[tokio::test]
    async fn allows_configured_origin() {
        let server = get_test_server();

        let response = server
            .get("/")
            .add_header(ORIGIN, HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN))
            .await;

        assert_eq!(
            response.header(ACCESS_CONTROL_ALLOW_ORIGIN),
            DEFAULT_ALLOWED_ORIGIN
        );
    }

    #[tokio::test]
    async fn does_not_allow_other_origins() {
        let server = get_test_server();

        let response = server
            .get("/")
            .add_header(ORIGIN, HeaderValue::from_static("http://evil.example"))
            .await;

        assert!(
            response
                .headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
