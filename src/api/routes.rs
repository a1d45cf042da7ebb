//! REST resource router
//!
//! Mounted under `/api`. No resource endpoints are registered yet; the mount
//! point exists so listing/booking/review CRUD routes can be nested here
//! later without restructuring the server. Until then every sub-path answers
//! 404.

use axum::Router;

/// Build the (currently empty) resource router.
///
/// Register resource endpoints here, e.g.
/// `.route("/listings", get(list_listings).post(create_listing))`.
pub fn resource_router() -> Router {
    Router::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_empty_router_answers_404() {
        for path in ["/", "/listings", "/bookings/1", "/reviews"] {
            let response = resource_router()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {}", path);
        }
    }

    #[tokio::test]
    async fn test_router_is_mountable() {
        let app = Router::new().nest("/api", resource_router());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/listings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
