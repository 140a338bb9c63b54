//! Axum router and server setup.
//! Used by: main.

use std::net::SocketAddr;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::gate;
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/secure/admin", get(handlers::secure::admin))
        .route_layer(from_fn_with_state(state.clone(), gate::require_admin));

    let secure = Router::new()
        .route("/secure/profile", get(handlers::secure::profile))
        .route("/secure/data", get(handlers::secure::data))
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), gate::require_bearer));

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .merge(secure)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(state: AppState, addr: &str) -> std::io::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtSettings;
    use crate::ratelimit::RateLimitConfig;
    use crate::state::{build_test_state, build_test_state_with};
    use crate::token::claims::Role;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        send_to(build_router(state.clone()), request).await
    }

    async fn send_from(
        state: &AppState,
        peer: [u8; 4],
        request: Request<Body>,
    ) -> (StatusCode, HeaderMap, Value) {
        let addr = SocketAddr::from((peer, 40000));
        send_to(build_router(state.clone()).layer(MockConnectInfo(addr)), request).await
    }

    async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).expect("valid request")
    }

    async fn login_token(state: &AppState) -> String {
        let (status, _, body) = send(
            state,
            post_json("/auth/login", json!({"username": "admin", "password": "password"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token string").to_owned()
    }

    #[tokio::test]
    async fn login_with_demo_credentials_returns_token() {
        let state = build_test_state().expect("state");
        let (status, _, body) = send(
            &state,
            post_json("/auth/login", json!({"username": "admin", "password": "password"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["token"].as_str().unwrap_or_default().is_empty());
        assert!(body["expiresAt"].is_string());
        assert_eq!(state.metrics.snapshot().tokens_issued, 1);
    }

    #[tokio::test]
    async fn login_with_other_credentials_returns_401() {
        let state = build_test_state().expect("state");
        for creds in [
            json!({"username": "admin", "password": "wrong"}),
            json!({"username": "guest", "password": "password"}),
            json!({}),
        ] {
            let (status, _, body) = send(&state, post_json("/auth/login", creds)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body["message"].is_string());
        }
        assert_eq!(state.metrics.snapshot().logins_failed, 3);
    }

    #[tokio::test]
    async fn register_validates_fields() {
        let state = build_test_state().expect("state");
        let (ok, _, _) = send(
            &state,
            post_json("/auth/register", json!({"username": "alice", "password": "secret"})),
        )
        .await;
        assert_eq!(ok, StatusCode::OK);

        let (missing, _, body) =
            send(&state, post_json("/auth/register", json!({"username": "alice"}))).await;
        assert_eq!(missing, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn secure_routes_require_bearer() {
        let state = build_test_state().expect("state");
        for uri in ["/secure/profile", "/secure/data", "/secure/admin"] {
            let (status, headers, _) = send(&state, get_with_token(uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(
                headers.get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
                Some("Bearer")
            );
        }
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let state = build_test_state().expect("state");
        let (status, _, body) =
            send(&state, get_with_token("/secure/profile", Some("not.a.token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], json!("invalid token"));
        assert_eq!(state.metrics.snapshot().tokens_rejected, 1);
    }

    #[tokio::test]
    async fn expired_token_returns_401() {
        let state = build_test_state().expect("state");
        let issued = state
            .issuer
            .issue_at("admin", Role::Admin, Utc::now() - chrono::Duration::hours(2))
            .expect("issue");
        let (status, _, _) =
            send(&state, get_with_token("/secure/data", Some(&issued.token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_echoes_caller_claims() {
        let state = build_test_state().expect("state");
        let token = login_token(&state).await;
        let (status, _, body) =
            send(&state, get_with_token("/secure/profile", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], json!("admin"));
        assert_eq!(body["userId"], json!("admin"));
        assert_eq!(body["message"], json!("Welcome admin!"));
        let claims = body["claims"].as_array().expect("claims array");
        assert!(claims.contains(&json!({"type": "role", "value": "Admin"})));
    }

    #[tokio::test]
    async fn data_lists_three_items() {
        let state = build_test_state().expect("state");
        let token = login_token(&state).await;
        let (status, _, body) = send(&state, get_with_token("/secure/data", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(3));
        assert_eq!(body[0]["name"], json!("Item 1"));
    }

    #[tokio::test]
    async fn admin_route_accepts_admin_role() {
        let state = build_test_state().expect("state");
        let token = login_token(&state).await;
        let (status, _, body) = send(&state, get_with_token("/secure/admin", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn admin_route_forbids_user_role() {
        let state = build_test_state().expect("state");
        let issued = state.issuer.issue("alice", Role::User).expect("issue");
        let (status, _, _) =
            send(&state, get_with_token("/secure/admin", Some(&issued.token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(state.metrics.snapshot().forbidden, 1);

        let (status, _, _) =
            send(&state, get_with_token("/secure/profile", Some(&issued.token))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn token_from_foreign_secret_returns_401() {
        let state = build_test_state().expect("state");
        let foreign = build_test_state_with(
            JwtSettings {
                secret_key: "a-completely-different-signing-secret!".into(),
                ..JwtSettings::default()
            },
            RateLimitConfig::default(),
        )
        .expect("state");
        let issued = foreign.issuer.issue("admin", Role::Admin).expect("issue");
        let (status, _, _) =
            send(&state, get_with_token("/secure/admin", Some(&issued.token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn correct_login_survives_repeated_failures() {
        let state = build_test_state().expect("state");
        for _ in 0..25 {
            let (status, _, _) = send(
                &state,
                post_json("/auth/login", json!({"username": "admin", "password": "guess"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        let (status, _, body) = send(
            &state,
            post_json("/auth/login", json!({"username": "admin", "password": "password"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
        assert_eq!(state.metrics.snapshot().rate_limited, 0);
    }

    #[tokio::test]
    async fn failed_logins_throttle_only_the_offending_ip() {
        let state = build_test_state_with(
            JwtSettings::default(),
            RateLimitConfig { global_per_sec: 1000, failures_per_ip_per_min: 3 },
        )
        .expect("state");
        let attacker = [10, 0, 0, 66];
        for _ in 0..3 {
            let (status, _, _) = send_from(
                &state,
                attacker,
                post_json("/auth/login", json!({"username": "admin", "password": "guess"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let good = json!({"username": "admin", "password": "password"});
        let (blocked, _, _) =
            send_from(&state, attacker, post_json("/auth/login", good.clone())).await;
        assert_eq!(blocked, StatusCode::TOO_MANY_REQUESTS);

        let (allowed, _, _) =
            send_from(&state, [10, 0, 0, 7], post_json("/auth/login", good)).await;
        assert_eq!(allowed, StatusCode::OK);
        assert_eq!(state.metrics.snapshot().rate_limited, 1);
    }

    #[tokio::test]
    async fn successful_logins_are_not_throttled() {
        let state = build_test_state_with(
            JwtSettings::default(),
            RateLimitConfig { global_per_sec: 1000, failures_per_ip_per_min: 1 },
        )
        .expect("state");
        for _ in 0..5 {
            let (status, _, _) = send_from(
                &state,
                [10, 0, 0, 7],
                post_json("/auth/login", json!({"username": "admin", "password": "password"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn health_and_metrics_are_public() {
        let state = build_test_state().expect("state");
        let (health, _, body) = send(&state, get_with_token("/health", None)).await;
        assert_eq!(health, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));

        let (metrics, _, body) = send(&state, get_with_token("/metrics", None)).await;
        assert_eq!(metrics, StatusCode::OK);
        assert_eq!(body["tokens_issued"], json!(0));
    }
}
