//! Login and registration endpoints.
//! Used by: server.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::Json;
use serde::Serialize;

use crate::auth::credentials::Credential;
use crate::error::{Error, Result};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn throttle(state: &AppState, ip: Option<&str>) -> Result<()> {
    state.rate_limiter.check(ip).map_err(|e| {
        let key = ip.unwrap_or("global");
        tracing::warn!(key = %key, reason = %e, "login throttled");
        crate::console::log_rate_limited(key, &e.to_string());
        state.metrics.record_rate_limited();
        Error::RateLimited(e.to_string())
    })
}

pub async fn login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    Json(credential): Json<Credential>,
) -> Result<Json<LoginResponse>> {
    let ip = peer.map(|ConnectInfo(addr)| addr.ip().to_string());
    throttle(&state, ip.as_deref())?;

    let Some(role) = state.credentials.verify(&credential) else {
        tracing::info!(username = %credential.username, "login rejected");
        crate::console::log_login_failure(&credential.username);
        state.metrics.record_login_failure();
        state.rate_limiter.record_failure(ip.as_deref());
        return Err(Error::Unauthorized("invalid username or password".into()));
    };

    let issued = state.issuer.issue(&credential.username, role)?;
    tracing::info!(sub = %issued.claims.sub, role = %role, jti = %issued.claims.jti, "login succeeded");
    crate::console::log_login(&issued.claims.sub, role.as_str(), &issued.claims.jti);
    state.metrics.record_issue();

    Ok(Json(LoginResponse {
        expires_at: issued.expires_at().to_rfc3339(),
        token: issued.token,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(credential): Json<Credential>,
) -> Result<Json<MessageResponse>> {
    state.credentials.create(&credential)?;
    state.metrics.record_registration();
    Ok(Json(MessageResponse { message: "user registered successfully".into() }))
}
