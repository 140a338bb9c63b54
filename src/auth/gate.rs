//! Bearer-token middleware, authenticated-caller extractor, and role gate.
//! Used by: server, handlers::secure.

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::token::claims::{Claims, Role};

fn bearer_token(request: &Request) -> Result<&str> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::BearerRequired("missing authorization header".into()))?
        .to_str()
        .map_err(|_| Error::BearerRequired("authorization header is not valid ASCII".into()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(Error::BearerRequired("authorization header must use Bearer scheme".into())),
    }
}

/// Verifies the bearer token and stores its claims in request extensions.
/// Nothing behind this layer runs for an unauthenticated request.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let claims = match bearer_token(&request) {
        Ok(token) => state.verifier.verify(token).map_err(|e| {
            tracing::warn!(reason = e.kind(), "bearer token rejected");
            crate::console::log_reject(e.kind());
            state.metrics.record_reject();
            Error::from(e)
        })?,
        Err(e) => {
            tracing::warn!(reason = %e, "authentication failed");
            state.metrics.record_reject();
            return Err(e);
        }
    };

    state.metrics.record_verify();
    tracing::debug!(sub = %claims.sub, jti = %claims.jti, "bearer token accepted");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Accepts iff the role claim equals `required`.
pub fn authorize(claims: &Claims, required: Role) -> Result<()> {
    if claims.role == required {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            required, claims.role
        )))
    }
}

/// Role gate for admin-only routes. Must sit inside `require_bearer`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| Error::BearerRequired("no verified claims on request".into()))?;

    if let Err(e) = authorize(claims, Role::Admin) {
        tracing::warn!(sub = %claims.sub, role = %claims.role, "admin route forbidden");
        crate::console::log_forbidden(&claims.sub, claims.role.as_str());
        state.metrics.record_forbidden();
        return Err(e);
    }
    Ok(next.run(request).await)
}

/// Claims of the authenticated caller, as injected by `require_bearer`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| Error::BearerRequired("no verified claims on request".into()))
    }
}
