//! Endpoints behind the bearer gate.
//! Used by: server.

use axum::Json;
use serde::Serialize;

use crate::auth::gate::AuthUser;
use crate::handlers::auth::MessageResponse;

#[derive(Serialize)]
pub struct ClaimEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// `username` comes from the `name` claim and `user_id` from `sub`; both hold
/// the login name because no separate user identifier exists.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub message: String,
    pub username: String,
    pub user_id: String,
    pub claims: Vec<ClaimEntry>,
}

#[derive(Serialize)]
pub struct DataItem {
    pub id: u32,
    pub name: String,
    pub description: String,
}

pub async fn profile(AuthUser(claims): AuthUser) -> Json<ProfileResponse> {
    let entries = claims
        .pairs()
        .into_iter()
        .map(|(kind, value)| ClaimEntry { kind: kind.into(), value })
        .collect();

    Json(ProfileResponse {
        message: format!("Welcome {}!", claims.name),
        username: claims.name.clone(),
        user_id: claims.sub.clone(),
        claims: entries,
    })
}

pub async fn data(AuthUser(_): AuthUser) -> Json<Vec<DataItem>> {
    let items = (1..=3)
        .map(|id| DataItem {
            id,
            name: format!("Item {}", id),
            description: format!("Description of item {}", id),
        })
        .collect();
    Json(items)
}

/// Reached only through the admin role gate.
pub async fn admin(AuthUser(claims): AuthUser) -> Json<MessageResponse> {
    tracing::info!(sub = %claims.sub, "admin resource accessed");
    Json(MessageResponse {
        message: "this resource is restricted to administrators".into(),
    })
}
