//! HTTP handler modules.
//! Used by: server.

pub mod auth;
pub mod health;
pub mod metrics;
pub mod secure;
