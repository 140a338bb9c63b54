//! Credential checks and request gating.
//! Used by: handlers, server, state.

pub mod credentials;
pub mod gate;
