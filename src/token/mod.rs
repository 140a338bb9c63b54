//! Token claims, issuance, and verification.
//! Used by: auth, handlers, state.

pub mod claims;
pub mod issue;
pub mod verify;
