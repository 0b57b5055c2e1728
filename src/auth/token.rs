//! Token values produced and consumed by negotiations.

pub mod bearer;
pub mod claims;
pub mod refresh;
pub mod secret;
