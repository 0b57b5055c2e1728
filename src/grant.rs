//! Client configuration (data) and grant strategies (behavior).
//!
//! `client` holds the validated OAuth client settings shared by every exchange. `request`
//! models the form body of a single exchange. `strategy` defines [`GrantStrategy`], the
//! one extension point a concrete provider customizes to perform its primary grant; the
//! refresh exchange never goes through it.

pub mod client;
pub mod request;
pub mod strategy;

pub use client::*;
pub use request::*;
pub use strategy::*;
