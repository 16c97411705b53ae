//! API handlers for the membership service.

pub mod auth;
pub mod health;
