//! # Membership
//!
//! `membership` is a small authentication service. Members sign up with an
//! identifier and a password, log in to receive an access/refresh token pair,
//! verify access tokens, and rotate refresh tokens.
//!
//! ## Layout
//!
//! - [`auth`]: members, password hashing, the token issuer, the credential
//!   stores and the `AuthService` that orchestrates them.
//! - [`api`]: the axum router, the response envelope and the single
//!   `AuthError` to HTTP status mapping.
//! - [`cli`]: argument parsing, telemetry setup and server startup.
//! - [`vault`]: approle login and KV read used to fetch the token secret.
//!
//! ## Tokens
//!
//! Tokens are compact HS256 JWTs. Access and refresh tokens share the signing
//! key and are told apart by their `typ` claim, so one can never be used in
//! place of the other.

pub mod api;
pub mod auth;
pub mod cli;
pub mod vault;
