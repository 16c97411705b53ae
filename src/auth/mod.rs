//! Member authentication core.
//!
//! ## Token lifecycle
//!
//! `signup` registers a member without issuing tokens. `login` checks the
//! secret and the HTTP layer then issues an access/refresh pair. Access tokens
//! are short-lived and verified statelessly. Refresh tokens are single use:
//! each refresh revokes the presented token id and issues a new pair.
//!
//! ## Enumeration
//!
//! Login never reveals whether an identifier exists. Unknown identifiers,
//! wrong secrets and suspended members all produce the same `None`, and an
//! unknown identifier still pays for one argon2 verification.

pub mod error;
pub mod member;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use member::{Credential, Member, MemberProfile, MemberStatus};
pub use service::AuthService;
pub use store::{CredentialStore, MemoryStore, PgStore};
pub use token::{TokenConfig, TokenIssuer, TokenKind, TokenPair};
