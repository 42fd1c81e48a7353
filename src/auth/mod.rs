//! Request authentication.
//!
//! Dual-token system: short-lived stateless JWT access tokens and
//! long-lived opaque refresh tokens tracked in the database. Protected
//! handlers authenticate through the [`ApiAuth`] extractor, which verifies
//! the bearer access token and falls back to refresh-token resolution.

mod bearer;
mod errors;
mod extractors;
mod guard;
mod password;
mod state;

pub use bearer::{extract_api_key, extract_bearer};
pub use errors::AuthError;
pub use extractors::ApiAuth;
pub use guard::assert_owner;
pub use password::{hash_password, verify_password};
pub use state::HasAuthState;
