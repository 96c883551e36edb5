//! Authentication implementations.

mod bearer;
mod jwt;

pub use bearer::bearer_token;
pub use jwt::{JwtConfig, JwtTokenVerifier, VerificationKey};
