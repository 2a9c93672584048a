//! Authentication implementations.

mod jwt;

pub use jwt::{AccessClaims, JwtConfig, JwtVerifier};
