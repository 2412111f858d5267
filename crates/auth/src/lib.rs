//! `storefront-auth`: identity boundary.
//!
//! Turns a bearer credential into a [`storefront_core::UserId`]. Decoupled
//! from HTTP; the cart engine never sees tokens.

pub mod claims;
pub mod identity;

pub use claims::{IdentityClaims, TokenValidationError, validate_claims};
pub use identity::{Hs256JwtValidator, Identity, IdentityError, IdentityProvider};
