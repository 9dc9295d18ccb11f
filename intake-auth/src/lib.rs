//! # intake-auth
//!
//! Signed capability tokens for the public patient intake form:
//! - Minting and verifying HMAC-SHA256 signed intake tokens
//! - Building shareable intake links (expiring links and tablet links)
//! - An optional revocation list consulted after verification
//!
//! ## Architecture
//!
//! Tokens are self-contained. Validity is derived from the token bytes plus the
//! server-held secret, so no database row or server-side session is needed:
//! - `domain` mints links from the process configuration
//! - `web` verifies the path-embedded token before accepting an intake submission
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intake_auth::token::{mint, verify, TokenPayload};
//!
//! let token = mint(&TokenPayload::tablet("org-1"), "s3cret")?;
//! let payload = verify(&token, "s3cret")?;
//! assert_eq!(payload.org_id, "org-1");
//! ```

pub mod error;
pub mod revocation;
pub mod secret;
pub mod token;

// Re-export commonly used types
pub use error::{Error, ErrorKind, TokenErrorKind};
pub use revocation::{InMemoryRevocationList, NoRevocation, RevocationList, TokenId};
pub use secret::IntakeSecret;
pub use token::{IntakeTokenCodec, TokenPayload, TokenType};
