//! Domain layer for patient intake.
//!
//! Consumers of the `domain` crate work with intake links, intake submissions and the
//! storage seam for them, without depending on `intake-auth` error types directly.
pub use intake_auth::{TokenPayload, TokenType};

pub mod error;
pub mod intake;
pub mod intake_link;
pub mod intake_store;
