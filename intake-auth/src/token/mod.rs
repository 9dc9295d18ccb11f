//! Intake capability tokens.

mod codec;
mod link;
mod payload;

pub use codec::{mint, verify, verify_at, IntakeTokenCodec};
pub use link::{
    mint_expiring_link, mint_expiring_link_at, mint_tablet_link, EXPIRING_LINK_TTL_HOURS,
    INTAKE_PATH, TABLET_INTAKE_PATH,
};
pub use payload::{TokenPayload, TokenType};
