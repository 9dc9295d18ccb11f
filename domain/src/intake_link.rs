//! This module provides functionality for handling intake links within the domain layer.
//! It generates the shareable links an organization hands to patients, and authorizes
//! the token embedded in an incoming intake request.
//!
//! Links come in two flavours:
//! - expiring links, valid for 24 hours, shared by email or SMS
//! - tablet links, which never expire, bound to a front-desk device
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::intake_link::generate_tablet_link;
//! use service::config::Config;
//!
//! fn example(config: &Config) {
//!     match generate_tablet_link(config, "org-1") {
//!         Ok(url) => println!("Tablet intake link: {url}"),
//!         Err(e) => eprintln!("Error generating intake link: {:?}", e),
//!     }
//! }
//! ```

use crate::error::{DomainErrorKind, Error, IntakeLinkErrorKind, InternalErrorKind};
use intake_auth::{IntakeTokenCodec, RevocationList, TokenPayload};
use log::*;
use service::config::Config;

// re-export the token types callers need alongside these functions
pub use intake_auth::{TokenId, TokenType};

/// Generates an intake link valid for 24 hours for `organization_id`.
pub fn generate_expiring_link(config: &Config, organization_id: &str) -> Result<String, Error> {
    let codec = service::init_token_codec(config);
    let url = codec.expiring_link(organization_id, config.app_base_url())?;
    info!("Generated expiring intake link for organization {organization_id}");
    Ok(url)
}

/// Generates a non-expiring tablet intake link for `organization_id`.
pub fn generate_tablet_link(config: &Config, organization_id: &str) -> Result<String, Error> {
    let codec = service::init_token_codec(config);
    let url = codec.tablet_link(organization_id, config.app_base_url())?;
    info!("Generated tablet intake link for organization {organization_id}");
    Ok(url)
}

/// Verifies an intake token taken from a request path and checks it against the
/// revocation list.
pub fn authorize(
    codec: &IntakeTokenCodec,
    revocations: &dyn RevocationList,
    token: &str,
) -> Result<TokenPayload, Error> {
    let result = codec
        .verify(token)
        .and_then(|payload| revocations.check(token).map(|_| payload));

    match result {
        Ok(payload) => {
            debug!(
                "Authorized {} intake link for organization {}",
                payload.kind, payload.org_id
            );
            Ok(payload)
        }
        Err(e) => {
            let err = Error::from(e);
            match &err.error_kind {
                DomainErrorKind::Internal(InternalErrorKind::Config) => {
                    error!("Intake link verification is misconfigured: {err}")
                }
                DomainErrorKind::Internal(InternalErrorKind::IntakeLink(
                    IntakeLinkErrorKind::Expired,
                )) => info!("Rejected expired intake link"),
                DomainErrorKind::Internal(InternalErrorKind::IntakeLink(kind)) => {
                    debug!("Rejected intake link: {kind:?}")
                }
                _ => warn!("Unexpected intake link error: {err}"),
            }
            Err(err)
        }
    }
}
