//! Shareable intake links.

use chrono::{Duration, Utc};

use super::{mint, TokenPayload};
use crate::error::Error;

/// Validity window of an expiring intake link.
pub const EXPIRING_LINK_TTL_HOURS: i64 = 24;

/// Path prefix for expiring links.
pub const INTAKE_PATH: &str = "/intake";

/// Path prefix for tablet links.
pub const TABLET_INTAKE_PATH: &str = "/intake/tablet";

/// Mint an expiring token valid for 24 hours and format it as `{base_url}/intake/{token}`.
///
/// Without a base URL the link is root-relative.
pub fn mint_expiring_link(
    org_id: &str,
    secret: &str,
    base_url: Option<&str>,
) -> Result<String, Error> {
    mint_expiring_link_at(org_id, secret, base_url, Utc::now().timestamp_millis())
}

/// Same as [`mint_expiring_link`] with an explicit clock reading in milliseconds.
pub fn mint_expiring_link_at(
    org_id: &str,
    secret: &str,
    base_url: Option<&str>,
    now_ms: i64,
) -> Result<String, Error> {
    let exp = now_ms.saturating_add(Duration::hours(EXPIRING_LINK_TTL_HOURS).num_milliseconds());
    let token = mint(&TokenPayload::expiring(org_id, exp), secret)?;

    Ok(format_link(base_url, INTAKE_PATH, &token))
}

/// Mint a non-expiring tablet token and format it as `{base_url}/intake/tablet/{token}`.
pub fn mint_tablet_link(
    org_id: &str,
    secret: &str,
    base_url: Option<&str>,
) -> Result<String, Error> {
    let token = mint(&TokenPayload::tablet(org_id), secret)?;

    Ok(format_link(base_url, TABLET_INTAKE_PATH, &token))
}

fn format_link(base_url: Option<&str>, path: &str, token: &str) -> String {
    let base = base_url.map(|b| b.trim_end_matches('/')).unwrap_or("");
    format!("{base}{path}/{token}")
}
