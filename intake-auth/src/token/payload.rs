//! Intake token payload.

use serde::{Deserialize, Serialize};

/// Which kind of intake link a token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Time-boxed link shared by email or SMS.
    Expiring,
    /// Non-expiring link bound to a front-desk tablet.
    Tablet,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Expiring => "expiring",
            TokenType::Tablet => "tablet",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission to submit patient intake data on behalf of one organization.
///
/// Field order is the JSON key order on the wire: `orgId`, `type`, `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Organization the submission will be scoped to.
    #[serde(rename = "orgId")]
    pub org_id: String,
    #[serde(rename = "type")]
    pub kind: TokenType,
    /// Deadline in milliseconds since the Unix epoch. Ignored for tablet tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenPayload {
    pub fn expiring(org_id: impl Into<String>, exp: i64) -> Self {
        Self {
            org_id: org_id.into(),
            kind: TokenType::Expiring,
            exp: Some(exp),
        }
    }

    pub fn tablet(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            kind: TokenType::Tablet,
            exp: None,
        }
    }
}
