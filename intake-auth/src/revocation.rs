//! Optional revocation of individual intake tokens.
//!
//! Verification itself stays stateless. Callers that want early revocation consult a
//! `RevocationList` after a token verifies. Minting is deterministic, so the signature
//! segment names exactly one minted token and serves as its identifier.

use std::fmt;

use dashmap::DashSet;

use crate::error::{token_error, Error, TokenErrorKind};

/// Identifier of a minted token: its signature segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId(String);

impl TokenId {
    /// Extract the identifier from a token string.
    ///
    /// Returns `None` when the token has no non-empty signature segment.
    pub fn of(token: &str) -> Option<Self> {
        match token.rsplit_once('.') {
            Some((_, signature)) if !signature.is_empty() => Some(Self(signature.to_string())),
            _ => None,
        }
    }

    /// Wrap an identifier that was stored or configured on its own.
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Denylist of tokens that must be rejected before their natural expiry.
pub trait RevocationList: Send + Sync {
    fn is_revoked(&self, id: &TokenId) -> bool;

    fn revoke(&self, id: TokenId);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail with a `Revoked` token error if `token` is on the list.
    fn check(&self, token: &str) -> Result<(), Error> {
        match TokenId::of(token) {
            Some(id) if self.is_revoked(&id) => {
                Err(token_error(TokenErrorKind::Revoked, "Token has been revoked"))
            }
            _ => Ok(()),
        }
    }
}

/// Process-local revocation list.
#[derive(Debug, Default)]
pub struct InMemoryRevocationList {
    revoked: DashSet<TokenId>,
}

impl InMemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the list from configured identifiers, skipping blanks.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = Self::new();
        for id in ids {
            let id = id.as_ref().trim();
            if !id.is_empty() {
                list.revoke(TokenId::from_string(id.to_string()));
            }
        }
        list
    }
}

impl RevocationList for InMemoryRevocationList {
    fn is_revoked(&self, id: &TokenId) -> bool {
        self.revoked.contains(id)
    }

    fn revoke(&self, id: TokenId) {
        self.revoked.insert(id);
    }

    fn len(&self) -> usize {
        self.revoked.len()
    }
}

/// Revocation list that never revokes anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRevocation;

impl RevocationList for NoRevocation {
    fn is_revoked(&self, _id: &TokenId) -> bool {
        false
    }

    fn revoke(&self, _id: TokenId) {}

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{mint, TokenPayload};

    #[test]
    fn test_token_id_is_signature_segment() {
        let token = mint(&TokenPayload::tablet("org-1"), "s3cret").unwrap();
        let id = TokenId::of(&token).unwrap();
        assert!(token.ends_with(&format!(".{id}")));
    }

    #[test]
    fn test_token_id_requires_signature() {
        assert!(TokenId::of("no-separator").is_none());
        assert!(TokenId::of("payload.").is_none());
    }

    #[test]
    fn test_revoked_token_is_rejected() {
        let revoked = mint(&TokenPayload::tablet("org-1"), "s3cret").unwrap();
        let other = mint(&TokenPayload::tablet("org-2"), "s3cret").unwrap();

        let list = InMemoryRevocationList::new();
        list.revoke(TokenId::of(&revoked).unwrap());

        assert_eq!(
            list.check(&revoked).unwrap_err().error_kind,
            crate::error::ErrorKind::Token(TokenErrorKind::Revoked)
        );
        assert!(list.check(&other).is_ok());
    }

    #[test]
    fn test_with_ids_skips_blank_entries() {
        let list = InMemoryRevocationList::with_ids(["abc", " ", "", " def "]);
        assert_eq!(list.len(), 2);
        assert!(list.is_revoked(&TokenId::from_string("def".to_string())));
    }

    #[test]
    fn test_no_revocation_never_revokes() {
        let list = NoRevocation;
        list.revoke(TokenId::from_string("abc".to_string()));
        assert!(list.is_empty());
        assert!(list.check("payload.abc").is_ok());
    }
}
