//! HMAC-SHA256 signed intake tokens.
//!
//! A token is `base64url(JSON(payload)) "." base64url(HMAC-SHA256(secret, payloadSegment))`,
//! both segments without padding. The MAC always covers the payload segment exactly
//! as received, never a re-serialization of the decoded payload.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use super::link;
use super::{TokenPayload, TokenType};
use crate::error::{configuration_error, token_error, token_error_from, Error, TokenErrorKind};
use crate::secret::IntakeSecret;

type HmacSha256 = Hmac<Sha256>;

/// Byte length of an HMAC-SHA256 digest.
const SIGNATURE_LEN: usize = 32;

/// Mint a token for `payload`.
///
/// Deterministic: the same payload and secret always produce the same token.
pub fn mint(payload: &TokenPayload, secret: &str) -> Result<String, Error> {
    let mut mac = keyed_mac(secret)?;

    if payload.org_id.is_empty() {
        return Err(token_error(
            TokenErrorKind::InvalidPayload,
            "orgId must not be empty",
        ));
    }
    if payload.kind == TokenType::Expiring && payload.exp.is_none() {
        return Err(token_error(
            TokenErrorKind::InvalidPayload,
            "expiring tokens require exp",
        ));
    }

    let json = serde_json::to_vec(payload)
        .map_err(|e| token_error_from(TokenErrorKind::InvalidPayload, e))?;
    let payload_segment = URL_SAFE_NO_PAD.encode(json);

    mac.update(payload_segment.as_bytes());
    let signature_segment = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{payload_segment}.{signature_segment}"))
}

/// Verify `token` against the current wall clock.
pub fn verify(token: &str, secret: &str) -> Result<TokenPayload, Error> {
    verify_at(token, secret, Utc::now().timestamp_millis())
}

/// Verify `token` as of `now_ms` (milliseconds since the Unix epoch).
pub fn verify_at(token: &str, secret: &str, now_ms: i64) -> Result<TokenPayload, Error> {
    verify_with_leeway(token, secret, now_ms, 0)
}

fn verify_with_leeway(
    token: &str,
    secret: &str,
    now_ms: i64,
    leeway_ms: i64,
) -> Result<TokenPayload, Error> {
    let mut mac = keyed_mac(secret)?;

    let (payload_segment, signature_segment) = split_segments(token)?;
    let payload = decode_payload(payload_segment)?;

    let supplied = URL_SAFE_NO_PAD
        .decode(signature_segment)
        .map_err(|e| token_error_from(TokenErrorKind::Malformed, e))?;

    // Only the length leaks here; the content comparison below is constant-time.
    if supplied.len() != SIGNATURE_LEN {
        return Err(token_error(
            TokenErrorKind::InvalidSignature,
            "Signature length mismatch",
        ));
    }

    mac.update(payload_segment.as_bytes());
    mac.verify_slice(&supplied)
        .map_err(|_| token_error(TokenErrorKind::InvalidSignature, "Signature mismatch"))?;

    check_expiry(&payload, now_ms, leeway_ms)?;

    Ok(payload)
}

fn keyed_mac(secret: &str) -> Result<HmacSha256, Error> {
    if secret.is_empty() {
        error!("Intake token operation attempted without a signing secret");
        return Err(configuration_error("INTAKE_FORM_SECRET is not set"));
    }

    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| configuration_error("Invalid HMAC key"))
}

fn split_segments(token: &str) -> Result<(&str, &str), Error> {
    let (payload_segment, signature_segment) = token
        .split_once('.')
        .ok_or_else(|| token_error(TokenErrorKind::Malformed, "Missing segment separator"))?;

    if payload_segment.is_empty() || signature_segment.is_empty() {
        return Err(token_error(TokenErrorKind::Malformed, "Empty token segment"));
    }
    if signature_segment.contains('.') {
        return Err(token_error(TokenErrorKind::Malformed, "Too many token segments"));
    }

    Ok((payload_segment, signature_segment))
}

fn decode_payload(payload_segment: &str) -> Result<TokenPayload, Error> {
    let json = URL_SAFE_NO_PAD
        .decode(payload_segment)
        .map_err(|e| token_error_from(TokenErrorKind::Malformed, e))?;

    let payload: TokenPayload = serde_json::from_slice(&json)
        .map_err(|e| token_error_from(TokenErrorKind::Malformed, e))?;

    if payload.org_id.is_empty() {
        return Err(token_error(TokenErrorKind::Malformed, "Empty orgId"));
    }

    Ok(payload)
}

fn check_expiry(payload: &TokenPayload, now_ms: i64, leeway_ms: i64) -> Result<(), Error> {
    match payload.kind {
        TokenType::Tablet => Ok(()),
        TokenType::Expiring => {
            let exp = payload.exp.ok_or_else(|| {
                token_error(TokenErrorKind::Expired, "Expiring token without exp")
            })?;

            // Invalid at the exact millisecond of the deadline.
            if now_ms >= exp.saturating_add(leeway_ms) {
                return Err(token_error(
                    TokenErrorKind::Expired,
                    &format!("Token expired at {exp}, current time is {now_ms}"),
                ));
            }
            Ok(())
        }
    }
}

/// Mints and verifies intake tokens with the process-wide secret.
///
/// The secret may be absent; every operation then fails with a configuration error
/// instead of minting or accepting anything.
#[derive(Clone, Debug)]
pub struct IntakeTokenCodec {
    secret: Option<IntakeSecret>,
    leeway: Duration,
}

impl IntakeTokenCodec {
    pub fn new(secret: Option<IntakeSecret>) -> Self {
        Self {
            secret,
            leeway: Duration::zero(),
        }
    }

    /// Keep accepting expiring tokens for `leeway` past `exp`, for verifiers whose clock
    /// runs ahead of the minting instance.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    pub fn mint(&self, payload: &TokenPayload) -> Result<String, Error> {
        mint(payload, self.secret())
    }

    pub fn verify(&self, token: &str) -> Result<TokenPayload, Error> {
        self.verify_at(token, Utc::now().timestamp_millis())
    }

    pub fn verify_at(&self, token: &str, now_ms: i64) -> Result<TokenPayload, Error> {
        verify_with_leeway(token, self.secret(), now_ms, self.leeway.num_milliseconds())
    }

    /// Shareable link valid for 24 hours from now.
    pub fn expiring_link(&self, org_id: &str, base_url: Option<&str>) -> Result<String, Error> {
        link::mint_expiring_link(org_id, self.secret(), base_url)
    }

    /// Non-expiring link for a front-desk tablet.
    pub fn tablet_link(&self, org_id: &str, base_url: Option<&str>) -> Result<String, Error> {
        link::mint_tablet_link(org_id, self.secret(), base_url)
    }

    fn secret(&self) -> &str {
        self.secret.as_ref().map(IntakeSecret::expose).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SECRET: &str = "s3cret";
    const T: i64 = 1_760_000_000_000;

    fn kind_of(result: Result<TokenPayload, Error>) -> ErrorKind {
        result.expect_err("verification should fail").error_kind
    }

    fn signed(payload_json: &str, secret: &str) -> String {
        let payload_segment = URL_SAFE_NO_PAD.encode(payload_json);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload_segment.as_bytes());
        format!(
            "{payload_segment}.{}",
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        )
    }

    #[test]
    fn test_tablet_token_round_trip() {
        let token = mint(&TokenPayload::tablet("org-1"), SECRET).unwrap();
        let payload = verify(&token, SECRET).unwrap();
        assert_eq!(payload, TokenPayload::tablet("org-1"));
    }

    #[test]
    fn test_round_trip_preserves_payload() {
        let payloads = [
            TokenPayload::tablet("org-1"),
            TokenPayload::tablet("7f9c2ba4-e88f-11e4-b9b2-1697f925ec7b"),
            TokenPayload::tablet("clinique-générale/北京"),
            TokenPayload::expiring("org-2", T),
            TokenPayload::expiring("org-3", i64::MAX),
        ];

        for payload in payloads {
            let token = mint(&payload, SECRET).unwrap();
            assert_eq!(verify_at(&token, SECRET, T - 1).unwrap(), payload);
        }
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = mint(&TokenPayload::expiring("org-1", T), SECRET).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'));
        assert_eq!(token.matches('.').count(), 1);
    }

    #[test]
    fn test_mint_is_deterministic() {
        let payload = TokenPayload::expiring("org-1", T);
        assert_eq!(mint(&payload, SECRET).unwrap(), mint(&payload, SECRET).unwrap());
    }

    #[test]
    fn test_signature_covers_encoded_payload_segment() {
        // Key order differs from what `mint` would produce; it still verifies because
        // the MAC covers the received segment, not a re-serialization.
        let token = signed(r#"{"type":"tablet","orgId":"org-1"}"#, SECRET);
        assert_eq!(verify(&token, SECRET).unwrap(), TokenPayload::tablet("org-1"));
    }

    #[test]
    fn test_single_character_tamper_is_rejected() {
        let token = mint(&TokenPayload::expiring("org-1", T), SECRET).unwrap();

        for (index, original) in token.char_indices() {
            if original == '.' {
                continue;
            }
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(index..index + 1, &replacement.to_string());

            match kind_of(verify_at(&tampered, SECRET, T - 1)) {
                ErrorKind::Token(TokenErrorKind::Malformed)
                | ErrorKind::Token(TokenErrorKind::InvalidSignature) => {}
                other => panic!("unexpected error kind {other:?} at index {index}"),
            }
        }
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let pairs = [("s3cret", "s3cret2"), ("a", "b"), ("s3cret", "S3CRET")];

        for (secret_a, secret_b) in pairs {
            let token = mint(&TokenPayload::tablet("org-1"), secret_a).unwrap();
            assert_eq!(
                kind_of(verify(&token, secret_b)),
                ErrorKind::Token(TokenErrorKind::InvalidSignature)
            );
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let token = mint(&TokenPayload::expiring("org-1", T), SECRET).unwrap();

        assert!(verify_at(&token, SECRET, T - 1).is_ok());
        assert_eq!(
            kind_of(verify_at(&token, SECRET, T)),
            ErrorKind::Token(TokenErrorKind::Expired)
        );
        assert_eq!(
            kind_of(verify_at(&token, SECRET, T + 1)),
            ErrorKind::Token(TokenErrorKind::Expired)
        );
    }

    #[test]
    fn test_expiring_token_without_exp_is_expired() {
        let token = signed(r#"{"orgId":"org-1","type":"expiring"}"#, SECRET);
        assert_eq!(
            kind_of(verify(&token, SECRET)),
            ErrorKind::Token(TokenErrorKind::Expired)
        );
    }

    #[test]
    fn test_tablet_tokens_never_expire() {
        let token = mint(&TokenPayload::tablet("org-1"), SECRET).unwrap();
        let now = Utc::now().timestamp_millis();
        let ten_years = Duration::days(3653).num_milliseconds();

        assert!(verify_at(&token, SECRET, now).is_ok());
        assert!(verify_at(&token, SECRET, now + ten_years).is_ok());
    }

    #[test]
    fn test_tablet_token_ignores_exp() {
        let token = signed(r#"{"orgId":"org-1","type":"tablet","exp":1}"#, SECRET);
        let payload = verify_at(&token, SECRET, T).unwrap();
        assert_eq!(payload.kind, TokenType::Tablet);
    }

    #[test]
    fn test_malformed_inputs_are_rejected() {
        let not_json = format!("{}.{}", URL_SAFE_NO_PAD.encode("not json"), "c2ln");
        let missing_org = signed(r#"{"type":"tablet"}"#, SECRET);
        let empty_org = signed(r#"{"orgId":"","type":"tablet"}"#, SECRET);
        let unknown_type = signed(r#"{"orgId":"org-1","type":"kiosk"}"#, SECRET);
        let bad_signature_encoding = format!(
            "{}.not*base64",
            URL_SAFE_NO_PAD.encode(r#"{"orgId":"org-1","type":"tablet"}"#)
        );

        let inputs = [
            "",
            "no-separator",
            "a.b.c",
            ".sig",
            "payload.",
            not_json.as_str(),
            missing_org.as_str(),
            empty_org.as_str(),
            unknown_type.as_str(),
            bad_signature_encoding.as_str(),
        ];

        for input in inputs {
            assert_eq!(
                kind_of(verify(input, SECRET)),
                ErrorKind::Token(TokenErrorKind::Malformed),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_undecodable_json_payload_is_malformed() {
        assert_eq!(
            kind_of(verify("abc.def", SECRET)),
            ErrorKind::Token(TokenErrorKind::Malformed)
        );
    }

    #[test]
    fn test_short_signature_is_length_mismatch() {
        let token = mint(&TokenPayload::tablet("org-1"), SECRET).unwrap();
        let (payload_segment, _) = token.split_once('.').unwrap();
        let truncated = format!("{payload_segment}.{}", URL_SAFE_NO_PAD.encode([0u8; 16]));

        let err = verify(&truncated, SECRET).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::InvalidSignature));
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        let payload = TokenPayload::tablet("org-1");
        assert_eq!(mint(&payload, "").unwrap_err().error_kind, ErrorKind::Configuration);

        let token = mint(&payload, SECRET).unwrap();
        assert_eq!(kind_of(verify(&token, "")), ErrorKind::Configuration);
        assert_eq!(kind_of(verify("anything", "")), ErrorKind::Configuration);
    }

    #[test]
    fn test_mint_rejects_unverifiable_payloads() {
        let empty_org = TokenPayload::tablet("");
        let no_exp = TokenPayload {
            org_id: "org-1".to_string(),
            kind: TokenType::Expiring,
            exp: None,
        };

        for payload in [empty_org, no_exp] {
            assert_eq!(
                mint(&payload, SECRET).unwrap_err().error_kind,
                ErrorKind::Token(TokenErrorKind::InvalidPayload)
            );
        }
    }

    #[test]
    fn test_codec_without_secret_fails_at_operation_time() {
        let codec = IntakeTokenCodec::new(None);
        assert!(codec.mint(&TokenPayload::tablet("org-1")).unwrap_err().is_configuration());
        assert!(codec.verify("abc.def").unwrap_err().is_configuration());
        assert!(codec.tablet_link("org-1", None).unwrap_err().is_configuration());
    }

    #[test]
    fn test_codec_leeway_extends_validity() {
        let codec = IntakeTokenCodec::new(Some(IntakeSecret::new(SECRET)))
            .with_leeway(Duration::milliseconds(500));
        let token = codec.mint(&TokenPayload::expiring("org-1", T)).unwrap();

        assert!(codec.verify_at(&token, T + 499).is_ok());
        assert!(codec.verify_at(&token, T + 500).unwrap_err().is_expired());
    }

    #[test]
    fn test_codec_matches_free_functions() {
        let codec = IntakeTokenCodec::new(Some(IntakeSecret::new(SECRET)));
        let payload = TokenPayload::expiring("org-1", T);

        assert_eq!(codec.mint(&payload).unwrap(), mint(&payload, SECRET).unwrap());
        assert_eq!(codec.leeway(), Duration::zero());
    }
}
