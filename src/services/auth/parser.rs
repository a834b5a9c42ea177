//! Compact token parser (`header.claims.signature`).
//!
//! The default parser accepts any supported algorithm and validates `exp` /
//! `nbf` when they are present. `ParserSettings` customises the allowed
//! algorithms, clock leeway, numeric-date handling, or turns claim validation
//! off entirely. Both go through the same `parse` call.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;

use super::claims::{Claims, NumericDates};
use super::error::{AuthError, Result};
use super::signing;
use super::token::{Header, Token, epoch_now};

#[derive(Debug, Clone, Default)]
pub struct ParserSettings {
    /// Allowed `alg` identifiers. Empty means every supported algorithm.
    pub valid_methods: Vec<String>,
    pub leeway_seconds: u64,
    pub skip_claims_validation: bool,
    pub numeric_dates: NumericDates,
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    settings: ParserSettings,
}

impl Parser {
    pub fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parse and verify `raw` with `key`.
    pub fn parse(&self, raw: &str, key: &[u8]) -> Result<Token> {
        self.parse_at(raw, key, epoch_now())
    }

    pub fn parse_at(&self, raw: &str, key: &[u8], now: i64) -> Result<Token> {
        let (signing_input, signature) = raw
            .rsplit_once('.')
            .ok_or(AuthError::MalformedToken("token must have three segments"))?;
        let (header_b64, claims_b64) = signing_input
            .split_once('.')
            .ok_or(AuthError::MalformedToken("token must have three segments"))?;
        if claims_b64.contains('.') {
            return Err(AuthError::MalformedToken("token must have three segments"));
        }

        let header: Header = decode_segment(
            header_b64,
            "header is not base64url",
            "header is not a JSON object",
        )?;
        let claims: Claims = decode_segment(
            claims_b64,
            "claims are not base64url",
            "claims are not a JSON object",
        )?;

        let method = signing::method_for(&header.alg)?;
        if !self.settings.valid_methods.is_empty()
            && !self.settings.valid_methods.iter().any(|m| m == method.name())
        {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        method.verify(signing_input.as_bytes(), signature, key)?;

        let expires_at = claims.numeric_date("exp", self.settings.numeric_dates);
        if !self.settings.skip_claims_validation {
            self.validate_times(&claims, expires_at, now)?;
        }

        Ok(Token {
            header,
            claims,
            method,
            valid: true,
            raw: raw.to_string(),
            expires_at,
        })
    }

    fn validate_times(&self, claims: &Claims, expires_at: Option<i64>, now: i64) -> Result<()> {
        let leeway = i64::try_from(self.settings.leeway_seconds).unwrap_or(i64::MAX);

        if let Some(exp) = expires_at {
            if now > exp.saturating_add(leeway) {
                return Err(AuthError::Expired);
            }
        }
        if let Some(nbf) = claims.numeric_date("nbf", self.settings.numeric_dates) {
            if now.saturating_add(leeway) < nbf {
                return Err(AuthError::NotYetValid);
            }
        }
        Ok(())
    }
}

fn decode_segment<T: DeserializeOwned>(
    segment: &str,
    not_base64: &'static str,
    not_json: &'static str,
) -> Result<T> {
    // tolerate padded input
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| AuthError::MalformedToken(not_base64))?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken(not_json))
}

pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn sign(alg: &str, claims: serde_json::Value, key: &[u8]) -> String {
        let header = encode_segment(&serde_json::to_vec(&Header::new(alg)).unwrap());
        let claims = encode_segment(&serde_json::to_vec(&claims).unwrap());
        let input = format!("{header}.{claims}");
        let sig = signing::method_for(alg).unwrap().sign(input.as_bytes(), key).unwrap();
        format!("{input}.{sig}")
    }

    #[test]
    fn parses_a_signed_token() {
        let raw = sign("HS256", json!({"sub": "alice", "exp": NOW + 60}), b"k");
        let token = Parser::default().parse_at(&raw, b"k", NOW).unwrap();

        assert!(token.valid);
        assert_eq!(token.alg(), "HS256");
        assert_eq!(token.subject(), Some("alice"));
        assert_eq!(token.expires_at, Some(NOW + 60));
        assert_eq!(token.raw, raw);
        assert_eq!(token.header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        let p = Parser::default();
        for raw in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(matches!(
                p.parse_at(raw, b"k", NOW),
                Err(AuthError::MalformedToken(_))
            ));
        }
    }

    #[test]
    fn rejects_garbage_segments() {
        let p = Parser::default();
        let claims = encode_segment(b"{}");
        let not_json = encode_segment(b"nope");

        assert!(matches!(
            p.parse_at(&format!("!!.{claims}.sig"), b"k", NOW),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            p.parse_at(&format!("{not_json}.{claims}.sig"), b"k", NOW),
            Err(AuthError::MalformedToken(_))
        ));

        let header = encode_segment(br#"{"alg":"HS256"}"#);
        let array = encode_segment(b"[1,2]");
        assert!(matches!(
            p.parse_at(&format!("{header}.{array}.sig"), b"k", NOW),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let header = encode_segment(br#"{"alg":"none"}"#);
        let claims = encode_segment(b"{}");
        let err = Parser::default()
            .parse_at(&format!("{header}.{claims}."), b"k", NOW)
            .unwrap_err();
        assert_eq!(err, AuthError::UnsupportedAlgorithm("none".into()));
    }

    #[test]
    fn rejects_bad_signature() {
        let raw = sign("HS256", json!({"sub": "alice"}), b"k");
        assert_eq!(
            Parser::default().parse_at(&raw, b"other", NOW).unwrap_err(),
            AuthError::SignatureInvalid
        );

        let (input, _) = raw.rsplit_once('.').unwrap();
        assert_eq!(
            Parser::default()
                .parse_at(&format!("{input}.AAAA"), b"k", NOW)
                .unwrap_err(),
            AuthError::SignatureInvalid
        );
    }

    #[test]
    fn valid_methods_restrict_algorithms() {
        let raw = sign("HS384", json!({}), b"k");
        let p = Parser::new(ParserSettings {
            valid_methods: vec!["HS256".into()],
            ..Default::default()
        });
        assert_eq!(
            p.parse_at(&raw, b"k", NOW).unwrap_err(),
            AuthError::UnsupportedAlgorithm("HS384".into())
        );
    }

    #[test]
    fn validates_exp_and_nbf_with_leeway() {
        let expired = sign("HS256", json!({"exp": NOW - 10}), b"k");
        let early = sign("HS256", json!({"nbf": NOW + 10}), b"k");

        let strict = Parser::default();
        assert_eq!(strict.parse_at(&expired, b"k", NOW).unwrap_err(), AuthError::Expired);
        assert_eq!(strict.parse_at(&early, b"k", NOW).unwrap_err(), AuthError::NotYetValid);

        let lenient = Parser::new(ParserSettings {
            leeway_seconds: 30,
            ..Default::default()
        });
        assert!(lenient.parse_at(&expired, b"k", NOW).is_ok());
        assert!(lenient.parse_at(&early, b"k", NOW).is_ok());
    }

    #[test]
    fn skip_claims_validation_still_reads_exp() {
        let expired = sign("HS256", json!({"exp": NOW - 10}), b"k");
        let p = Parser::new(ParserSettings {
            skip_claims_validation: true,
            ..Default::default()
        });
        let token = p.parse_at(&expired, b"k", NOW).unwrap();
        assert_eq!(token.expires_at, Some(NOW - 10));
        assert!(token.is_expired_at(NOW, 0));
        assert!(!token.is_expired_at(NOW, 10));
        assert!(token.is_expired_at(NOW, 9));
    }

    #[test]
    fn strict_numeric_dates_ignore_string_exp() {
        let raw = sign("HS256", json!({"exp": (NOW - 10).to_string()}), b"k");

        assert_eq!(
            Parser::default().parse_at(&raw, b"k", NOW).unwrap_err(),
            AuthError::Expired
        );

        let strict = Parser::new(ParserSettings {
            numeric_dates: NumericDates::Strict,
            ..Default::default()
        });
        let token = strict.parse_at(&raw, b"k", NOW).unwrap();
        assert_eq!(token.expires_at, None);
    }
}
