use std::{fmt, sync::Arc};

use super::claims::Claims;
use super::error::{AuthError, Result};
use super::parser::{Parser, encode_segment};
use super::signing::{self, SigningMethod};
use super::token::{Header, Token};

/// Signs and verifies tokens with one bound signing method.
///
/// - `verify_key` is only meaningful for asymmetric algorithms (public key pem).
///   When it is non-empty it is used for every verification; otherwise
///   `signing_key` is.
/// - Built once at startup and shared read-only (`Arc<Authenticator>`).
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct Authenticator {
    signing_key: Vec<u8>,
    verify_key: Vec<u8>,
    method: Arc<dyn SigningMethod>,
    parser: Parser,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Authenticator")
            .field("method", &self.method.name())
            .field("has_verify_key", &!self.verify_key.is_empty())
            .field("parser", &self.parser)
            .finish()
    }
}

impl Authenticator {
    pub fn new(
        alg: &str,
        signing_key: impl Into<Vec<u8>>,
        verify_key: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        Self::with_parser(alg, Parser::default(), signing_key, verify_key)
    }

    /// Same as `new`, with custom parser settings.
    pub fn with_parser(
        alg: &str,
        parser: Parser,
        signing_key: impl Into<Vec<u8>>,
        verify_key: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let method = signing::method_for(alg)?;

        Ok(Self {
            signing_key: signing_key.into(),
            verify_key: verify_key.into(),
            method,
            parser,
        })
    }

    pub fn method(&self) -> &dyn SigningMethod {
        self.method.as_ref()
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Sign `claims` with the configured method and `signing_key`.
    pub fn encode(&self, claims: Claims) -> Result<(Token, String)> {
        let header = Header::new(self.method.name());

        let header_json =
            serde_json::to_vec(&header).map_err(|e| AuthError::SigningError(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| AuthError::SigningError(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            encode_segment(&header_json),
            encode_segment(&claims_json)
        );
        let signature = self.method.sign(signing_input.as_bytes(), &self.signing_key)?;
        let raw = format!("{signing_input}.{signature}");

        let expires_at = claims.numeric_date("exp", self.parser.settings().numeric_dates);
        let token = Token {
            header,
            claims,
            method: Arc::clone(&self.method),
            valid: false,
            raw: raw.clone(),
            expires_at,
        };

        Ok((token, raw))
    }

    /// Parse and verify `raw`, rejecting tokens not signed with the configured method.
    pub fn decode(&self, raw: &str) -> Result<Token> {
        let token = self.parser.parse(raw, self.verification_key())?;

        if !signing::same_method(token.method.as_ref(), self.method.as_ref()) {
            return Err(AuthError::UnsupportedAlgorithm(token.header.alg));
        }

        Ok(token)
    }

    fn verification_key(&self) -> &[u8] {
        if self.verify_key.is_empty() {
            &self.signing_key
        } else {
            &self.verify_key
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::parser::ParserSettings;
    use crate::services::auth::token::epoch_now;
    use serde_json::json;

    const RSA_PRIVATE: &[u8] = include_bytes!("testdata/rsa_private.pem");
    const RSA_PUBLIC: &[u8] = include_bytes!("testdata/rsa_public.pem");
    const EC_PRIVATE: &[u8] = include_bytes!("testdata/ec_private.pem");
    const EC_PUBLIC: &[u8] = include_bytes!("testdata/ec_public.pem");
    const ED_PRIVATE: &[u8] = include_bytes!("testdata/ed_private.pem");
    const ED_PUBLIC: &[u8] = include_bytes!("testdata/ed_public.pem");

    fn sample_claims() -> Claims {
        Claims::new()
            .with("sub", "user-1")
            .with("exp", epoch_now() + 3600)
            .with("roles", json!(["admin", "dev"]))
            .with("nested", json!({"a": 1}))
    }

    #[test]
    fn hmac_round_trip() {
        let auth = Authenticator::new("HS256", "secret", Vec::new()).unwrap();
        let claims = sample_claims();

        let (encoded, raw) = auth.encode(claims.clone()).unwrap();
        assert!(!encoded.valid);
        assert_eq!(encoded.raw, raw);

        let decoded = auth.decode(&raw).unwrap();
        assert!(decoded.valid);
        assert_eq!(decoded.claims, claims);
        assert_eq!(decoded.alg(), "HS256");
        assert_eq!(decoded.raw, raw);
    }

    #[test]
    fn asymmetric_round_trips_use_verify_key() {
        for (alg, private, public) in [
            ("RS256", RSA_PRIVATE, RSA_PUBLIC),
            ("PS256", RSA_PRIVATE, RSA_PUBLIC),
            ("ES256", EC_PRIVATE, EC_PUBLIC),
            ("EdDSA", ED_PRIVATE, ED_PUBLIC),
        ] {
            let auth = Authenticator::new(alg, private, public).unwrap();
            let claims = sample_claims();
            let (_, raw) = auth.encode(claims.clone()).unwrap();

            let decoded = auth.decode(&raw).unwrap();
            assert!(decoded.valid, "{alg}");
            assert_eq!(decoded.claims, claims, "{alg}");

            // a verifier holding only the public key accepts the same token
            let verifier = Authenticator::new(alg, Vec::new(), public).unwrap();
            assert!(verifier.decode(&raw).is_ok(), "{alg}");
        }
    }

    #[test]
    fn rsa_without_verify_key_does_not_verify() {
        // private pem is not a valid verification key
        let signer = Authenticator::new("RS256", RSA_PRIVATE, RSA_PUBLIC).unwrap();
        let (_, raw) = signer.encode(sample_claims()).unwrap();

        let no_verify_key = Authenticator::new("RS256", RSA_PRIVATE, Vec::new()).unwrap();
        assert_eq!(no_verify_key.decode(&raw).unwrap_err(), AuthError::SignatureInvalid);
    }

    #[test]
    fn different_key_same_algorithm_fails() {
        let a = Authenticator::new("HS256", "key-a", Vec::new()).unwrap();
        let b = Authenticator::new("HS256", "key-b", Vec::new()).unwrap();
        let (_, raw) = a.encode(sample_claims()).unwrap();

        assert_eq!(b.decode(&raw).unwrap_err(), AuthError::SignatureInvalid);
    }

    #[test]
    fn different_algorithm_is_unsupported_even_with_same_secret() {
        let hs384 = Authenticator::new("HS384", "shared", Vec::new()).unwrap();
        let hs256 = Authenticator::new("HS256", "shared", Vec::new()).unwrap();
        let (_, raw) = hs384.encode(sample_claims()).unwrap();

        assert_eq!(
            hs256.decode(&raw).unwrap_err(),
            AuthError::UnsupportedAlgorithm("HS384".into())
        );
    }

    #[test]
    fn hmac_token_is_not_verified_with_rsa_public_key() {
        // algorithm confusion: HS256 token signed with the public key bytes as secret
        let forger = Authenticator::new("HS256", RSA_PUBLIC, Vec::new()).unwrap();
        let (_, forged) = forger.encode(sample_claims()).unwrap();

        let rsa = Authenticator::new("RS256", RSA_PRIVATE, RSA_PUBLIC).unwrap();
        assert_eq!(
            rsa.decode(&forged).unwrap_err(),
            AuthError::UnsupportedAlgorithm("HS256".into())
        );
    }

    #[test]
    fn encode_reports_signing_errors() {
        let auth = Authenticator::new("RS256", "not a pem", Vec::new()).unwrap();
        assert!(matches!(
            auth.encode(sample_claims()),
            Err(AuthError::SigningError(_))
        ));

        let empty = Authenticator::new("HS256", Vec::new(), Vec::new()).unwrap();
        assert!(matches!(
            empty.encode(sample_claims()),
            Err(AuthError::SigningError(_))
        ));
    }

    #[test]
    fn unknown_algorithm_is_rejected_at_construction() {
        assert_eq!(
            Authenticator::new("XS999", "k", Vec::new()).unwrap_err(),
            AuthError::UnsupportedAlgorithm("XS999".into())
        );
    }

    #[test]
    fn custom_parser_is_used_for_decode() {
        let parser = Parser::new(ParserSettings {
            skip_claims_validation: true,
            ..Default::default()
        });
        let auth = Authenticator::with_parser("HS256", parser, "k", Vec::new()).unwrap();
        let (_, raw) = auth
            .encode(Claims::new().with("exp", epoch_now() - 100))
            .unwrap();

        // parser skips exp, so decode itself succeeds
        let token = auth.decode(&raw).unwrap();
        assert!(token.is_expired_at(epoch_now(), 0));

        let default = Authenticator::new("HS256", "k", Vec::new()).unwrap();
        assert_eq!(default.decode(&raw).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn debug_hides_keys() {
        let auth = Authenticator::new("HS256", "super-secret", Vec::new()).unwrap();
        let dbg = format!("{auth:?}");
        assert!(dbg.contains("HS256"));
        assert!(!dbg.contains("super-secret"));
    }
}
