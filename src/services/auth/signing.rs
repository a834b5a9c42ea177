//! Signing methods, one implementation per algorithm family.
//!
//! The primitives themselves live in `jsonwebtoken::crypto`; this module only
//! decides which key type a family expects and turns raw key bytes into
//! `EncodingKey` / `DecodingKey`.
//!
//! - HMAC: key bytes are the shared secret.
//! - RSA / RSA-PSS, ECDSA, EdDSA: key bytes are PEM (private key for signing,
//!   public key for verification).

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, crypto};

use super::error::{AuthError, Result};

pub trait SigningMethod: Send + Sync + fmt::Debug {
    /// JOSE `alg` identifier, e.g. `HS256`.
    fn name(&self) -> &'static str;

    fn algorithm(&self) -> Algorithm;

    fn encoding_key(&self, key: &[u8]) -> std::result::Result<EncodingKey, String>;

    fn decoding_key(&self, key: &[u8]) -> std::result::Result<DecodingKey, String>;

    /// Sign `signing_input` (`header.claims`), returning the base64url signature.
    fn sign(&self, signing_input: &[u8], key: &[u8]) -> Result<String> {
        let key = self.encoding_key(key).map_err(AuthError::SigningError)?;
        crypto::sign(signing_input, &key, self.algorithm())
            .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    fn verify(&self, signing_input: &[u8], signature: &str, key: &[u8]) -> Result<()> {
        let key = self.decoding_key(key).map_err(|e| {
            tracing::debug!(alg = self.name(), error = %e, "verify key rejected");
            AuthError::SignatureInvalid
        })?;

        match crypto::verify(signature, signing_input, &key, self.algorithm()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthError::SignatureInvalid),
            Err(e) => {
                tracing::debug!(alg = self.name(), error = %e, "signature check errored");
                Err(AuthError::SignatureInvalid)
            }
        }
    }
}

/// Two methods are the same when they carry the same `alg` identifier.
pub fn same_method(a: &dyn SigningMethod, b: &dyn SigningMethod) -> bool {
    a.name() == b.name()
}

#[derive(Debug, Clone, Copy)]
pub struct Hmac {
    name: &'static str,
    alg: Algorithm,
}

impl SigningMethod for Hmac {
    fn name(&self) -> &'static str {
        self.name
    }

    fn algorithm(&self) -> Algorithm {
        self.alg
    }

    fn encoding_key(&self, key: &[u8]) -> std::result::Result<EncodingKey, String> {
        if key.is_empty() {
            return Err(format!("{} requires a non-empty secret", self.name));
        }
        Ok(EncodingKey::from_secret(key))
    }

    fn decoding_key(&self, key: &[u8]) -> std::result::Result<DecodingKey, String> {
        if key.is_empty() {
            return Err(format!("{} requires a non-empty secret", self.name));
        }
        Ok(DecodingKey::from_secret(key))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rsa {
    name: &'static str,
    alg: Algorithm,
}

impl SigningMethod for Rsa {
    fn name(&self) -> &'static str {
        self.name
    }

    fn algorithm(&self) -> Algorithm {
        self.alg
    }

    fn encoding_key(&self, key: &[u8]) -> std::result::Result<EncodingKey, String> {
        EncodingKey::from_rsa_pem(key).map_err(|e| format!("invalid RSA private key pem: {}", e))
    }

    fn decoding_key(&self, key: &[u8]) -> std::result::Result<DecodingKey, String> {
        DecodingKey::from_rsa_pem(key).map_err(|e| format!("invalid RSA public key pem: {}", e))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ecdsa {
    name: &'static str,
    alg: Algorithm,
}

impl SigningMethod for Ecdsa {
    fn name(&self) -> &'static str {
        self.name
    }

    fn algorithm(&self) -> Algorithm {
        self.alg
    }

    // jsonwebtoken expects PKCS#8 for EC private keys
    fn encoding_key(&self, key: &[u8]) -> std::result::Result<EncodingKey, String> {
        EncodingKey::from_ec_pem(key).map_err(|e| format!("invalid EC private key pem: {}", e))
    }

    fn decoding_key(&self, key: &[u8]) -> std::result::Result<DecodingKey, String> {
        DecodingKey::from_ec_pem(key).map_err(|e| format!("invalid EC public key pem: {}", e))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdDsa;

impl SigningMethod for EdDsa {
    fn name(&self) -> &'static str {
        "EdDSA"
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    fn encoding_key(&self, key: &[u8]) -> std::result::Result<EncodingKey, String> {
        EncodingKey::from_ed_pem(key).map_err(|e| format!("invalid Ed25519 private key pem: {}", e))
    }

    fn decoding_key(&self, key: &[u8]) -> std::result::Result<DecodingKey, String> {
        DecodingKey::from_ed_pem(key).map_err(|e| format!("invalid Ed25519 public key pem: {}", e))
    }
}

/// Look up the signing method for a JOSE `alg` identifier (case-sensitive).
pub fn method_for(alg: &str) -> Result<Arc<dyn SigningMethod>> {
    let method: Arc<dyn SigningMethod> = match alg {
        "HS256" => Arc::new(Hmac { name: "HS256", alg: Algorithm::HS256 }),
        "HS384" => Arc::new(Hmac { name: "HS384", alg: Algorithm::HS384 }),
        "HS512" => Arc::new(Hmac { name: "HS512", alg: Algorithm::HS512 }),
        "RS256" => Arc::new(Rsa { name: "RS256", alg: Algorithm::RS256 }),
        "RS384" => Arc::new(Rsa { name: "RS384", alg: Algorithm::RS384 }),
        "RS512" => Arc::new(Rsa { name: "RS512", alg: Algorithm::RS512 }),
        "PS256" => Arc::new(Rsa { name: "PS256", alg: Algorithm::PS256 }),
        "PS384" => Arc::new(Rsa { name: "PS384", alg: Algorithm::PS384 }),
        "PS512" => Arc::new(Rsa { name: "PS512", alg: Algorithm::PS512 }),
        "ES256" => Arc::new(Ecdsa { name: "ES256", alg: Algorithm::ES256 }),
        "ES384" => Arc::new(Ecdsa { name: "ES384", alg: Algorithm::ES384 }),
        "EdDSA" => Arc::new(EdDsa),
        other => return Err(AuthError::UnsupportedAlgorithm(other.to_string())),
    };
    Ok(method)
}
