//! HS256 bearer tokens.
//!
//! Tokens are compact JWS strings (`header.claims.signature`, base64url
//! without padding). The only claim is `sub`, the account id as a decimal
//! string. There is no expiry claim, so tokens stay valid for as long as the
//! signing secret does.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALG_HS256: &str = "HS256";
const TYP_JWT: &str = "JWT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: TYP_JWT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is empty")]
    EmptySecret,
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid subject")]
    InvalidSubject,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Signs and verifies tokens with a server-held symmetric secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
}

impl TokenIssuer {
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] if `secret` is empty.
    pub fn new(secret: SecretString) -> Result<Self, TokenError> {
        if secret.expose_secret().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self { secret })
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)
    }

    /// Issue a token whose subject is `account_id`.
    ///
    /// # Errors
    /// Returns an error if the header or claims cannot be encoded.
    pub fn issue(&self, account_id: u64) -> Result<String, TokenError> {
        let header_b64 = b64e_json(&TokenHeader::hs256())?;
        let claims_b64 = b64e_json(&TokenClaims {
            sub: account_id.to_string(),
        })?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify `token` and return the account id it was issued for.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, uses another algorithm,
    /// carries a bad signature, or its subject is not an account id.
    pub fn verify(&self, token: &str) -> Result<u64, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let claims_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        let sig_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
        if parts.next().is_some() || sig_b64.is_empty() {
            return Err(TokenError::TokenFormat);
        }

        let header: TokenHeader = b64d_json(header_b64)?;
        if header.alg != ALG_HS256 {
            return Err(TokenError::UnsupportedAlg(header.alg));
        }

        let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Base64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: TokenClaims = b64d_json(claims_b64)?;
        claims
            .sub
            .parse::<u64>()
            .map_err(|_| TokenError::InvalidSubject)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"***")
            .finish()
    }
}
