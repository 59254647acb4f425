pub mod access_token;

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LENGTH: usize = 32;
const MAX_TOKEN_LENGTH: usize = 8192;

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    TokenInvalid,
    TokenExpired,
    TokenMissing,
    WrongTokenType,
}

impl std::error::Error for TokenError {}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenInvalid => write!(f, "TokenInvalid"),
            TokenError::TokenExpired => write!(f, "TokenExpired"),
            TokenError::TokenMissing => write!(f, "TokenMissing"),
            TokenError::WrongTokenType => write!(f, "WrongTokenType"),
        }
    }
}

pub trait Expiring {
    fn expiration(&self) -> u64;
}

/// A token that has been decoded but whose signature and expiration have not been checked.
#[derive(Debug)]
pub struct DecodedToken<C>
where
    C: Expiring + DeserializeOwned,
{
    json: Vec<u8>,
    signature: Vec<u8>,
    pub claims: C,
}

impl<C> DecodedToken<C>
where
    C: Expiring + DeserializeOwned,
{
    pub fn verify(&self, key: &[u8]) -> Result<&C, TokenError> {
        let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
            return Err(TokenError::TokenInvalid);
        };
        mac.update(&self.json);

        // Constant-time comparison
        if mac.verify_slice(&self.signature).is_err() {
            return Err(TokenError::TokenInvalid);
        }

        let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return Err(TokenError::TokenInvalid);
        };

        if self.claims.expiration() <= now.as_secs() {
            return Err(TokenError::TokenExpired);
        }

        Ok(&self.claims)
    }
}

/// Tokens are the URL-safe base64 encoding of the JSON claims followed by an HMAC-SHA256
/// signature of those claims.
pub trait Token {
    type Claims: Expiring + DeserializeOwned;

    fn token_name() -> &'static str;

    fn decode(token: &str) -> Result<DecodedToken<Self::Claims>, TokenError> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let decoded_token = b64_urlsafe
            .decode(token)
            .map_err(|_| TokenError::TokenInvalid)?;

        if decoded_token.len() <= SIGNATURE_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let json_len = decoded_token.len() - SIGNATURE_LENGTH;
        let json = &decoded_token[..json_len];

        let claims: Self::Claims =
            serde_json::from_slice(json).map_err(|_| TokenError::TokenInvalid)?;

        Ok(DecodedToken {
            json: Vec::from(json),
            signature: Vec::from(&decoded_token[json_len..]),
            claims,
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub(crate) fn sign(json: Vec<u8>, signing_key: &[u8]) -> Result<String, TokenError> {
    let mut token_unencoded = json;

    let mut mac =
        HmacSha256::new_from_slice(signing_key).map_err(|_| TokenError::TokenInvalid)?;
    mac.update(&token_unencoded);
    token_unencoded.extend_from_slice(&mac.finalize().into_bytes());

    Ok(b64_urlsafe.encode(&token_unencoded))
}
