use serde::{Deserialize, Serialize};

use crate::token::{Expiring, Token};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AccessTokenType {
    Access,
    Refresh,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(rename = "uid")]
    pub user_id: i32,
    #[serde(rename = "exp")]
    pub expiration: u64,
    #[serde(rename = "typ")]
    pub token_type: AccessTokenType,
}

impl Expiring for AccessTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

/// Identity of the caller. Issued by the authentication service; this crate only verifies it.
pub struct AccessToken {}

#[cfg(any(test, feature = "test-utils"))]
impl AccessToken {
    /// Mints a token for tests. Only built with the `test-utils` feature.
    pub fn sign_new(
        claims: &AccessTokenClaims,
        signing_key: &[u8],
    ) -> Result<String, crate::token::TokenError> {
        let json =
            serde_json::to_vec(claims).map_err(|_| crate::token::TokenError::TokenInvalid)?;
        crate::token::sign(json, signing_key)
    }
}

impl Token for AccessToken {
    type Claims = AccessTokenClaims;

    fn token_name() -> &'static str {
        "AccessToken"
    }
}
