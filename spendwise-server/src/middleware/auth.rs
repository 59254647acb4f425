use spendwise_common::token::access_token::{AccessToken, AccessTokenClaims, AccessTokenType};
use spendwise_common::token::{Token, TokenError};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future;
use std::borrow::Cow;
use std::marker::PhantomData;

use crate::env::Config;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::TokenLocation;

/// A verified, unexpired access token taken from location `L`.
#[derive(Debug)]
pub struct VerifiedToken<L: TokenLocation> {
    pub claims: AccessTokenClaims,
    _marker: PhantomData<L>,
}

impl<L> FromRequest for VerifiedToken<L>
where
    L: TokenLocation,
{
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<Config>>() else {
            log::error!(
                "Config missing from app data; cannot verify {}",
                AccessToken::token_name()
            );
            return future::err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Server is misconfigured",
            )));
        };

        match verify_token::<L>(req, &config.token_signing_key) {
            Ok(claims) => future::ok(VerifiedToken {
                claims,
                _marker: PhantomData,
            }),
            Err(e) => future::err(e.into()),
        }
    }
}

#[inline]
fn verify_token<L: TokenLocation>(
    req: &HttpRequest,
    signing_key: &[u8],
) -> Result<AccessTokenClaims, TokenError> {
    let token = L::get_from_request(req).ok_or(TokenError::TokenMissing)?;

    let decoded = AccessToken::decode(&token)?;
    let claims = decoded.verify(signing_key)?;

    if claims.token_type != AccessTokenType::Access {
        return Err(TokenError::WrongTokenType);
    }

    Ok(claims.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::header;
    use actix_web::test::TestRequest;
    use actix_web::ResponseError;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use crate::env;
    use crate::handlers::test_utils;
    use crate::middleware::{FromHeader, FromQuery};

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_verified_from_header() {
        let config = web::Data::new(env::testing::config());
        let token = test_utils::gen_access_token(42, &config);

        let req = TestRequest::default()
            .app_data(config.clone())
            .insert_header(bearer(&token))
            .to_http_request();

        let verified = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(verified.claims.user_id, 42);

        assert!(
            VerifiedToken::<FromQuery>::from_request(&req, &mut Payload::None)
                .await
                .is_err()
        );
    }

    #[actix_web::test]
    async fn test_verified_from_query() {
        let config = web::Data::new(env::testing::config());
        let token = test_utils::gen_access_token(42, &config);

        let req = TestRequest::default()
            .app_data(config.clone())
            .uri(&format!("/api/reports/download?access_token={token}"))
            .to_http_request();

        let verified = VerifiedToken::<FromQuery>::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(verified.claims.user_id, 42);
    }

    #[actix_web::test]
    async fn test_rejected_tokens() {
        let config = web::Data::new(env::testing::config());

        let req = TestRequest::default()
            .app_data(config.clone())
            .to_http_request();
        let err = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpErrorResponse::TokenMissing(_)));

        let refresh_token = test_utils::gen_token(42, AccessTokenType::Refresh, &config);
        let req = TestRequest::default()
            .app_data(config.clone())
            .insert_header(bearer(&refresh_token))
            .to_http_request();
        let err = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpErrorResponse::WrongTokenType(_)));

        let expired_claims = AccessTokenClaims {
            user_id: 42,
            expiration: (SystemTime::now() - Duration::from_secs(10))
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            token_type: AccessTokenType::Access,
        };
        let expired_token =
            AccessToken::sign_new(&expired_claims, &config.token_signing_key).unwrap();
        let req = TestRequest::default()
            .app_data(config.clone())
            .insert_header(bearer(&expired_token))
            .to_http_request();
        let err = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpErrorResponse::TokenExpired(_)));

        let forged_token = AccessToken::sign_new(&expired_claims, &[1; 64]).unwrap();
        let req = TestRequest::default()
            .app_data(config.clone())
            .insert_header(bearer(&forged_token))
            .to_http_request();
        let err = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, HttpErrorResponse::BadToken(_)));
        assert_eq!(err.status_code(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_missing_config_is_internal_error() {
        let config = env::testing::config();
        let token = test_utils::gen_access_token(42, &config);

        let req = TestRequest::default()
            .insert_header(bearer(&token))
            .to_http_request();
        let err = VerifiedToken::<FromHeader>::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpErrorResponse::InternalError(_)));
    }
}
