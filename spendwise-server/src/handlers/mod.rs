pub mod budget;
pub mod dashboard;
pub mod health;
pub mod report;

pub mod error {
    use spendwise_common::token::TokenError;

    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use serde::{Deserialize, Serialize};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ErrorType {
        IncorrectlyFormed,
        InvalidAmount,
        UnsupportedFormat,
        IncorrectCredential,
        TokenExpired,
        TokenMissing,
        WrongTokenType,
        InternalError,
        NotImplemented,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ServerErrorResponse {
        pub err_type: ErrorType,
        pub err_message: String,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(Cow<'static, str>),
        InvalidAmount(Cow<'static, str>),
        UnsupportedFormat(Cow<'static, str>),

        // 401
        BadToken(Cow<'static, str>),
        TokenExpired(Cow<'static, str>),
        TokenMissing(Cow<'static, str>),
        WrongTokenType(Cow<'static, str>),

        // 500
        InternalError(Cow<'static, str>),

        // 501
        NotImplemented(Cow<'static, str>),
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::InvalidAmount(msg) => ServerErrorResponse {
                    err_type: ErrorType::InvalidAmount,
                    err_message: format!("Invalid amount: {msg}"),
                },
                HttpErrorResponse::UnsupportedFormat(msg) => ServerErrorResponse {
                    err_type: ErrorType::UnsupportedFormat,
                    err_message: format!("Unsupported format: {msg}"),
                },

                // 401
                HttpErrorResponse::BadToken(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectCredential,
                    err_message: format!("Bad token: {msg}"),
                },
                HttpErrorResponse::TokenExpired(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenExpired,
                    err_message: format!("Token expired: {msg}"),
                },
                HttpErrorResponse::TokenMissing(msg) => ServerErrorResponse {
                    err_type: ErrorType::TokenMissing,
                    err_message: format!("Token missing: {msg}"),
                },
                HttpErrorResponse::WrongTokenType(msg) => ServerErrorResponse {
                    err_type: ErrorType::WrongTokenType,
                    err_message: format!("Wrong token type: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: format!("Internal error: {msg}"),
                },

                // 501
                HttpErrorResponse::NotImplemented(msg) => ServerErrorResponse {
                    err_type: ErrorType::NotImplemented,
                    err_message: format!("Not implemented: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::InvalidAmount(_)
                | HttpErrorResponse::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_)
                | HttpErrorResponse::WrongTokenType(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                HttpErrorResponse::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            }
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(err: TokenError) -> Self {
            match err {
                TokenError::TokenInvalid => {
                    HttpErrorResponse::BadToken(Cow::Borrowed("Invalid token"))
                }
                TokenError::TokenExpired => {
                    HttpErrorResponse::TokenExpired(Cow::Borrowed("Token expired"))
                }
                TokenError::TokenMissing => {
                    HttpErrorResponse::TokenMissing(Cow::Borrowed("Missing token"))
                }
                TokenError::WrongTokenType => {
                    HttpErrorResponse::WrongTokenType(Cow::Borrowed("Wrong token type"))
                }
            }
        }
    }

}
