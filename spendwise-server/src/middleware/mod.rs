pub mod auth;

use actix_web::dev::ServiceRequest;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{web, HttpRequest};
use serde::Deserialize;
use std::borrow::Cow;

const BEARER_PREFIX: &str = "Bearer ";

// Path only (`%U`). Query strings can carry access tokens, so `%r`, `%q` and the referer are
// never logged.
const REQUEST_LOG_FORMAT: &str = r#"%a "%{METHOD}xi %U" %s %b "%{User-Agent}i" %T"#;

pub fn request_logger() -> Logger {
    Logger::new(REQUEST_LOG_FORMAT)
        .custom_request_replace("METHOD", |req: &ServiceRequest| req.method().to_string())
}

pub trait TokenLocation {
    fn get_from_request(req: &HttpRequest) -> Option<Cow<'_, str>>;
}

/// `Authorization: Bearer <token>`
#[derive(Debug)]
pub struct FromHeader {}

/// `?access_token=<token>`, for links that can't carry headers (e.g. file downloads)
#[derive(Debug)]
pub struct FromQuery {}

#[derive(Debug)]
pub struct FromHeaderOrQuery {}

#[derive(Deserialize)]
struct AccessTokenQuery {
    access_token: String,
}

impl TokenLocation for FromHeader {
    fn get_from_request(req: &HttpRequest) -> Option<Cow<'_, str>> {
        let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = header.strip_prefix(BEARER_PREFIX)?.trim();

        if token.is_empty() {
            return None;
        }

        Some(Cow::Borrowed(token))
    }
}

impl TokenLocation for FromQuery {
    fn get_from_request(req: &HttpRequest) -> Option<Cow<'_, str>> {
        let query = web::Query::<AccessTokenQuery>::from_query(req.query_string()).ok()?;
        let token = query.into_inner().access_token;

        if token.is_empty() {
            return None;
        }

        Some(Cow::Owned(token))
    }
}

impl TokenLocation for FromHeaderOrQuery {
    fn get_from_request(req: &HttpRequest) -> Option<Cow<'_, str>> {
        FromHeader::get_from_request(req).or_else(|| FromQuery::get_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::{App, HttpResponse};

    #[test]
    fn test_request_log_format_leaves_out_query() {
        for placeholder in ["%r", "%q", "Referer"] {
            assert!(!REQUEST_LOG_FORMAT.contains(placeholder), "{placeholder}");
        }
        assert!(REQUEST_LOG_FORMAT.contains("%U"));
    }

    #[actix_web::test]
    async fn test_request_logger_serves_requests() {
        let app = test::init_service(
            App::new()
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .wrap(request_logger()),
        )
        .await;

        let req = TestRequest::get()
            .uri("/ping?access_token=secret")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_from_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(FromHeader::get_from_request(&req).as_deref(), Some("abc123"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc123"))
            .to_http_request();
        assert!(FromHeader::get_from_request(&req).is_none());

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(FromHeader::get_from_request(&req).is_none());

        let req = TestRequest::default().to_http_request();
        assert!(FromHeader::get_from_request(&req).is_none());
    }

    #[test]
    fn test_from_query() {
        let req = TestRequest::default()
            .uri("/api/reports/download?format=csv&access_token=abc%3D%3D&weeks=2")
            .to_http_request();
        assert_eq!(FromQuery::get_from_request(&req).as_deref(), Some("abc=="));

        let req = TestRequest::default()
            .uri("/api/reports/download?not_access_token=abc")
            .to_http_request();
        assert!(FromQuery::get_from_request(&req).is_none());
    }

    #[test]
    fn test_header_takes_precedence_over_query() {
        let req = TestRequest::default()
            .uri("/api/reports/download?access_token=from_query")
            .insert_header((header::AUTHORIZATION, "Bearer from_header"))
            .to_http_request();
        assert_eq!(
            FromHeaderOrQuery::get_from_request(&req).as_deref(),
            Some("from_header")
        );

        let req = TestRequest::default()
            .uri("/api/reports/download?access_token=from_query")
            .to_http_request();
        assert_eq!(
            FromHeaderOrQuery::get_from_request(&req).as_deref(),
            Some("from_query")
        );
    }
}
