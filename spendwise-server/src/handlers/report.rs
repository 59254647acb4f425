use spendwise_common::export::{self, ExportError, ReportFormat};
use spendwise_common::ledger::SpendingAggregator;
use spendwise_common::week;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::borrow::Cow;

use crate::env::Config;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;
use crate::middleware::FromHeaderOrQuery;

const DEFAULT_FORMAT: &str = "csv";
const DEFAULT_WEEKS: u32 = 4;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
    pub weeks: Option<u32>,
}

pub async fn download(
    user_access_token: VerifiedToken<FromHeaderOrQuery>,
    aggregator: web::Data<dyn SpendingAggregator>,
    config: web::Data<Config>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let format = query
        .format
        .as_deref()
        .unwrap_or(DEFAULT_FORMAT)
        .parse::<ReportFormat>()
        .map_err(into_http_error)?;

    let weeks = query.weeks.unwrap_or(DEFAULT_WEEKS);
    if weeks > config.max_report_weeks {
        return Err(HttpErrorResponse::IncorrectlyFormed(Cow::Owned(format!(
            "At most {} weeks can be exported",
            config.max_report_weeks
        ))));
    }

    let report = export::export_weekly_report(
        aggregator.get_ref(),
        user_access_token.claims.user_id,
        format,
        weeks,
        week::today(),
    )
    .await
    .map_err(into_http_error)?;

    Ok(HttpResponse::Ok()
        .content_type(report.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.file_name)],
        })
        .body(report.bytes))
}

fn into_http_error(error: ExportError) -> HttpErrorResponse {
    match error {
        ExportError::UnsupportedFormat(format) => HttpErrorResponse::UnsupportedFormat(
            Cow::Owned(format!("'{format}' is not a report format")),
        ),
        ExportError::UnimplementedFormat(format) => HttpErrorResponse::NotImplemented(
            Cow::Owned(format!("{format} reports are not available yet")),
        ),
        ExportError::InvalidWeekCount(_) => {
            HttpErrorResponse::IncorrectlyFormed(Cow::Borrowed("Week count must be at least 1"))
        }
        ExportError::Persistence(e) => {
            log::error!("{e}");
            HttpErrorResponse::InternalError(Cow::Borrowed("Failed to get weekly spending"))
        }
        e @ ExportError::Rendering(_) => {
            log::error!("{e}");
            HttpErrorResponse::InternalError(Cow::Borrowed("Failed to render report"))
        }
    }
}
