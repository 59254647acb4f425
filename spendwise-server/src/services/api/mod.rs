use actix_web::web::*;
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;

mod budget;
mod dashboard;
mod health;
mod report;

const MAX_JSON_PAYLOAD_BYTES: usize = 4096;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .configure(budget::configure)
            .configure(dashboard::configure)
            .configure(health::configure)
            .configure(report::configure),
    );
}

fn json_config() -> JsonConfig {
    JsonConfig::default()
        .limit(MAX_JSON_PAYLOAD_BYTES)
        .error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(Cow::Owned(err.to_string())).into()
        })
}

fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| {
        HttpErrorResponse::IncorrectlyFormed(Cow::Owned(err.to_string())).into()
    })
}
