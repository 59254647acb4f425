use spendwise_common::dashboard;
use spendwise_common::ledger::{BudgetStore, SpendingAggregator};
use spendwise_common::week;

use actix_web::{web, HttpResponse};
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;
use crate::middleware::FromHeader;

pub async fn summary(
    user_access_token: VerifiedToken<FromHeader>,
    budget_store: web::Data<dyn BudgetStore>,
    aggregator: web::Data<dyn SpendingAggregator>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let summary = match dashboard::summary(
        budget_store.get_ref(),
        aggregator.get_ref(),
        user_access_token.claims.user_id,
        week::today(),
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get spending summary",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(summary))
}

pub async fn charts(
    user_access_token: VerifiedToken<FromHeader>,
    aggregator: web::Data<dyn SpendingAggregator>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let charts = match dashboard::charts(
        aggregator.get_ref(),
        user_access_token.claims.user_id,
        week::today(),
    )
    .await
    {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get spending charts",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(charts))
}
