use spendwise_common::dashboard::{self, BudgetError};
use spendwise_common::ledger::BudgetStore;
use spendwise_common::week;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;
use crate::middleware::FromHeader;

#[derive(Debug, Deserialize)]
pub struct NewBudgetAmount {
    pub amount: f64,
}

/// Sets the budget for the week containing today, replacing the amount if one is already set.
pub async fn set_for_current_week(
    user_access_token: VerifiedToken<FromHeader>,
    budget_store: web::Data<dyn BudgetStore>,
    new_budget: web::Json<NewBudgetAmount>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget = match dashboard::set_budget_for_current_week(
        budget_store.get_ref(),
        user_access_token.claims.user_id,
        new_budget.amount,
        week::today(),
    )
    .await
    {
        Ok(b) => b,
        Err(BudgetError::InvalidAmount(amount)) => {
            return Err(HttpErrorResponse::InvalidAmount(Cow::Owned(format!(
                "Budget amount must be greater than zero, got {amount}"
            ))));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to save budget",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(budget))
}

#[cfg(test)]
mod tests {
    use super::*;

    use spendwise_common::ledger::memory::MemoryLedger;
    use spendwise_common::models::budget::Budget;
    use spendwise_common::week::WeekRange;

    use actix_web::body::to_bytes;
    use actix_web::http::{header, StatusCode};
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;
    use serde_json::json;
    use std::sync::Arc;

    use crate::env;
    use crate::handlers::error::{ErrorType, ServerErrorResponse};
    use crate::handlers::test_utils;

    #[actix_web::test]
    async fn test_set_budget() {
        let ledger = Arc::new(MemoryLedger::new());
        let (budget_store, aggregator) = test_utils::store_data(&ledger);
        let config = Data::new(env::testing::config());

        let app = test::init_service(
            App::new()
                .app_data(budget_store)
                .app_data(aggregator)
                .app_data(config.clone())
                .configure(crate::services::api::configure),
        )
        .await;

        let access_token = test_utils::gen_access_token(8, &config);

        let req = TestRequest::post()
            .uri("/api/budgets")
            .insert_header((header::AUTHORIZATION, format!("Bearer {access_token}")))
            .set_json(json!({ "amount": 500000.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);

        let resp_body = to_bytes(resp.into_body()).await.unwrap();
        let first: Budget = serde_json::from_slice(&resp_body).unwrap();

        let week = WeekRange::current();
        assert_eq!(first.user_id, 8);
        assert_eq!(first.start_date, week.start);
        assert_eq!(first.end_date, week.end);
        assert_eq!(first.amount, 500000.0);

        let req = TestRequest::post()
            .uri("/api/budgets")
            .insert_header((header::AUTHORIZATION, format!("Bearer {access_token}")))
            .set_json(json!({ "amount": 250000.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);

        let resp_body = to_bytes(resp.into_body()).await.unwrap();
        let second: Budget = serde_json::from_slice(&resp_body).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.amount, 250000.0);

        let active = ledger
            .get_active_budget(8, week::today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active, second);
    }

    #[actix_web::test]
    async fn test_set_budget_rejects_bad_amounts() {
        let ledger = Arc::new(MemoryLedger::new());
        let (budget_store, aggregator) = test_utils::store_data(&ledger);
        let config = Data::new(env::testing::config());

        let app = test::init_service(
            App::new()
                .app_data(budget_store)
                .app_data(aggregator)
                .app_data(config.clone())
                .configure(crate::services::api::configure),
        )
        .await;

        let access_token = test_utils::gen_access_token(8, &config);

        for amount in [-5.0, 0.0] {
            let req = TestRequest::post()
                .uri("/api/budgets")
                .insert_header((header::AUTHORIZATION, format!("Bearer {access_token}")))
                .set_json(json!({ "amount": amount }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let resp_body = to_bytes(resp.into_body()).await.unwrap();
            let err: ServerErrorResponse = serde_json::from_slice(&resp_body).unwrap();
            assert_eq!(err.err_type, ErrorType::InvalidAmount);
        }

        let req = TestRequest::post()
            .uri("/api/budgets")
            .insert_header((header::AUTHORIZATION, format!("Bearer {access_token}")))
            .set_json(json!({ "amount": "lots" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp_body = to_bytes(resp.into_body()).await.unwrap();
        let err: ServerErrorResponse = serde_json::from_slice(&resp_body).unwrap();
        assert_eq!(err.err_type, ErrorType::IncorrectlyFormed);

        assert!(ledger
            .get_active_budget(8, week::today())
            .await
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn test_set_budget_requires_access_token() {
        let ledger = Arc::new(MemoryLedger::new());
        let (budget_store, aggregator) = test_utils::store_data(&ledger);
        let config = Data::new(env::testing::config());

        let app = test::init_service(
            App::new()
                .app_data(budget_store)
                .app_data(aggregator)
                .app_data(config.clone())
                .configure(crate::services::api::configure),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/budgets")
            .set_json(json!({ "amount": 100.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp_body = to_bytes(resp.into_body()).await.unwrap();
        let err: ServerErrorResponse = serde_json::from_slice(&resp_body).unwrap();
        assert_eq!(err.err_type, ErrorType::TokenMissing);

        assert!(ledger
            .get_active_budget(8, week::today())
            .await
            .unwrap()
            .is_none());
    }
}
