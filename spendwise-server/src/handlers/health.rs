use spendwise_common::db::DbAsyncPool;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::env::Config;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    config: web::Data<Config>,
    db_async_pool: Option<web::Data<DbAsyncPool>>,
    query: web::Query<HealthKeyQuery>,
) -> impl Responder {
    if !is_health_key_correct(query.key.as_deref(), &config.health_endpoint_key) {
        return HttpResponse::Unauthorized().finish();
    }

    let resp_body = match db_async_pool {
        Some(db_async_pool) => {
            let async_pool_state = db_async_pool.state();
            json!({
                "store_backend": "postgres",
                "db_async_pool_state": {
                    "connections": async_pool_state.connections,
                    "idle_connections": async_pool_state.idle_connections
                }
            })
        }
        None => json!({ "store_backend": "memory" }),
    };

    HttpResponse::Ok().json(resp_body)
}

#[inline]
fn is_health_key_correct(key: Option<&str>, correct_key: &str) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = correct_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Compare every byte so the time taken doesn't depend on where the keys differ
    let keys_dont_match = correct_key
        .iter()
        .zip(key)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    keys_dont_match == 0
}
