use actix_web::web::*;

use crate::handlers::budget;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/budgets").route(post().to(budget::set_for_current_week)));
}
