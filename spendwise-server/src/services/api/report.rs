use actix_web::web::*;

use crate::handlers::report;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/reports").route("/download", get().to(report::download)));
}
