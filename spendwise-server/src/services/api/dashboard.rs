use actix_web::web::*;

use crate::handlers::dashboard;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/dashboard")
            .route("/summary", get().to(dashboard::summary))
            .route("/charts", get().to(dashboard::charts)),
    );
}
