use spendwise_common::db::{self, DbAsyncPool};
use spendwise_common::ledger::memory::MemoryLedger;
use spendwise_common::ledger::{BudgetStore, SpendingAggregator};

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use std::sync::Arc;

mod env;
mod handlers;
mod middleware;
mod services;

use env::{Config, StoreBackend};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let logger = Logger::try_with_str(&config.log_level)
        .map(|logger| {
            logger
                .log_to_file(FileSpec::default().directory("./logs"))
                .rotate(
                    Criterion::Age(Age::Day),
                    Naming::Timestamps,
                    Cleanup::KeepLogAndCompressedFiles(60, 365),
                )
                .cleanup_in_background_thread(true)
                .duplicate_to_stdout(Duplicate::All)
                .write_mode(WriteMode::Async)
                .format(|writer, now, record| {
                    write!(
                        writer,
                        "{:5} | {} | {}:{} | {}",
                        record.level(),
                        now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                        record.module_path().unwrap_or("<unknown>"),
                        record.line().unwrap_or(0),
                        record.args()
                    )
                })
                .use_utc()
        })
        .and_then(|logger| logger.start());

    let _logger = match logger {
        Ok(l) => l,
        Err(e) => {
            eprintln!("ERROR: Failed to start logger: {e}");
            std::process::exit(1);
        }
    };

    let base_addr = format!("127.0.0.1:{}", &port);
    let actix_workers = config.actix_worker_count;

    let (budget_store, aggregator, db_async_pool): (
        Arc<dyn BudgetStore>,
        Arc<dyn SpendingAggregator>,
        Option<DbAsyncPool>,
    ) = match (config.store_backend, config.db.as_ref()) {
        (StoreBackend::Postgres, Some(db_config)) => {
            log::info!("Connecting to database...");

            // To prevent resource starvation, max connections must be at least as large as the
            // number of actix workers
            let db_max_connections = db_config.max_connections.max(actix_workers as u32);

            let db_async_pool = match db::create_db_async_pool(
                &db_config.database_uri(),
                db_max_connections,
                db_config.idle_timeout,
                db_config.connection_timeout,
            )
            .await
            {
                Ok(p) => p,
                Err(e) => {
                    log::error!("{e}");
                    eprintln!("ERROR: Failed to connect to database");
                    std::process::exit(1);
                }
            };

            log::info!("Successfully connected to database");

            let budget_store: Arc<dyn BudgetStore> =
                Arc::new(db::budget::Dao::new(&db_async_pool));
            let aggregator: Arc<dyn SpendingAggregator> =
                Arc::new(db::spending::Dao::new(&db_async_pool));

            (budget_store, aggregator, Some(db_async_pool))
        }
        (StoreBackend::Postgres, None) => {
            eprintln!("ERROR: Postgres backend selected but no database is configured");
            std::process::exit(1);
        }
        (StoreBackend::Memory, _) => {
            log::warn!("Using the in-memory store. Data will be lost when the server stops.");

            let ledger = Arc::new(MemoryLedger::new());
            let budget_store: Arc<dyn BudgetStore> = ledger.clone();
            let aggregator: Arc<dyn SpendingAggregator> = ledger;

            (budget_store, aggregator, None)
        }
    };

    let config = Data::new(config);
    let budget_store = Data::from(budget_store);
    let aggregator = Data::from(aggregator);
    let db_async_pool = db_async_pool.map(Data::new);

    log::info!("Listening on {base_addr} with {actix_workers} workers");

    HttpServer::new(move || {
        let app = App::new()
            .app_data(config.clone())
            .app_data(budget_store.clone())
            .app_data(aggregator.clone());

        let app = match &db_async_pool {
            Some(pool) => app.app_data(pool.clone()),
            None => app,
        };

        app.configure(services::api::configure)
            .wrap(middleware::request_logger())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    Ok(())
}
