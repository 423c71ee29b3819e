use std::io;

use actix_web::web;
use marketplace_service::{build_server, create_pool, run_migrations, AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url, config.db_pool_max_size, config.db_pool_timeout)
        .map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let state = web::Data::new(AppState::from_config(pool, &config));
    spawn_outbox_sweeper(state.clone(), config.outbox_sweep_interval);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}

/// Retries notifications whose immediate delivery failed or never ran, and
/// drops expired catalog listings.
fn spawn_outbox_sweeper(state: web::Data<AppState>, interval: std::time::Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(interval);
        loop {
            ticker.tick().await;
            let purged = state.catalog.purge_expired_listings();
            if purged > 0 {
                log::debug!("Purged {} expired catalog listing(s)", purged);
            }
            let state = state.clone();
            match web::block(move || state.notifications.sweep(100)).await {
                Ok(report) if report.sent + report.failed > 0 => {
                    log::info!("Outbox sweep: {} sent, {} failed", report.sent, report.failed);
                }
                Ok(_) => {}
                Err(e) => log::error!("Outbox sweep aborted: {}", e),
            }
        }
    });
}
