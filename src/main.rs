use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use env_logger::Builder;
use log::{info, LevelFilter};

use minitweet::auth::AuthGate;
use minitweet::config::Config;
use minitweet::handlers;
use minitweet::store::sqlite::SqliteStore;
use minitweet::store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .format_timestamp_secs()
        .init();

    let cfg = Config::from_env();
    info!("Starting minitweet backend on {}", cfg.bind_addr);

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&cfg.database_path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    info!("Opened database at {}", cfg.database_path);

    let gate = web::Data::new(AuthGate::new(&cfg.token_secret, cfg.token_ttl_secs));
    let store = web::Data::from(store);
    let bind_addr = cfg.bind_addr.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(gate.clone())
            .service(handlers::ping)
            .service(handlers::signup)
            .service(handlers::login)
            .service(handlers::tweet)
            .service(handlers::follow)
            .service(handlers::unfollow)
            .service(handlers::get_timeline)
    })
    .bind(bind_addr)?
    .run()
    .await
}
