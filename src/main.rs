mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::services::card_source::YgoProDeckClient;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    // RUST_LOG=debug,sea_orm=info pour plus de détails
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duelvault=info,actix_web=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    tracing::info!("🔌 Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    tracing::info!("✅ Database connected!");

    if config.auto_create_schema {
        db::create_schema(&db).await.map_err(io::Error::other)?;
        tracing::info!("📦 Schema ready");
    }

    let client = YgoProDeckClient::new(&config.card_api_base_url, config.card_api_timeout)
        .map_err(io::Error::other)?;

    let bind = (config.host.clone(), config.port);
    tracing::info!("🚀 Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let config = web::Data::new(config);
    let client = web::Data::new(client);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(client.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await
}
