use std::env;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};
use dotenvy::dotenv;
use env_logger::Env;

use unistyle_catalog::db::establish_connection_pool;
use unistyle_catalog::models::config::ServerConfig;
use unistyle_catalog::repository::DieselRepository;
use unistyle_catalog::routes;
use unistyle_catalog::storage::cloudinary::CloudinaryStorage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let storage = match CloudinaryStorage::new(server_config.cloudinary.clone()) {
        Ok(storage) => storage,
        Err(e) => {
            log::error!("Failed to build image storage client: {e}");
            std::process::exit(1);
        }
    };

    let repo = web::Data::new(DieselRepository::new(pool));
    let storage = web::Data::new(storage);

    log::info!(
        address = server_config.address.as_str(), port = server_config.port;
        "Starting catalog server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(storage.clone())
            .configure(routes::configure)
    })
    .bind((server_config.address.as_str(), server_config.port))?
    .run()
    .await
}
