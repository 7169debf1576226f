use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use config::ConfigError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{health_check, subscribers};
use crate::storage::{StoreError, SubscriberStore};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Failed to load the configuration.")]
    Configuration(#[from] ConfigError),
    #[error("Failed to open the database.")]
    Database(#[from] sqlx::Error),
    #[error("Failed to create the subscriber table.")]
    Schema(#[from] StoreError),
    #[error("Failed to run the server.")]
    Server(#[from] std::io::Error),
}

impl Application {
    /// Opens the database, makes sure the schema exists and binds the listener.
    /// No request is served before all three succeeded.
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        tracing::info!("Using database '{}'", config.get_db_path());

        let db_pool = get_connection_db_pool(&config.database).await?;
        let store = SubscriberStore::new(db_pool);

        store.ensure_schema().await?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, store: SubscriberStore) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .configure(subscribers::configure)
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn get_connection_db_pool(config: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_with(config.get_db_options())
        .await
}
