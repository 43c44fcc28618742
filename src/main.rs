use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use campus_events_server::app_state::AppState;
use campus_events_server::config::Config;
use campus_events_server::notify::smtp::SmtpMailer;
use campus_events_server::notify::Dispatcher;
use campus_events_server::routes::create_routes;
use campus_events_server::store::{PgStore, Store};
use campus_events_server::workflow::WorkflowService;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let mailer = SmtpMailer::from_config(&config.smtp).expect("Failed to configure SMTP transport");
    let dispatcher =
        Dispatcher::new(store.clone(), Arc::new(mailer)).with_timeout(config.smtp.timeout);
    let workflow = Arc::new(WorkflowService::new(store.clone(), dispatcher));

    let app = create_routes(AppState::new(store, workflow));

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
