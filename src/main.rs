use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use booklist_api::application::auth_service::AuthService;
use booklist_api::application::library_service::LibraryService;
use booklist_api::data::book_repository::InMemoryBookRepository;
use booklist_api::data::user_repository::InMemoryUserRepository;
use booklist_api::infrastructure::config::AppConfig;
use booklist_api::infrastructure::logging::init_logging;
use booklist_api::presentation::handlers::configure;
use booklist_api::presentation::middleware::{JwtAuthMiddleware, RequestLogMiddleware};
use booklist_api::presentation::schema::build_schema;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    init_logging(&config.log_level);
    info!("Logging initialized successfully");
    if config.using_default_secret {
        warn!("JWT_SECRET is not set, using the development secret");
    }

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let book_repository = Arc::new(InMemoryBookRepository::new());
    info!("Repositories created");

    let auth_service = Arc::new(AuthService::new(
        user_repository.clone(),
        book_repository.clone(),
        config.jwt_secret.clone(),
        config.token_ttl_secs,
    ));
    let library_service = Arc::new(LibraryService::new(user_repository, book_repository));
    let schema = web::Data::new(build_schema(auth_service, library_service));
    info!("GraphQL schema built");

    let jwt_secret = config.jwt_secret.clone();
    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .app_data(schema.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(RequestLogMiddleware)
            .wrap(Cors::permissive())
            .configure(configure)
    });

    info!(address = %config.bind_addr, "Starting HTTP server, GraphiQL at /graphql");
    server.bind(&config.bind_addr)?.run().await?;
    Ok(())
}
