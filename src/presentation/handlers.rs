use crate::domain::auth::Principal;
use crate::presentation::middleware::GraphqlOperation;
use crate::presentation::schema::BooklistSchema;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

pub const GRAPHQL_PATH: &str = "/graphql";

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

/// Executes a GraphQL operation, forwarding the principal resolved by
/// `JwtAuthMiddleware` (if any) to the resolvers.
#[instrument(skip_all, fields(operation))]
pub async fn graphql(
    schema: web::Data<BooklistSchema>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(name) = request.operation_name.as_deref() {
        tracing::Span::current().record("operation", name);
        http_req
            .extensions_mut()
            .insert(GraphqlOperation(name.to_string()));
    }

    let principal = http_req.extensions().get::<Principal>().cloned();
    if let Some(principal) = principal {
        debug!(user_id = %principal.user_id, "Authenticated GraphQL request");
        request = request.data(principal);
    }

    schema.execute(request).await.into()
}

pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

/// Registers `/graphql` (POST for operations, GET for GraphiQL) and `/health`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::resource(GRAPHQL_PATH)
            .route(web::post().to(graphql))
            .route(web::get().to(graphiql)),
    );
}
