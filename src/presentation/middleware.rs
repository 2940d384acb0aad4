use crate::domain::auth::Principal;
use crate::infrastructure::security::validate_token;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{AUTHORIZATION, HeaderName, HeaderValue},
};
use std::{
    future::{Ready, ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

type LocalBoxFuture<T> = Pin<Box<dyn std::future::Future<Output = T>>>;

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Name of the GraphQL operation a request executed, recorded by the handler.
#[derive(Debug, Clone)]
pub struct GraphqlOperation(pub String);

/// Tags each request with an id (reusing an inbound `x-request-id`), reports
/// `x-response-time`, and logs one line per request with the GraphQL
/// operation and the authenticated user when known.
pub struct RequestLogMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLogMiddlewareService<S> {
    service: Rc<S>,
}

fn header_value(value: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static(fallback))
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        req.extensions_mut().insert(RequestId(request_id.clone()));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let duration_ms = start.elapsed().as_millis();

            // Inner layers and the handler share this request's extensions.
            let (operation, user_id) = {
                let extensions = res.request().extensions();
                (
                    extensions.get::<GraphqlOperation>().map(|op| op.0.clone()),
                    extensions.get::<Principal>().map(|p| p.user_id.clone()),
                )
            };

            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static(REQUEST_ID_HEADER),
                header_value(&request_id, "unknown"),
            );
            headers.insert(
                HeaderName::from_static("x-response-time"),
                header_value(&format!("{}ms", duration_ms), "0ms"),
            );

            info!(
                method = %res.request().method(),
                path = %res.request().path(),
                status = res.status().as_u16(),
                operation = operation.as_deref().unwrap_or("-"),
                user_id = user_id.as_deref().unwrap_or("anonymous"),
                duration_ms = duration_ms,
                request_id = %request_id,
                "Request processed"
            );

            Ok(res)
        })
    }
}

/// Resolves `Authorization: Bearer <token>` into a [`Principal`] request
/// extension. Requests without a valid token pass through unauthenticated;
/// protected resolvers reject them.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    secret: Arc<str>,
}

impl JwtAuthMiddleware {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());

        if let Some(token) = token {
            match validate_token(&token, &self.secret) {
                Ok(claims) => {
                    debug!(user_id = %claims.sub, "Bearer token verified");
                    req.extensions_mut().insert(Principal::from(claims));
                }
                Err(e) => {
                    warn!(error = %e, path = %req.path(), "Invalid bearer token");
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}
