//! Error responses.
//!
//! Handlers and extractors fail with [`ApiError`]. The [`ExceptionRouting`]
//! middleware catches every error response (including the framework's own,
//! e.g. JSON payload errors) and rewrites it with the body and status chosen
//! by the [`ExceptionRouter`]. It also assigns each request an ID, which is
//! echoed in the `X-Request-ID` header and attached to error reports.

use std::fmt;
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{
        StatusCode,
        header::{self, HeaderName, HeaderValue},
    },
};
use onboard_core::ports::AuthError;
use onboard_core::{
    AppException, ErrorContext, ExceptionRouter, FrameworkDetail, FrameworkError, RepoError,
    Violations,
};
use onboard_shared::ErrorBody;
use uuid::Uuid;

use crate::middleware::auth::Identity;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Error returned by handlers and extractors.
///
/// The response it renders on its own is a placeholder; the real one is built
/// by [`ExceptionRouting`], which has access to the shared router.
#[derive(Debug)]
pub struct ApiError(pub AppException);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(ErrorBody::server_error())
    }
}

impl From<AppException> for ApiError {
    fn from(exc: AppException) -> Self {
        Self(exc)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self(err.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl From<Violations> for ApiError {
    fn from(violations: Violations) -> Self {
        Self(violations.into())
    }
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, ApiError>;

/// Middleware that routes every error response through the [`ExceptionRouter`].
pub struct ExceptionRouting {
    router: Arc<ExceptionRouter>,
}

impl ExceptionRouting {
    pub fn new(router: Arc<ExceptionRouter>) -> Self {
        Self { router }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ExceptionRouting
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ExceptionRoutingService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ExceptionRoutingService {
            service,
            router: self.router.clone(),
        }))
    }
}

pub struct ExceptionRoutingService<S> {
    service: S,
    router: Arc<ExceptionRouter>,
}

impl<S, B> Service<ServiceRequest> for ExceptionRoutingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Keep an ID assigned by the client or load balancer
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = tracing::info_span!("request", request_id = %request_id);
        let _guard = span.enter();

        let mut context = ErrorContext::new()
            .with_request_id(&request_id)
            .with_request(req.method().as_str(), req.path());
        if let Some(agent) = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
        {
            context = context.with_data("user_agent", agent);
        }
        let http_req = req.request().clone();
        let router = self.router.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = match fut.await {
                Ok(res) => match res.response().error() {
                    Some(err) => {
                        let response = route_error(&router, err, res.request(), context);
                        res.into_response(response).map_into_right_body()
                    }
                    None => res.map_into_left_body(),
                },
                Err(err) => {
                    let response = route_error(&router, &err, &http_req, context);
                    ServiceResponse::new(http_req, response).map_into_right_body()
                }
            };

            res.headers_mut().insert(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
            );

            Ok(res)
        })
    }
}

fn route_error(
    router: &ExceptionRouter,
    err: &Error,
    req: &HttpRequest,
    mut context: ErrorContext,
) -> HttpResponse {
    if let Some(identity) = req.extensions().get::<Identity>() {
        context = context.with_user_id(identity.user_id.to_string());
    }

    let (body, status) = match err.as_error::<ApiError>() {
        Some(ApiError(exc)) => router.route(exc, &context),
        None => router.route(&framework_exception(err), &context),
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(body)
}

/// Wrap an error raised by actix itself.
///
/// Client errors keep their status and message; a framework 404 (e.g. a path
/// segment that fails to parse) answers like any missing resource, and
/// anything server-side is treated as unexpected.
fn framework_exception(err: &Error) -> AppException {
    let status = err.as_response_error().status_code();
    if status.is_server_error() {
        return AppException::Unhandled(anyhow::anyhow!("{err}"));
    }
    if status == StatusCode::NOT_FOUND {
        return AppException::UnknownRoute(err.to_string());
    }

    FrameworkError::new(status.as_u16())
        .with_detail(FrameworkDetail::Message(err.to_string()))
        .into()
}

#[cfg(test)]
mod tests {
    use actix_web::error::{ErrorBadRequest, ErrorNotFound, ErrorServiceUnavailable};

    use super::*;

    #[test]
    fn test_framework_client_error_keeps_status_and_message() {
        let exc = framework_exception(&ErrorBadRequest("Content type error"));

        match exc {
            AppException::Framework(err) => {
                assert_eq!(err.status, Some(400));
                assert!(matches!(
                    err.detail,
                    Some(FrameworkDetail::Message(ref m)) if m == "Content type error"
                ));
            }
            other => panic!("unexpected exception: {other:?}"),
        }
    }

    #[test]
    fn test_framework_server_error_is_unhandled() {
        let exc = framework_exception(&ErrorServiceUnavailable("pool exhausted"));

        assert!(matches!(exc, AppException::Unhandled(_)));
    }

    #[test]
    fn test_framework_not_found_is_unknown_route() {
        let exc = framework_exception(&ErrorNotFound("can not parse \"abc\" to a Uuid"));

        assert!(matches!(exc, AppException::UnknownRoute(_)));
    }

    #[test]
    fn test_placeholder_response_is_server_error() {
        let err = ApiError(AppException::not_found("gone"));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "gone");
    }
}
