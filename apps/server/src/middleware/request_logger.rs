//! Request logging middleware.
//!
//! Logs one line when a request starts and one when it finishes. Credentials
//! are never logged, only which kind was presented.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::config::ADMIN_KEY_HEADER;

/// Paths polled by orchestrators; logged at debug level only.
const QUIET_PATHS: &[&str] = &["/api/v1/health", "/api/v1/ready"];

/// Which credential a request carries: `admin-key`, `bearer` or `none`.
pub fn credential_kind(headers: &HeaderMap) -> &'static str {
    if headers.contains_key(ADMIN_KEY_HEADER) {
        "admin-key"
    } else if headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
    {
        "bearer"
    } else {
        "none"
    }
}

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let quiet = QUIET_PATHS.contains(&path.as_str());
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let credential = credential_kind(req.headers());

        if quiet {
            debug!(target: "api", method = %method, path = %path, "request started");
        } else {
            info!(
                target: "api",
                method = %method,
                path = %path,
                remote_addr = %remote_addr,
                credential = credential,
                "request started"
            );
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let status = res.status().as_u16();
            let duration_ms = start.elapsed().as_millis() as u64;

            if res.status().is_server_error() {
                error!(target: "api", method = %method, path = %path, status, duration_ms, "request failed");
            } else if res.status().is_client_error() {
                warn!(target: "api", method = %method, path = %path, status, duration_ms, "request rejected");
            } else if quiet {
                debug!(target: "api", method = %method, path = %path, status, duration_ms, "request completed");
            } else {
                info!(target: "api", method = %method, path = %path, status, duration_ms, "request completed");
            }

            Ok(res)
        })
    }
}
