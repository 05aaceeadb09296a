//! Actix-web extractors for bearer-token and admin authentication.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use secrecy::{ExposeSecret, SecretString};

use super::{AdminKey, verify_access_token};
use crate::config::{ADMIN_KEY_HEADER, AuthSettings};
use crate::error::ErrorResponse;
use crate::models::auth::{AuthenticatedInstructor, Role};

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    status: StatusCode,
    message: String,
}

impl AuthError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        let error = if self.status == StatusCode::FORBIDDEN {
            "FORBIDDEN"
        } else {
            "UNAUTHORIZED"
        };
        HttpResponse::build(self.status).json(ErrorResponse {
            error: error.to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extract the bearer token, wrapped in SecretString immediately.
fn bearer_token(req: &HttpRequest) -> Option<SecretString> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| SecretString::from(token.trim().to_string()))
}

fn authenticate_bearer(req: &HttpRequest) -> Result<AuthenticatedInstructor, AuthError> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AuthError::unauthorized("Internal configuration error"))?;

    let token = bearer_token(req).ok_or_else(|| {
        AuthError::unauthorized("Missing access token. Provide Authorization: Bearer <token>.")
    })?;

    let claims = verify_access_token(token.expose_secret(), &settings.jwt_secret)
        .map_err(AuthError::unauthorized)?;

    Ok(AuthenticatedInstructor {
        instructor_id: claims.sub,
        role: claims.role,
    })
}

/// Requires a valid access token.
pub struct InstructorAuth {
    pub caller: AuthenticatedInstructor,
}

impl FromRequest for InstructorAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate_bearer(req).map(|caller| InstructorAuth { caller }))
    }
}

/// Requires an admin access token or the bootstrap `X-Admin-Key` header.
pub struct AdminAuth {
    pub caller: AuthenticatedInstructor,
}

impl FromRequest for AdminAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let provided_admin_key = req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| SecretString::from(s.to_string()));

        if let Some(ref provided) = provided_admin_key
            && let Some(key) = req.app_data::<web::Data<AdminKey>>()
            && key.verify(provided.expose_secret())
        {
            return ready(Ok(AdminAuth {
                caller: AuthenticatedInstructor {
                    instructor_id: "bootstrap".to_string(),
                    role: Role::Admin,
                },
            }));
        }

        let result = authenticate_bearer(req).and_then(|caller| {
            if caller.is_admin() {
                Ok(AdminAuth { caller })
            } else {
                Err(AuthError::forbidden("Admin role required"))
            }
        });
        ready(result)
    }
}
