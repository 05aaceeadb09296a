//! Authentication models: login payloads, token claims and caller identity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role carried in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Instructor => "instructor",
        }
    }

    /// Admin role is granted to exactly one configured instructor id.
    pub fn for_instructor(instructor_id: &str, admin_instructor_id: &str) -> Self {
        if instructor_id == admin_instructor_id {
            Self::Admin
        } else {
            Self::Instructor
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds
    pub expires_in: u64,
    pub instructor_id: String,
    pub role: Role,
}

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Instructor id
    pub sub: String,
    pub iss: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Identity of the caller, resolved by the auth extractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedInstructor {
    pub instructor_id: String,
    pub role: Role,
}

impl AuthenticatedInstructor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners may touch their own class sections; admins may touch any.
    pub fn can_manage(&self, owner_instructor_id: &str) -> bool {
        self.is_admin() || self.instructor_id == owner_instructor_id
    }
}
