//! Authentication: password hashing, access tokens and the bootstrap admin key.

mod extractor;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::DatabaseConnection;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

pub use extractor::{AdminAuth, AuthError, InstructorAuth};

use crate::config::AuthSettings;
use crate::db::instructors;
use crate::error::{AppError, AppResult};
use crate::models::auth::{Claims, LoginResponse, Role};

const TOKEN_ISSUER: &str = "attendance-server";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Wrapper type for the bootstrap admin key.
/// `Debug` prints `[REDACTED]` and the value is zeroized on drop.
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.map(SecretString::from))
    }

    /// Constant-time comparison with the stored key. Always false when no key
    /// is configured.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(secret) => secret
                .expose_secret()
                .as_bytes()
                .ct_eq(provided.as_bytes())
                .into(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Malformed hashes count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

pub fn create_access_token(instructor_id: &str, role: Role, settings: &AuthSettings) -> AppResult<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::seconds(settings.token_ttl_secs as i64);

    let claims = Claims {
        sub: instructor_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        role,
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    let key = EncodingKey::from_secret(settings.jwt_secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
}

/// Verify an access token and return its claims.
pub fn verify_access_token(token: &str, secret: &SecretString) -> Result<Claims, String> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.validate_aud = false;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid access token: {}", e))
}

/// Check credentials and issue an access token. Unknown email and wrong
/// password are indistinguishable to the caller, in response and in the
/// bcrypt work spent.
pub async fn authenticate(
    db: &DatabaseConnection,
    settings: &AuthSettings,
    email: &str,
    password: &str,
) -> AppResult<LoginResponse> {
    let Some(instructor) = instructors::find_by_email(db, email).await? else {
        // One bcrypt round at the configured cost, same as checking a stored hash
        let password = password.to_string();
        let cost = settings.bcrypt_cost;
        let _ = actix_web::web::block(move || bcrypt::hash(password, cost)).await?;
        warn!("Login rejected: unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let password = password.to_string();
    let hash = instructor.password_hash.clone();
    let verified = actix_web::web::block(move || verify_password(&password, &hash)).await?;
    if !verified {
        warn!("Login rejected: wrong password for instructor {}", instructor.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let role = Role::for_instructor(&instructor.id, &settings.admin_instructor_id);
    let access_token = create_access_token(&instructor.id, role, settings)?;
    info!("Instructor {} logged in (role={})", instructor.id, role);

    Ok(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: settings.token_ttl_secs,
        instructor_id: instructor.id,
        role,
    })
}
