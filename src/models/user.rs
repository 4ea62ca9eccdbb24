//! User (principal) model and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_superuser: bool,
    pub is_active: bool,
}

/// JWT claims for authenticated principals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Email of the principal
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Require superuser capability
    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.is_superuser {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Superuser privileges required".to_string(),
            ))
        }
    }

    /// Require superuser capability or ownership of the given resource,
    /// where ownership is matched against the owner's email.
    pub fn require_superuser_or_owner(&self, owner: &str) -> Result<(), AppError> {
        if self.is_superuser || self.sub == owner {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not the owner of this resource".to_string(),
            ))
        }
    }

    /// Require superuser capability or that the target user is the caller
    pub fn require_superuser_or_self(&self, user_id: i32) -> Result<(), AppError> {
        if self.is_superuser || self.user_id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Cannot access another user's data".to_string(),
            ))
        }
    }
}
