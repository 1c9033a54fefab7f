//! Access token creation and verification.
//!
//! Tokens are HS256 JWTs signed with the configured `secret_key`. They carry the operator's
//! credential id and username and expire `auth.security.jwt_expiry` after issuance.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{api::models::auth::Operator, config::Config, errors::Error, types::CredentialId};

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: CredentialId, // Subject (credential ID)
    pub username: String,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
}

impl SessionClaims {
    pub fn new(operator: &Operator, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.security.jwt_expiry;

        Self {
            sub: operator.id,
            username: operator.username.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for Operator {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "sign access tokens: secret_key is required".to_string(),
    })
}

/// Issue an access token for an operator
pub fn create_session_token(operator: &Operator, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(operator, config);
    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());

    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode an access token
pub fn verify_session_token(token: &str, config: &Config) -> Result<Operator, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());
    let mut validation = Validation::default();
    // Expiry is exact: a token is rejected as soon as `exp` has passed
    validation.leeway = 0;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - anything wrong with the token itself
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        ErrorKind::InvalidEcdsaKey
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::RsaFailedSigning
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::MissingAlgorithm
        | ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    Ok(Operator::from(token_data.claims))
}
