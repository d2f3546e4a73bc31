use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[error("jwt decoding failed")]
    JwtDecoding,
    #[error("jwt subject is empty")]
    EmptySubject,
    #[error("unsupported jwt algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Claims carried by the bearer tokens the identity service issues. `sub` is the attempt owner.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let algorithm = algorithm_from_settings(settings)?;
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    validation.required_spec_claims.insert("sub".to_string());

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.security().secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| SecurityError::JwtDecoding)?;

    if claims.sub.trim().is_empty() {
        return Err(SecurityError::EmptySubject);
    }

    Ok(claims)
}

#[cfg(test)]
pub(crate) fn create_access_token(
    subject: &str,
    settings: &Settings,
    expires_in: time::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let algorithm = algorithm_from_settings(settings).unwrap_or(Algorithm::HS256);
    let claims = Claims {
        sub: subject.to_string(),
        exp: (time::OffsetDateTime::now_utc() + expires_in).unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(algorithm),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(settings.security().secret_key.as_bytes()),
    )
}

fn algorithm_from_settings(settings: &Settings) -> Result<Algorithm, SecurityError> {
    match settings.security().algorithm.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        other => Err(SecurityError::UnsupportedAlgorithm(other.to_string())),
    }
}
