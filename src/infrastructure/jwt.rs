use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Clock, TokenIssuer};
use crate::domain::user::{Caller, Role};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// HS256 access tokens. Expiry is checked against the injected clock.
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    fn claims_for(&self, caller: &Caller, now: DateTime<Utc>) -> AccessClaims {
        AccessClaims {
            sub: caller.id,
            role: caller.role,
            email: caller.email.clone(),
            name: caller.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<String, DomainError> {
        encode(
            &Header::new(Algorithm::HS256),
            &self.claims_for(caller, now),
            &self.encoding_key,
        )
        .map_err(|e| DomainError::Internal(format!("token signing failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<Caller, DomainError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::Unauthorized(format!("Invalid token: {}", e)))?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(DomainError::Unauthorized("Token expired".into()));
        }

        Ok(Caller {
            id: claims.sub,
            role: claims.role,
            email: claims.email,
            name: claims.name,
        })
    }
}
