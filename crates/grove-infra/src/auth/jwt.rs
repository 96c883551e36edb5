//! JWT verification for tokens issued by an external identity provider.

use std::collections::HashSet;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::Deserialize;

use grove_core::ports::{AuthError, AuthenticatedUser, TokenVerifier};

/// Key material used to check token signatures.
#[derive(Debug, Clone)]
pub enum VerificationKey {
    /// Shared HS256 secret.
    Secret(String),
    /// RS256 public key in PEM form, as published by the identity provider.
    RsaPem(String),
}

/// JWT verifier configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub key: VerificationKey,
    /// Expected `iss`. Unchecked when `None`.
    pub issuer: Option<String>,
    /// Skip signature and expiry checks. Development only.
    pub disable_verification: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: VerificationKey::Secret("change-me-in-production".to_string()),
            issuer: None,
            disable_verification: false,
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = match (lookup("AUTH_JWT_PUBLIC_KEY_PEM"), lookup("AUTH_JWT_SECRET")) {
            (Some(pem), _) => VerificationKey::RsaPem(pem),
            (None, Some(secret)) => VerificationKey::Secret(secret),
            (None, None) => {
                tracing::warn!("Using default JWT secret. Set AUTH_JWT_SECRET for production use.");
                JwtConfig::default().key
            }
        };

        let issuer = lookup("AUTH_JWT_ISSUER").or_else(|| {
            match (lookup("COGNITO_REGION"), lookup("COGNITO_USER_POOL_ID")) {
                (Some(region), Some(pool)) => Some(format!(
                    "https://cognito-idp.{region}.amazonaws.com/{pool}"
                )),
                _ => None,
            }
        });

        let disable_verification = lookup("AUTH_DISABLE_VERIFICATION")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if disable_verification {
            tracing::warn!("JWT signature verification is disabled");
        }

        Self {
            key,
            issuer,
            disable_verification,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    email: Option<String>,
}

/// JWT-based token verifier.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        let (decoding_key, algorithm) = match &config.key {
            VerificationKey::Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            VerificationKey::RsaPem(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::Misconfigured(e.to_string()))?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if config.disable_verification {
            validation.insecure_disable_signature_validation();
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn from_env() -> Result<Self, AuthError> {
        Self::new(JwtConfig::from_env())
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let email = data
            .claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("token must contain email".to_string()))?;

        Ok(AuthenticatedUser {
            email,
            sub: data.claims.sub.unwrap_or_default(),
        })
    }
}
