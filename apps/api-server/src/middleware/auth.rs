//! Authentication extractors.
//!
//! Use [`Identity`] for "any valid token" and [`CurrentUser`] for "a
//! registered user":
//! ```ignore
//! async fn protected_route(user: CurrentUser) -> impl Responder {
//!     format!("Hello, user {}!", user.0.id)
//! }
//! ```

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use grove_core::domain::User;
use grove_core::ports::{AuthError, AuthenticatedUser};
use grove_infra::bearer_token;

use super::error::AppError;
use crate::state::AppState;

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
    pub sub: String,
}

impl From<AuthenticatedUser> for Identity {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            email: user.email,
            sub: user.sub,
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::MissingAuth)?;

    let user = state.verifier.verify(token)?;
    Ok(user.into())
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// The stored user behind the caller's token.
///
/// A user whose email is not yet marked verified is verified on first use:
/// holding a valid token proves the identity provider checked the address.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = authenticate(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let identity = identity?;
            let state =
                state.ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))?;

            let mut user = state
                .users
                .get_by_email(&identity.email)
                .await?
                .ok_or_else(|| AuthError::UnknownUser(identity.email.clone()))?;

            if !user.email_verified {
                tracing::debug!(user_id = user.id, sub = %identity.sub, "verifying email on first sign-in");
                state.users.verify(user.id).await?;
                user.email_verified = true;
            }

            Ok::<_, AppError>(CurrentUser(user))
        })
    }
}
