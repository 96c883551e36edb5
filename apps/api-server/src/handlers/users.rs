//! User handlers.

use actix_web::{HttpResponse, web};

use grove_core::domain::{NewUser, User, UserProfile, UserPublicData};
use grove_shared::dto::{UserCreateRequest, UserPublicResponse, UserResponse};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        email_verified: user.email_verified,
        display_name: user.profile.display_name,
        about: user.profile.about,
        avatar_url: user.profile.avatar_url,
        last_login_at: user.last_login_at,
    }
}

fn to_public(data: UserPublicData) -> UserPublicResponse {
    UserPublicResponse {
        id: data.id,
        display_name: data.profile.display_name,
        about: data.profile.about,
        avatar_url: data.profile.avatar_url,
    }
}

/// POST /v1/users
///
/// Registration is public; the account is verified on its first
/// authenticated request.
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<UserCreateRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let profile = UserProfile {
        display_name: req.display_name,
        about: req.about,
        avatar_url: req.avatar_url,
    };

    let user = state.users.create(NewUser::new(req.email, profile)).await?;
    Ok(HttpResponse::Created().json(to_public(UserPublicData::from(&user))))
}

/// GET /v1/me, GET /v1/user
pub async fn me(user: CurrentUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(to_response(user.0)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::json;

    use grove_shared::{ErrorResponse, ErrorType};

    use super::*;
    use crate::handlers::test_support::{bearer, state, test_app};

    #[actix_rt::test]
    async fn test_register_then_me_verifies() {
        let app = test_app!(state());

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(json!({"email": "ann@example.com", "display_name": "Ann"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let public: UserPublicResponse = test::read_body_json(resp).await;
        assert_eq!(public.display_name.as_deref(), Some("Ann"));

        for uri in ["/v1/me", "/v1/user"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer("ann@example.com"))
                .to_request();
            let me: UserResponse = test::call_and_read_body_json(&app, req).await;
            assert_eq!(me.id, public.id);
            assert!(me.email_verified);
        }
    }

    #[actix_rt::test]
    async fn test_verified_email_cannot_register_again() {
        let app = test_app!(state());

        let register = || {
            test::TestRequest::post()
                .uri("/v1/users")
                .set_json(json!({"email": "bob@example.com"}))
                .to_request()
        };
        test::call_service(&app, register()).await;

        let req = test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(bearer("bob@example.com"))
            .to_request();
        test::call_service(&app, req).await;

        let resp = test::call_service(&app, register()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].messages, vec!["verified user exists"]);
    }

    #[actix_rt::test]
    async fn test_unverified_registration_is_replaced() {
        let app = test_app!(state());

        let mut ids = Vec::new();
        for name in ["first", "second"] {
            let req = test::TestRequest::post()
                .uri("/v1/users")
                .set_json(json!({"email": "cy@example.com", "display_name": name}))
                .to_request();
            let public: UserPublicResponse = test::call_and_read_body_json(&app, req).await;
            ids.push(public.id);
        }
        assert_ne!(ids[0], ids[1]);

        let req = test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(bearer("cy@example.com"))
            .to_request();
        let me: UserResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me.display_name.as_deref(), Some("second"));
    }

    #[actix_rt::test]
    async fn test_invalid_email_is_rejected() {
        let app = test_app!(state());

        let req = test::TestRequest::post()
            .uri("/v1/users")
            .set_json(json!({"email": "not-an-address"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].error_type, ErrorType::ParamError);
    }

    #[actix_rt::test]
    async fn test_me_rejects_garbage_token() {
        let app = test_app!(state());

        let req = test::TestRequest::get()
            .uri("/v1/me")
            .insert_header(("Authorization", "Bearer nope"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.errors[0].messages[0].starts_with("token is not valid."));
    }
}
