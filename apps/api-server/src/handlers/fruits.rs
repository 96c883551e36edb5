//! Fruit handlers.

use actix_web::{HttpResponse, web};

use grove_core::domain::{Fruit, FruitBody};
use grove_shared::dto::{FruitRequest, FruitResponse};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::middleware::path::FruitId;
use crate::state::AppState;

fn to_response(fruit: Fruit) -> FruitResponse {
    FruitResponse {
        id: fruit.id,
        name: fruit.name,
        price: fruit.price,
        created_at: fruit.created_at,
        updated_at: fruit.updated_at,
    }
}

fn to_body(req: FruitRequest) -> FruitBody {
    FruitBody {
        name: req.name,
        price: req.price,
    }
}

/// GET /v1/fruits
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let fruits = state.fruits.get_all().await?;
    let body: Vec<FruitResponse> = fruits.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /v1/fruits/{fruit-id}
pub async fn get(state: web::Data<AppState>, FruitId(id): FruitId) -> AppResult<HttpResponse> {
    let fruit = state.fruits.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(to_response(fruit)))
}

/// POST /v1/fruits
pub async fn create(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<FruitRequest>,
) -> AppResult<HttpResponse> {
    let fruit = state.fruits.create(&to_body(body.into_inner())).await?;
    tracing::debug!(fruit_id = fruit.id, user_id = user.0.id, "create handled");
    Ok(HttpResponse::Created().json(to_response(fruit)))
}

/// PUT /v1/fruits/{fruit-id}
pub async fn update(
    state: web::Data<AppState>,
    user: CurrentUser,
    FruitId(id): FruitId,
    body: web::Json<FruitRequest>,
) -> AppResult<HttpResponse> {
    let fruit = state.fruits.update(id, &to_body(body.into_inner())).await?;
    tracing::debug!(fruit_id = id, user_id = user.0.id, "update handled");
    Ok(HttpResponse::Ok().json(to_response(fruit)))
}

/// DELETE /v1/fruits/{fruit-id}
pub async fn delete(
    state: web::Data<AppState>,
    user: CurrentUser,
    FruitId(id): FruitId,
) -> AppResult<HttpResponse> {
    state.fruits.delete(id).await?;
    tracing::debug!(fruit_id = id, user_id = user.0.id, "delete handled");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use grove_core::domain::{NewUser, UserProfile};
    use grove_shared::{ErrorResponse, ErrorType};

    use super::*;
    use crate::handlers::test_support::{bearer, state, test_app};

    async fn registered(email: &str) -> AppState {
        let state = state();
        state
            .users
            .create(NewUser::new(email, UserProfile::default()))
            .await
            .unwrap();
        state
    }

    #[actix_rt::test]
    async fn test_create_then_fetch() {
        let app = test_app!(registered("ann@example.com").await);

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .insert_header(bearer("ann@example.com"))
            .set_json(json!({"name": "apple", "price": 120}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: FruitResponse = test::read_body_json(resp).await;
        assert_eq!(created.name, "apple");

        let req = test::TestRequest::get()
            .uri(&format!("/v1/fruits/{}", created.id))
            .to_request();
        let fetched: FruitResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        let req = test::TestRequest::get().uri("/v1/fruits").to_request();
        let all: Vec<FruitResponse> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 1);
    }

    #[actix_rt::test]
    async fn test_create_requires_token() {
        let app = test_app!(state());

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .set_json(json!({"name": "apple", "price": 1}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].error_type, ErrorType::AuthError);
    }

    #[actix_rt::test]
    async fn test_unregistered_caller_is_rejected() {
        let app = test_app!(state());

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .insert_header(bearer("ghost@example.com"))
            .set_json(json!({"name": "apple", "price": 1}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.errors[0].messages,
            vec!["cannot find user email = ghost@example.com"]
        );
    }

    #[actix_rt::test]
    async fn test_invalid_body_lists_every_problem() {
        let app = test_app!(registered("ann@example.com").await);

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .insert_header(bearer("ann@example.com"))
            .set_json(json!({"price": -1}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].error_type, ErrorType::ParamError);
        assert_eq!(body.errors[0].messages.len(), 2);
    }

    #[actix_rt::test]
    async fn test_malformed_json_is_param_error() {
        let app = test_app!(registered("ann@example.com").await);

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .insert_header(bearer("ann@example.com"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].messages[0], "request body mismatch");
    }

    #[actix_rt::test]
    async fn test_bad_fruit_id() {
        let app = test_app!(state());

        let req = test::TestRequest::get().uri("/v1/fruits/abc").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["messages"][0], "fruit-id must be a positive number");
    }

    #[actix_rt::test]
    async fn test_missing_fruit_is_404() {
        let app = test_app!(state());

        let req = test::TestRequest::get().uri("/v1/fruits/42").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.errors[0].error_type, ErrorType::NotFoundError);
        assert_eq!(body.errors[0].messages, vec!["data not found for fruit id = 42"]);
    }

    #[actix_rt::test]
    async fn test_update_and_delete() {
        let app = test_app!(registered("ann@example.com").await);

        let req = test::TestRequest::post()
            .uri("/v1/fruits")
            .insert_header(bearer("ann@example.com"))
            .set_json(json!({"name": "plum", "price": 10}))
            .to_request();
        let created: FruitResponse = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/v1/fruits/{}", created.id);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer("ann@example.com"))
            .set_json(json!({"name": "plum", "price": 12}))
            .to_request();
        let updated: FruitResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.price, 12);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer("ann@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
