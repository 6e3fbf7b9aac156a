//! REST client against the mock service.

use chrono::{TimeZone, Utc};
use pantry_client::api::{
    ApiClient, ApiError, Credentials, MealRequest, MealWindow, NewPantryItem, NewUser,
};
use pantry_client::auth::BearerToken;
use pantry_client::config::ClientConfig;
use serde_json::json;

use crate::support::{MockService, GOOD_TOKEN};

fn authed(service: &MockService) -> ApiClient {
    ApiClient::new(&service.config())
        .unwrap()
        .with_token(BearerToken::new(GOOD_TOKEN))
}

#[tokio::test]
async fn test_login_returns_user_and_token() {
    let service = MockService::start().await;
    let client = ApiClient::new(&service.config()).unwrap();

    let response = client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.email, "ada@example.com");
    assert_eq!(response.user.display_name(), "Ada Lovelace");
    assert_eq!(response.access_token.as_deref(), Some(GOOD_TOKEN));

    let requests = service.state.requests_to("/user/login/");
    assert_eq!(requests[0].method, "POST");
    assert!(requests[0].auth.is_none());
}

#[tokio::test]
async fn test_login_failure_surfaces_service_detail() {
    let service = MockService::start().await;
    let client = ApiClient::new(&service.config()).unwrap();

    let err = client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Incorrect email or password (HTTP 401)");
}

#[tokio::test]
async fn test_register_sends_camel_case_body() {
    let service = MockService::start().await;
    let client = ApiClient::new(&service.config()).unwrap();

    let user = client
        .register(&NewUser {
            email: "grace@example.com".to_string(),
            first_name: "Grace".to_string(),
            last_name: Some("Hopper".to_string()),
            password: "cobol".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.id, 2);
    let body = service.state.requests_to("/user/register/")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["firstName"], "Grace");
    assert_eq!(body["lastName"], "Hopper");
}

#[tokio::test]
async fn test_authed_requests_carry_bearer_token() {
    let service = MockService::start().await;
    let client = authed(&service);

    let pantries = client.list_pantries().await.unwrap();
    assert_eq!(pantries.len(), 1);
    assert_eq!(pantries[0].pantry_nickname, "Home");

    let me = client.current_user().await.unwrap();
    assert_eq!(me.id, 1);

    for request in service.state.requests() {
        assert_eq!(
            request.auth.as_deref(),
            Some(format!("Bearer {GOOD_TOKEN}").as_str())
        );
    }
}

#[tokio::test]
async fn test_missing_token_fails_before_sending() {
    let service = MockService::start().await;
    let client = ApiClient::new(&service.config()).unwrap();

    let err = client.list_pantries().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));
    assert!(service.state.requests().is_empty());
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let service = MockService::start().await;
    let client = ApiClient::new(&service.config())
        .unwrap()
        .with_token(BearerToken::new("expired"));

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_create_pantry_and_items() {
    let service = MockService::start().await;
    let client = authed(&service);

    let pantry = client.create_pantry("Cabin").await.unwrap();
    assert_eq!(pantry.pantry_id, 2);
    assert_eq!(pantry.pantry_nickname, "Cabin");

    let items = client.list_items(1).await.unwrap();
    assert_eq!(items[0].item.item_name.as_deref(), Some("Milk"));
    assert_eq!(
        items[0].purchase_date,
        Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap()
    );

    let err = client.list_items(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Pantry not found (HTTP 404)");
}

#[tokio::test]
async fn test_add_item_posts_to_pantry() {
    let service = MockService::start().await;
    let client = authed(&service);

    let created = client
        .add_item(
            1,
            &NewPantryItem {
                item_name: "Oat milk".to_string(),
                brand: None,
                quantity: 2.0,
                unit: Some("l".to_string()),
                purchase_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.item.item_name.as_deref(), Some("Oat milk"));

    let body = service.state.requests_to("/pantry/1/item")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["itemName"], "Oat milk");
    assert_eq!(body["quantity"], json!(2.0));
    assert!(body["purchaseDate"]
        .as_str()
        .is_some_and(|d| d.starts_with("2025-03-01T00:00:00")));
}

#[tokio::test]
async fn test_suggest_then_confirm_meal() {
    let service = MockService::start().await;
    let client = authed(&service);

    let suggestions = client
        .suggest_meals(&MealRequest::for_items([11, 12]))
        .await
        .unwrap();
    assert_eq!(suggestions.recipes.len(), 2);
    let body = service.state.requests_to("/pantry/suggestMeal")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["priorityPantryItemIds"], json!([11, 12]));

    client
        .confirm_meal(&suggestions.recipes[0].ingredients)
        .await
        .unwrap();
    let body = service.state.requests_to("/selectedMeal")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body[0]["ingredientName"], "Rice");
}

#[tokio::test]
async fn test_proactive_snapshots() {
    let service = MockService::start().await;
    let client = authed(&service);

    let current = client.proactive_meals().await.unwrap();
    assert_eq!(current.total_recipes(), 1);
    assert_eq!(current.window(MealWindow::Lunch).len(), 1);

    let latest = client
        .latest_proactive_meals(MealWindow::Dinner)
        .await
        .unwrap();
    assert_eq!(latest.dinner[0].description, "Tomato pasta");
    assert!(latest.breakfast.is_empty());

    let requests = service.state.requests_to("/proactiveMeals/latest");
    assert_eq!(requests[0].query.as_deref(), Some("mealWindow=dinner"));
}

#[tokio::test]
async fn test_unreachable_service_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        api_base_url: format!("http://{addr}"),
        connect_timeout_secs: 1,
        request_timeout_secs: 2,
        ..Default::default()
    };
    let client = ApiClient::new(&config)
        .unwrap()
        .with_token(BearerToken::new(GOOD_TOKEN));

    let err = client.list_pantries().await.unwrap_err();
    assert!(
        matches!(err, ApiError::Request(_) | ApiError::Timeout),
        "unexpected error: {err:?}"
    );
}
