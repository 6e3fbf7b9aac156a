//! Websocket channel against the mock service, and the manager end to end.

use std::sync::atomic::Ordering;
use std::time::Duration;

use pantry_client::api::{ApiClient, MealWindow, User};
use pantry_client::auth::{BearerToken, Session};
use pantry_client::notify::{
    ChannelError, ChannelEvent, ChannelManager, ConnectionStatus, PushChannel, PushConnector,
    WebSocketConnector, CLOSE_REASON, NORMAL_CLOSURE,
};

use crate::support::{wait_until, MockService, PushCommand, GOOD_TOKEN};

fn session(token: &str) -> Session {
    Session::new(
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
        },
        BearerToken::new(token),
    )
}

#[tokio::test]
async fn test_open_passes_token_and_receives_text() {
    let service = MockService::start().await;
    let connector = WebSocketConnector::new(service.config());

    let mut channel = connector.open(&session(GOOD_TOKEN)).await.unwrap();
    assert_eq!(
        service.state.ws_tokens.lock().unwrap().as_slice(),
        [GOOD_TOKEN.to_string()]
    );

    service
        .state
        .push(PushCommand::Text(r#"{"mealWindow":"dinner"}"#.to_string()));
    let event = tokio::time::timeout(Duration::from_secs(2), channel.recv())
        .await
        .unwrap();
    assert_eq!(
        event,
        ChannelEvent::Message(r#"{"mealWindow":"dinner"}"#.to_string())
    );

    channel.close(CLOSE_REASON).await.unwrap();
    assert!(wait_until(|| !service.state.client_closes.lock().unwrap().is_empty()).await);
    assert_eq!(
        service.state.client_closes.lock().unwrap()[0],
        (NORMAL_CLOSURE, CLOSE_REASON.to_string())
    );
}

#[tokio::test]
async fn test_rejected_token_fails_to_open() {
    let service = MockService::start().await;
    let connector = WebSocketConnector::new(service.config());

    let result = connector.open(&session("expired")).await;
    assert!(matches!(result, Err(ChannelError::Connect(_))));
}

#[tokio::test]
async fn test_server_close_is_reported_with_code() {
    let service = MockService::start().await;
    let connector = WebSocketConnector::new(service.config());
    let mut channel = connector.open(&session(GOOD_TOKEN)).await.unwrap();

    service.state.push(PushCommand::Close(4001));
    let event = tokio::time::timeout(Duration::from_secs(2), channel.recv())
        .await
        .unwrap();
    assert_eq!(
        event,
        ChannelEvent::Closed {
            code: Some(4001),
            reason: "server closing".to_string(),
        }
    );
    // Already closed by the peer.
    channel.close(CLOSE_REASON).await.unwrap();
}

#[tokio::test]
async fn test_manager_end_to_end() {
    let service = MockService::start().await;
    let config = service.config();
    let client = ApiClient::new(&config).unwrap();
    let mut manager = ChannelManager::new(client, WebSocketConnector::new(config));
    let mut rx = manager.subscribe();

    manager.start(session(GOOD_TOKEN)).await;
    let state = tokio::time::timeout(
        Duration::from_secs(2),
        rx.wait_for(|s| {
            s.status == ConnectionStatus::Connected && s.latest_snapshot.is_some() && !s.loading
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    let snapshot = state.latest_snapshot.unwrap();
    assert_eq!(snapshot.lunch.len(), 1);
    assert_eq!(snapshot.lunch[0].description, "Leftover rice bowl");

    service
        .state
        .push(PushCommand::Text(r#"{"mealWindow":"dinner"}"#.to_string()));
    let state = tokio::time::timeout(
        Duration::from_secs(2),
        rx.wait_for(|s| {
            s.latest_snapshot
                .as_ref()
                .is_some_and(|snap| snap.window(MealWindow::Dinner).len() == 1)
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    let snapshot = state.latest_snapshot.unwrap();
    assert_eq!(snapshot.dinner[0].description, "Tomato pasta");
    assert!(snapshot.lunch.is_empty());

    let latest = service.state.requests_to("/proactiveMeals/latest");
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].query.as_deref(), Some("mealWindow=dinner"));
    assert_eq!(
        latest[0].auth.as_deref(),
        Some(format!("Bearer {GOOD_TOKEN}").as_str())
    );

    manager.stop().await;
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
    assert!(manager.state().latest_snapshot.is_none());
    assert!(wait_until(|| service.state.open_sockets.load(Ordering::SeqCst) == 0).await);
}
