//! In-process mock of the pantry service: REST routes plus the `/ws` push channel.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pantry_client::config::ClientConfig;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub const GOOD_TOKEN: &str = "good-token";

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
    pub body: Option<Value>,
}

/// Instruction pushed to every open websocket.
#[derive(Debug, Clone)]
pub enum PushCommand {
    Text(String),
    Close(u16),
}

pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    pub snapshot: Mutex<Value>,
    pub latest: Mutex<Value>,
    pub push_tx: broadcast::Sender<PushCommand>,
    pub ws_tokens: Mutex<Vec<String>>,
    pub open_sockets: AtomicUsize,
    pub client_closes: Mutex<Vec<(u16, String)>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn push(&self, command: PushCommand) {
        let _ = self.push_tx.send(command);
    }
}

pub struct MockService {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    cancel: CancellationToken,
}

impl MockService {
    pub async fn start() -> Self {
        let (push_tx, _) = broadcast::channel(16);
        let state = Arc::new(MockState {
            requests: Mutex::new(Vec::new()),
            snapshot: Mutex::new(json!({
                "breakfast": [],
                "lunch": [recipe("Leftover rice bowl")],
                "eveningSnack": [],
                "dinner": []
            })),
            latest: Mutex::new(json!({
                "dinner": {"recipes": [recipe("Tomato pasta")]}
            })),
            push_tx,
            ws_tokens: Mutex::new(Vec::new()),
            open_sockets: AtomicUsize::new(0),
            client_closes: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .fallback(api_handler)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            cancel,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base_url: format!("http://{}", self.addr),
            connect_timeout_secs: 2,
            request_timeout_secs: 5,
            ..Default::default()
        }
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub fn recipe(description: &str) -> Value {
    json!({
        "description": description,
        "ingredients": [
            {"pantryItemId": 11, "ingredientName": "Rice", "quantity": 1.0, "unit": "cup"}
        ],
        "steps": ["Cook", "Serve"],
        "timeRequired": "20 minutes"
    })
}

fn user(id: i64, email: &str) -> Value {
    json!({"id": id, "email": email, "firstName": "Ada", "lastName": "Lovelace"})
}

fn pantry_item(pantry_id: i64, name: &str) -> Value {
    json!({
        "id": 21,
        "pantryId": pantry_id,
        "itemId": 5,
        "quantity": 2.0,
        "unit": "l",
        "purchaseDate": "2025-02-01T08:00:00",
        "item": {"itemId": 5, "itemName": name, "brand": null, "avgShelfLife": 7}
    })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn api_handler(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(String::from),
        auth: auth.clone(),
        body: body.clone(),
    });

    let path = uri.path();
    let public = matches!(path, "/user/login/" | "/user/register/");
    if !public && auth.as_deref() != Some(&format!("Bearer {GOOD_TOKEN}")) {
        return reply(StatusCode::UNAUTHORIZED, json!({"detail": "Invalid token."}));
    }
    let body = body.unwrap_or(Value::Null);

    match (method.as_str(), path) {
        ("POST", "/user/login/") => {
            if body["password"] == "secret" {
                let mut user = user(1, body["email"].as_str().unwrap_or_default());
                user["accessToken"] = json!(GOOD_TOKEN);
                reply(StatusCode::CREATED, user)
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Incorrect email or password"}),
                )
            }
        }
        ("POST", "/user/register/") => reply(
            StatusCode::CREATED,
            json!({
                "id": 2,
                "email": body["email"],
                "firstName": body["firstName"],
                "lastName": body["lastName"]
            }),
        ),
        ("GET", "/user/me") => reply(StatusCode::OK, user(1, "ada@example.com")),
        ("GET", "/pantries") => reply(
            StatusCode::OK,
            json!([{"pantryId": 1, "pantryNickname": "Home", "userId": 1}]),
        ),
        ("POST", "/pantry") => reply(
            StatusCode::CREATED,
            json!({"pantryId": 2, "pantryNickname": body["pantryNickname"], "userId": 1}),
        ),
        ("GET", "/1/items") => reply(StatusCode::OK, json!([pantry_item(1, "Milk")])),
        ("GET", "/99/items") => reply(StatusCode::NOT_FOUND, json!({"detail": "Pantry not found"})),
        ("POST", "/pantry/1/item") => reply(
            StatusCode::CREATED,
            pantry_item(1, body["itemName"].as_str().unwrap_or_default()),
        ),
        ("POST", "/pantry/suggestMeal") => reply(
            StatusCode::OK,
            json!({"recipes": [recipe("Fried rice"), recipe("Rice pudding")]}),
        ),
        ("POST", "/selectedMeal") => reply(StatusCode::OK, Value::Null),
        ("GET", "/proactiveMeals/") => {
            let snapshot = state.snapshot.lock().unwrap().clone();
            reply(StatusCode::OK, snapshot)
        }
        ("GET", "/proactiveMeals/latest") => {
            let latest = state.latest.lock().unwrap().clone();
            reply(StatusCode::OK, latest)
        }
        _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not Found"})),
    }
}

async fn ws_handler(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = params.get("token").cloned().unwrap_or_default();
    state.ws_tokens.lock().unwrap().push(token.clone());
    if token != GOOD_TOKEN {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    // Subscribe before the handshake completes so no push is missed.
    let push_rx = state.push_tx.subscribe();
    ws.on_upgrade(move |socket| serve_socket(socket, state, push_rx))
}

async fn serve_socket(
    mut socket: WebSocket,
    state: Arc<MockState>,
    mut push_rx: broadcast::Receiver<PushCommand>,
) {
    state.open_sockets.fetch_add(1, Ordering::SeqCst);
    loop {
        tokio::select! {
            command = push_rx.recv() => match command {
                Ok(PushCommand::Text(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(PushCommand::Close(code)) => {
                    let frame = CloseFrame { code, reason: "server closing".into() };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    break;
                }
                Err(_) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(frame))) => {
                    if let Some(frame) = frame {
                        state
                            .client_closes
                            .lock()
                            .unwrap()
                            .push((frame.code, frame.reason.to_string()));
                    }
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }
    state.open_sockets.fetch_sub(1, Ordering::SeqCst);
}

/// Poll until `condition` holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
