#![allow(dead_code)]

//! In-process stand-in for the remote store, served by axum on an ephemeral
//! port. Every request is recorded so tests can assert on the exact wire
//! traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "open-sesame";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: &'static str,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct StubState {
    pub requests: Vec<Recorded>,
    /// Status and body returned by `POST /orders` instead of a confirmation.
    pub order_failure: Option<(StatusCode, Value)>,
    created_customers: u32,
}

type Shared = Arc<Mutex<StubState>>;

pub struct StubStore {
    pub base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl StubStore {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/customers/suggest", get(suggest))
            .route("/customers", post(create_customer))
            .route("/orders", post(create_order))
            .route("/products", get(list_products))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `(method, path)` of every request, in arrival order.
    pub fn routes(&self) -> Vec<(&'static str, &'static str)> {
        self.requests().iter().map(|r| (r.method, r.path)).collect()
    }

    pub fn fail_orders(&self, status: StatusCode, body: Value) {
        self.state.lock().unwrap().order_failure = Some((status, body));
    }

    pub fn accept_orders(&self) {
        self.state.lock().unwrap().order_failure = None;
    }
}

impl Drop for StubStore {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Record the request, then reject it unless it carries the stub's token.
fn record(
    state: &Shared,
    method: &'static str,
    path: &'static str,
    headers: &HeaderMap,
    query: HashMap<String, String>,
    body: Value,
) -> Result<(), Response> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TOKEN}");
    let authorized = authorization.as_deref() == Some(expected.as_str());

    state.lock().unwrap().requests.push(Recorded {
        method,
        path,
        authorization,
        query,
        body,
    });

    if authorized {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response())
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.lock().unwrap().requests.push(Recorded {
        method: "POST",
        path: "/auth/login",
        authorization: None,
        query: HashMap::new(),
        body: body.clone(),
    });
    if body["password"] == PASSWORD {
        Json(json!({ "access_token": TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad credentials" }))).into_response()
    }
}

fn directory() -> Vec<Value> {
    vec![
        json!({ "id": "c2", "name": "John Mensah", "phone": "0241234567" }),
        json!({ "id": "c3", "name": "Joana Owusu", "phone": "0551234567" }),
        json!({ "id": "c4", "name": "Ama Serwaa", "phone": "0201112222" }),
    ]
}

async fn suggest(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let needle = query.get("q").cloned().unwrap_or_default().to_lowercase();
    if let Err(rejection) = record(&state, "GET", "/customers/suggest", &headers, query, Value::Null) {
        return rejection;
    }
    let matches: Vec<Value> = directory()
        .into_iter()
        .filter(|c| {
            c["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect();
    Json(matches).into_response()
}

async fn create_customer(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = record(&state, "POST", "/customers", &headers, HashMap::new(), body.clone()) {
        return rejection;
    }
    let id = {
        let mut guard = state.lock().unwrap();
        guard.created_customers += 1;
        format!("c{}", guard.created_customers)
    };
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": body["name"], "phone": body["phone"] })),
    )
        .into_response()
}

async fn create_order(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(rejection) = record(&state, "POST", "/orders", &headers, HashMap::new(), body) {
        return rejection;
    }
    let failure = state.lock().unwrap().order_failure.clone();
    match failure {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (StatusCode::CREATED, Json(json!({ "id": "o1", "status": "created" }))).into_response(),
    }
}

async fn list_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(rejection) = record(&state, "GET", "/products", &headers, query, Value::Null) {
        return rejection;
    }
    Json(json!([
        { "id": "p1", "name": "Shea butter", "price": "10.00" },
        { "id": "p2", "name": "Kente scarf", "price": "29.99", "image": "kente.png" }
    ]))
    .into_response()
}
