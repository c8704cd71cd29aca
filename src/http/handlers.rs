//! Counter and health route handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::counter::CounterOp;
use crate::http::server::AppState;

/// Response body of every counter route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterBody {
    pub count: u64,
}

/// `GET /counter`
pub async fn get_count(State(state): State<AppState>, headers: HeaderMap) -> Response {
    counter_response(&state, &headers, CounterOp::Get)
}

/// `PATCH /counter/up`
pub async fn increment(State(state): State<AppState>, headers: HeaderMap) -> Response {
    counter_response(&state, &headers, CounterOp::Increment)
}

/// `PATCH /counter/down`
pub async fn decrement(State(state): State<AppState>, headers: HeaderMap) -> Response {
    counter_response(&state, &headers, CounterOp::Decrement)
}

/// `GET /health`: empty 200 for load balancer health checks.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

fn counter_response(state: &AppState, headers: &HeaderMap, op: CounterOp) -> Response {
    let cookie_id = state.cookies.session_id(headers);
    let outcome = state.counter.execute(cookie_id.as_deref(), op);

    let mut response = Json(CounterBody {
        count: outcome.count,
    })
    .into_response();

    // Written on every response so the browser's Max-Age follows the
    // server-side TTL refresh.
    match state.cookies.header_value(&outcome.session_id) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode session cookie");
        }
    }

    response
}
