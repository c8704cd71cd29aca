//! Access logging with client identity resolved from `Forwarded`.
//!
//! The resolved `ClientContext` is attached to the request extensions and
//! written to the log. It never influences session binding or routing.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath},
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::forwarded::{parse_forwarded_headers, ClientContext, TransportSecurity};
use crate::http::request::request_id;
use crate::observability::metrics;

pub async fn access_log_middleware(mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let transport = request
        .extensions()
        .get::<TransportSecurity>()
        .copied()
        .unwrap_or_default();
    let chain = parse_forwarded_headers(request.headers());
    let client = ClientContext::resolve(&chain, peer, transport);

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| path.clone());
    let request_id = request_id(request.headers()).to_string();

    tracing::info!(
        request_id = %request_id,
        client_ip = %client.ip,
        protocol = %client.protocol,
        secure = client.is_secure(),
        hops = chain.len(),
        method = %method,
        path = %path,
        "Request"
    );

    request.extensions_mut().insert(client);
    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        path = %path,
        status = status.as_u16(),
        set_cookie = response.headers().contains_key(header::SET_COOKIE),
        latency_ms = start.elapsed().as_millis() as u64,
        "Response"
    );
    metrics::record_request(method.as_str(), &route, status.as_u16(), start);

    response
}
