//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use session_counter::session::SessionStore;
use session_counter::{CounterConfig, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A counter server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub sessions: Arc<SessionStore>,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server with `config`; the listener is bound before returning.
pub async fn spawn_server(config: CounterConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let sessions = server.sessions();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        sessions,
        shutdown,
    }
}

/// Client without a cookie store, so tests control the `Cookie` header.
#[allow(dead_code)]
pub fn bare_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Value of the named cookie in the response's `Set-Cookie` headers.
#[allow(dead_code)]
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

/// `Cookie` header carrying a session id.
#[allow(dead_code)]
pub fn cookie_header(name: &str, id: &str) -> (reqwest::header::HeaderName, String) {
    (COOKIE, format!("{}={}", name, id))
}
