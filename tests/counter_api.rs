//! End-to-end tests of the counter HTTP API.

use std::time::Duration;

use counter_sdk::CounterClient;
use reqwest::header::SET_COOKIE;
use reqwest::{Method, StatusCode};
use session_counter::config::Environment;
use session_counter::http::CounterBody;
use session_counter::CounterConfig;

mod common;

const COOKIE: &str = "counter.sid";

async fn call(
    client: &reqwest::Client,
    method: Method,
    url: String,
    session: Option<&str>,
) -> (CounterBody, String) {
    let mut req = client.request(method, url);
    if let Some(id) = session {
        let (name, value) = common::cookie_header(COOKIE, id);
        req = req.header(name, value);
    }
    let res = req.send().await.expect("server unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    let id = common::session_cookie(res.headers(), COOKIE).expect("session cookie missing");
    (res.json::<CounterBody>().await.unwrap(), id)
}

#[tokio::test]
async fn test_first_get_creates_session() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = common::bare_client();

    let res = client.get(server.url("/counter")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("counter.sid="));
    assert!(set_cookie.contains("Path=/counter"));
    assert!(set_cookie.contains("Max-Age=3600"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(!set_cookie.contains("Secure"));

    assert_eq!(res.json::<CounterBody>().await.unwrap(), CounterBody { count: 0 });
    assert_eq!(server.sessions.len(), 1);
}

#[tokio::test]
async fn test_up_down_round_trip() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = common::bare_client();

    let (body, id) = call(&client, Method::GET, server.url("/counter"), None).await;
    assert_eq!(body.count, 0);

    let steps = [
        ("/counter/up", 1),
        ("/counter/up", 2),
        ("/counter/down", 1),
        ("/counter/down", 0),
        ("/counter/down", 0),
    ];
    for (path, expected) in steps {
        let (body, same) = call(&client, Method::PATCH, server.url(path), Some(&id)).await;
        assert_eq!(body.count, expected, "after PATCH {}", path);
        assert_eq!(same, id, "session id must be re-issued unchanged");
    }

    let (body, _) = call(&client, Method::GET, server.url("/counter"), Some(&id)).await;
    assert_eq!(body.count, 0);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = common::bare_client();

    let (_, alice) = call(&client, Method::GET, server.url("/counter"), None).await;
    let (_, bob) = call(&client, Method::GET, server.url("/counter"), None).await;
    assert_ne!(alice, bob);

    for _ in 0..3 {
        call(&client, Method::PATCH, server.url("/counter/up"), Some(&alice)).await;
    }
    call(&client, Method::PATCH, server.url("/counter/up"), Some(&bob)).await;

    let (a, _) = call(&client, Method::GET, server.url("/counter"), Some(&alice)).await;
    let (b, _) = call(&client, Method::GET, server.url("/counter"), Some(&bob)).await;
    assert_eq!(a.count, 3);
    assert_eq!(b.count, 1);
}

#[tokio::test]
async fn test_unknown_session_replaced() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = common::bare_client();

    let (body, id) = call(
        &client,
        Method::PATCH,
        server.url("/counter/up"),
        Some("forged-or-stale"),
    )
    .await;
    assert_ne!(id, "forged-or-stale");
    assert_eq!(body.count, 1);
}

#[tokio::test]
async fn test_expired_session_starts_over() {
    let mut config = CounterConfig::default();
    config.session.ttl_secs = 1;
    let server = common::spawn_server(config).await;
    let client = common::bare_client();

    let (_, id) = call(&client, Method::PATCH, server.url("/counter/up"), None).await;
    let (body, _) = call(&client, Method::PATCH, server.url("/counter/up"), Some(&id)).await;
    assert_eq!(body.count, 2);

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let (body, fresh) = call(&client, Method::GET, server.url("/counter"), Some(&id)).await;
    assert_ne!(fresh, id);
    assert_eq!(body.count, 0);
}

#[tokio::test]
async fn test_production_cookie_attributes() {
    let mut config = CounterConfig::default();
    config.deployment.environment = Environment::Production;
    config.session.cookie_name = "app.sid".into();
    let server = common::spawn_server(config).await;

    let res = common::bare_client()
        .get(server.url("/counter"))
        .send()
        .await
        .unwrap();
    let set_cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("app.sid="));
    assert!(set_cookie.contains("SameSite=None"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("Partitioned"));
}

#[tokio::test]
async fn test_forwarded_header_does_not_affect_counter() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = common::bare_client();

    for forwarded in [
        "for=192.0.2.1;proto=https",
        "for=192.0.2.1, for=198.51.100.2",
        "for=192.0.2.1;bogus, proto=http",
        ";;=,,",
    ] {
        let res = client
            .patch(server.url("/counter/up"))
            .header("Forwarded", forwarded)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "Forwarded: {}", forwarded);
        assert_eq!(res.json::<CounterBody>().await.unwrap().count, 1);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = common::spawn_server(CounterConfig::default()).await;

    let res = common::bare_client()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(SET_COOKIE).is_none());
    assert!(res.text().await.unwrap().is_empty());
    assert!(server.sessions.is_empty());
}

#[tokio::test]
async fn test_sdk_client_keeps_session() {
    let server = common::spawn_server(CounterConfig::default()).await;
    let client = CounterClient::new(&server.url("")).unwrap();

    assert_eq!(client.get_count().await.unwrap().count, 0);
    assert_eq!(client.increment().await.unwrap().count, 1);
    assert_eq!(client.increment().await.unwrap().count, 2);
    assert_eq!(client.decrement().await.unwrap().count, 1);
    assert_eq!(server.sessions.len(), 1);
}
