//! Integration tests for the capture pipeline
//!
//! Drives scripted browser sessions through the app controller and checks
//! what ends up captured.

use req_capture::capture::{
    run_capture, stop_channel, CaptureListener, CaptureStore, Cookie, Headers, MockBrowserSession,
    NetworkEvent, NetworkRequest, NetworkResponse,
};
use req_capture::{App, CaptureEvent, Config};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

fn headers(value: Value) -> Headers {
    match value {
        Value::Object(map) => map,
        _ => Headers::new(),
    }
}

fn get(id: &str, url: &str) -> NetworkEvent {
    NetworkEvent::RequestWillBeSent {
        request_id: id.to_string(),
        request: NetworkRequest {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: headers(json!({"User-Agent": "Mozilla/5.0"})),
            post_data: None,
        },
    }
}

fn post_json(id: &str, url: &str, body: &str) -> NetworkEvent {
    NetworkEvent::RequestWillBeSent {
        request_id: id.to_string(),
        request: NetworkRequest {
            url: url.to_string(),
            method: "POST".to_string(),
            headers: headers(json!({
                "Content-Type": "application/json",
                "Authorization": "Bearer t"
            })),
            post_data: Some(body.to_string()),
        },
    }
}

fn json_response(id: &str, url: &str, status: i64) -> NetworkEvent {
    NetworkEvent::ResponseReceived {
        request_id: id.to_string(),
        response: NetworkResponse {
            url: url.to_string(),
            status,
            headers: headers(json!({"content-type": "application/json"})),
        },
    }
}

fn scripted_session() -> MockBrowserSession {
    MockBrowserSession::new()
        .with_event(get("1", "https://api.example/topics?page=1"))
        .with_event(get("2", "https://cdn.example/app.js"))
        .with_event(post_json("3", "https://api.example/login", r#"{"user":"a"}"#))
        .with_event(json_response("1", "https://api.example/topics?page=1", 200))
        .with_event(json_response("3", "https://api.example/login", 401))
        .with_cookie(Cookie::new("sid", "abc"))
        .with_cookie(Cookie::new("lang", "en"))
        .with_body("1", r#"{"topics":[]}"#)
}

async fn wait_for_captures(rx: &mut broadcast::Receiver<CaptureEvent>, count: usize) {
    let mut seen = 0;
    while seen < count {
        match rx.recv().await.unwrap() {
            CaptureEvent::RequestCaptured { .. } => seen += 1,
            _ => {}
        }
    }
}

#[tokio::test]
async fn test_run_capture_finalizes_answered_requests() {
    let (events, mut rx) = broadcast::channel(64);
    let store = CaptureStore::new();
    let listener = CaptureListener::new(store.clone(), events);
    let (handle, signal) = stop_channel();

    let session = scripted_session();
    let closed = session.closed();
    let task = tokio::spawn(run_capture(session, Config::default(), signal, listener));

    wait_for_captures(&mut rx, 2).await;
    assert!(handle.signal());

    let mut captured = task.await.unwrap().unwrap();
    captured.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(captured.len(), 2);

    let login = &captured[0];
    assert_eq!(login.url, "https://api.example/login");
    assert_eq!(login.method, "POST");
    assert_eq!(login.validator.status_code, 401);
    assert_eq!(login.header.authorization, "Bearer t");
    assert_eq!(login.data.payload, r#"{"user":"a"}"#);
    assert_eq!(login.header.cookies, "sid=abc; lang=en");
    assert!(login.response_body.is_empty());

    let topics = &captured[1];
    assert_eq!(topics.url, "https://api.example/topics");
    assert_eq!(topics.data.params, "page=1");
    assert_eq!(topics.header.user_agent, "Mozilla/5.0");
    assert_eq!(topics.response_text(), Some(r#"{"topics":[]}"#));

    assert_eq!(store.len(), 2);
    assert!(store.get("https://cdn.example/app.js").is_none());
    assert!(*closed.lock());
}

#[tokio::test]
async fn test_session_navigates_to_default_url() {
    let app = App::default();
    let session = MockBrowserSession::new();
    let visited = session.visited();
    let mut rx = app.subscribe();

    let task = app.open_browser(session);
    match rx.recv().await.unwrap() {
        CaptureEvent::SessionStarted { url } => {
            assert_eq!(url, "https://studygolang.com/topics");
        }
        other => panic!("unexpected event: {:?}", other),
    }

    app.close_browser();
    task.await.unwrap().unwrap();
    assert_eq!(visited.lock().as_slice(), ["https://studygolang.com/topics"]);
}

#[tokio::test(start_paused = true)]
async fn test_close_browser_stops_one_session() {
    let app = App::new(Config::new().with_url("https://example.com"));

    let mut first = app.open_browser(MockBrowserSession::new());
    let mut second = app.open_browser(MockBrowserSession::new());

    assert!(app.close_browser());

    let mut remaining = tokio::select! {
        result = &mut first => {
            result.unwrap().unwrap();
            second
        }
        result = &mut second => {
            result.unwrap().unwrap();
            first
        }
    };

    // The clock only advances once every task is idle.
    assert!(timeout(Duration::from_secs(1), &mut remaining).await.is_err());

    app.close_all_browsers();
    remaining.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_close_all_stops_every_session_and_resets() {
    let app = App::new(Config::new().with_url("https://example.com"));

    let tasks: Vec<_> = (0..3)
        .map(|_| app.open_browser(MockBrowserSession::new()))
        .collect();

    app.close_all_browsers();
    for task in tasks {
        let captured = timeout(Duration::from_secs(5), task)
            .await
            .expect("session did not stop")
            .unwrap()
            .unwrap();
        assert!(captured.is_empty());
    }

    assert!(!app.close_browser());
    let again = app.open_browser(MockBrowserSession::new());
    assert!(app.close_browser());
    again.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_navigation_discards_pending_stop() {
    let app = App::new(Config::new().with_url("https://example.com"));
    let mut rx = app.subscribe();

    assert!(!app.close_browser());
    let failing = app.open_browser(
        MockBrowserSession::new().failing_navigation(),
    );
    assert!(app.close_browser());

    assert!(failing.await.unwrap().is_err());
    assert!(rx.try_recv().is_err());

    // The stop meant for the failed session must not end this one.
    let mut next = app.open_browser(MockBrowserSession::new());
    assert!(timeout(Duration::from_secs(1), &mut next).await.is_err());

    assert!(app.close_browser());
    next.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_set_config_applies_to_next_session() {
    let app = App::new(Config::new().with_url("https://first.example"));
    app.set_config(Config::create_from(json!({"URL": "https://second.example"})).unwrap());

    let session = MockBrowserSession::new();
    let visited = session.visited();
    let task = app.open_browser(session);

    app.close_browser();
    task.await.unwrap().unwrap();
    assert_eq!(visited.lock().as_slice(), ["https://second.example"]);
}
