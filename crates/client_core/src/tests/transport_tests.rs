use super::*;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{RecommendationKind, Role, ThreadId},
    protocol::ChatTurn,
};
use tokio::{net::TcpListener, sync::oneshot};

#[derive(Clone)]
struct CaptureState {
    tx: Arc<Mutex<Option<oneshot::Sender<(Option<String>, Value)>>>>,
}

async fn handle_chat(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send((content_type, body));
    }
    Json(json!({
        "reply": "I found 1 collaborators for 'lo-fi editor'. Want to invite any of them?",
        "recommendations": [{
            "id": "u-17",
            "kind": "collaborator",
            "title": "Rae Okafor",
            "subtitle": "editor",
            "media_url": null,
            "score": 0.8123,
            "meta": { "styles": ["lo-fi"], "portfolio_url": "https://rae.example" }
        }]
    }))
}

async fn spawn_router(app: Router) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_capture_server(
    path: &str,
) -> std::io::Result<(String, oneshot::Receiver<(Option<String>, Value)>)> {
    let (tx, rx) = oneshot::channel();
    let state = CaptureState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route(path, post(handle_chat))
        .with_state(state);
    Ok((spawn_router(app).await?, rx))
}

fn hello_request(thread_id: ThreadId) -> ChatRequest {
    ChatRequest {
        thread_id,
        messages: vec![
            ChatTurn {
                role: Role::Assistant,
                content: DEFAULT_GREETING.to_string(),
            },
            ChatTurn {
                role: Role::User,
                content: "need a lo-fi editor".to_string(),
            },
        ],
    }
}

#[test]
fn endpoint_appends_fixed_path_to_base() {
    assert_eq!(
        transport::chat_endpoint("http://localhost:8000"),
        "http://localhost:8000/api/chat"
    );
    assert_eq!(
        transport::chat_endpoint("https://chat.example/v1/"),
        "https://chat.example/v1/api/chat"
    );
}

#[tokio::test]
async fn posts_json_thread_and_decodes_reply() {
    let (base, rx) = spawn_capture_server("/api/chat").await.expect("server");
    let transport = HttpChatTransport::new(&base);
    let thread_id = ThreadId::generate();

    let response = transport
        .send_chat(&hello_request(thread_id))
        .await
        .expect("send chat");

    let (content_type, body) = rx.await.expect("captured request");
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        body,
        json!({
            "thread_id": thread_id.to_string(),
            "messages": [
                { "role": "assistant", "content": DEFAULT_GREETING },
                { "role": "user", "content": "need a lo-fi editor" }
            ]
        })
    );

    assert!(response.reply.starts_with("I found 1 collaborators"));
    assert_eq!(response.recommendations.len(), 1);
    let rec = &response.recommendations[0];
    assert_eq!(rec.kind, RecommendationKind::Collaborator);
    assert_eq!(rec.media_url, None);
    assert_eq!(rec.score, Some(0.8123));
    assert_eq!(rec.meta.styles, vec!["lo-fi"]);
}

#[tokio::test]
async fn base_with_path_prefix_and_trailing_slash_is_honored() {
    let (base, rx) = spawn_capture_server("/backend/api/chat")
        .await
        .expect("server");
    let transport = HttpChatTransport::new(format!("{base}/backend/"));

    transport
        .send_chat(&hello_request(ThreadId::generate()))
        .await
        .expect("send chat");
    assert!(rx.await.is_ok());
}

#[tokio::test]
async fn non_success_status_is_reported_with_detail() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": "thread_id: field required" })),
            )
        }),
    );
    let base = spawn_router(app).await.expect("server");

    let err = HttpChatTransport::new(&base)
        .send_chat(&hello_request(ThreadId::generate()))
        .await
        .unwrap_err();

    match err {
        TransportError::Status { status, detail } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(detail.as_deref(), Some("thread_id: field required"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_without_body_has_no_detail() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_router(app).await.expect("server");

    let err = HttpChatTransport::new(&base)
        .send_chat(&hello_request(ThreadId::generate()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::Status { status, detail: None }
            if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let app = Router::new().route("/api/chat", post(|| async { "definitely not json" }));
    let base = spawn_router(app).await.expect("server");

    let err = HttpChatTransport::new(&base)
        .send_chat(&hello_request(ThreadId::generate()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = HttpChatTransport::new(format!("http://{addr}"))
        .send_chat(&hello_request(ThreadId::generate()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn failed_http_round_trip_yields_fallback_turn() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = spawn_router(app).await.expect("server");
    let client = ChatClient::new(Arc::new(HttpChatTransport::new(&base)));

    assert_eq!(client.send("hello").await, SendOutcome::Failed);

    let messages = client.messages().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].content, FALLBACK_REPLY);
    assert!(messages[2].recommendations.is_none());
}

#[tokio::test]
async fn successful_http_round_trip_appends_cards() {
    let (base, _rx) = spawn_capture_server("/api/chat").await.expect("server");
    let client = ChatClient::new(Arc::new(HttpChatTransport::new(&base)));

    assert_eq!(client.send("need a lo-fi editor").await, SendOutcome::Replied);

    let latest = client.latest_with_recommendations().await.expect("cards");
    let recs = latest.recommendations.expect("recommendations");
    assert_eq!(recs[0].id, "u-17");
    assert_eq!(recs[0].meta.portfolio_url.as_deref(), Some("https://rae.example"));
}
