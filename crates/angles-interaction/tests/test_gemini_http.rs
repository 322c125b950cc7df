use angles_core::GenerationError;
use angles_interaction::{
    GeminiApiAgent, GenerateContentRequest, GenerationConfig, GenerativeModel, Part,
};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Captured request: request line and JSON body.
struct Captured {
    request_line: String,
    body: Value,
}

/// Serves exactly one HTTP response and reports what was received.
async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        // Read headers, then as many body bytes as Content-Length says.
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let request_line = headers.lines().next().unwrap_or_default().to_string();
        let body_end = buf.len().min(header_end + content_length);
        let body = serde_json::from_slice(&buf[header_end..body_end]).unwrap_or(Value::Null);
        let _ = tx.send(Captured { request_line, body });
    });

    (format!("http://{addr}/v1beta/models"), rx)
}

/// Local test servers must not go through a proxy from the environment.
fn agent(api_key: &str, base_url: String) -> GeminiApiAgent {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiApiAgent::new(api_key, "gemini-2.5-flash")
        .with_client(client)
        .with_base_url(base_url)
}

fn sample_request() -> GenerateContentRequest {
    GenerateContentRequest::user(vec![
        Part::inline_data("image/png", &[1, 2, 3]),
        Part::text("transcript goes here"),
    ])
    .with_system_instruction("system text")
    .with_generation_config(GenerationConfig::json_with_schema(json!({"type": "OBJECT"})))
}

#[tokio::test]
async fn test_successful_call_returns_text_and_sends_expected_request() {
    let envelope = json!({
        "candidates": [{
            "content": {"parts": [{"text": "{\"angles\": []}"}]}
        }]
    })
    .to_string();
    let (base_url, captured) = serve_once("200 OK", envelope).await;

    let agent = agent("test-key", base_url);
    let text = agent.generate_content(&sample_request()).await.unwrap();
    assert_eq!(text, "{\"angles\": []}");

    let captured = captured.await.unwrap();
    assert!(
        captured
            .request_line
            .starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent?key=test-key"),
        "unexpected request line: {}",
        captured.request_line
    );
    assert_eq!(
        captured.body["contents"][0]["parts"][0]["inlineData"]["data"],
        "AQID"
    );
    assert_eq!(
        captured.body["contents"][0]["parts"][1]["text"],
        "transcript goes here"
    );
    assert_eq!(
        captured.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(
        captured.body["systemInstruction"]["parts"][0]["text"],
        "system text"
    );
}

#[tokio::test]
async fn test_error_status_maps_to_transport() {
    let body = json!({
        "error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}
    })
    .to_string();
    let (base_url, _captured) = serve_once("403 Forbidden", body).await;

    let agent = agent("bad-key", base_url);
    let err = agent.generate_content(&sample_request()).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::transport(Some(403), "PERMISSION_DENIED: Permission denied")
    );
}

#[tokio::test]
async fn test_candidates_without_text_is_empty_response() {
    let body = json!({"candidates": [{"content": {"parts": []}}]}).to_string();
    let (base_url, _captured) = serve_once("200 OK", body).await;

    let agent = agent("k", base_url);
    let err = agent.generate_content(&sample_request()).await.unwrap_err();
    assert_eq!(err, GenerationError::EmptyResponse);
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    // Bind and drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let agent = agent("k", format!("http://{addr}/v1beta/models"));
    let err = agent.generate_content(&sample_request()).await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}
