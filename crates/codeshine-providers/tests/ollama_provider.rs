use codeshine_providers::{
    FinishReason, GenerationHandle, GenerationOptions, InferenceProvider, OllamaProvider,
    ProviderError,
};
use futures::StreamExt;

const NDJSON_BODY: &str = concat!(
    r#"{"model":"m","response":"const ","done":false}"#,
    "\n",
    r#"{"model":"m","response":"x = 1;","done":false}"#,
    "\n",
    r#"{"model":"m","response":"","done":true,"done_reason":"stop","eval_count":2}"#,
    "\n"
);

#[tokio::test]
async fn test_generate_stream_relays_fragments() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("POST", "/api/generate")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"model":"m","stream":true}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/x-ndjson")
        .with_body(NDJSON_BODY)
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    let handle = provider
        .generate_stream("optimize", GenerationOptions::default())
        .await
        .unwrap();

    let GenerationHandle {
        stream, completion, ..
    } = handle;
    let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
    assert_eq!(fragments, vec!["const ".to_string(), "x = 1;".to_string()]);

    let summary = completion.await.unwrap();
    assert_eq!(summary.text, "const x = 1;");
    assert_eq!(summary.token_count, 2);
    assert_eq!(summary.finish_reason, FinishReason::Stop);
}

#[tokio::test]
async fn test_generate_stream_reports_length_stop() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(concat!(
            r#"{"response":"fn f() {","done":false}"#,
            "\n",
            r#"{"response":"","done":true,"done_reason":"length"}"#
        ))
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    let summary = provider
        .generate_stream("p", GenerationOptions::default())
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(summary.text, "fn f() {");
    assert_eq!(summary.finish_reason, FinishReason::Length);
}

#[tokio::test]
async fn test_generate_stream_missing_model() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error":"model 'm' not found"}"#)
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    let result = provider
        .generate_stream("p", GenerationOptions::default())
        .await;
    assert!(matches!(result, Err(ProviderError::NotFound(_))));
}

#[tokio::test]
async fn test_generate_stream_bad_request() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(400)
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    let result = provider
        .generate_stream("p", GenerationOptions::default())
        .await;
    assert!(matches!(result, Err(ProviderError::ProviderError(_))));
}

#[tokio::test]
async fn test_generate_stream_malformed_line() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body("not json\n")
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    let result = provider
        .generate_stream("p", GenerationOptions::default())
        .await
        .unwrap()
        .collect()
        .await;
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_health_check_success() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"models":[{"name":"m:latest"}]}"#)
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    assert_eq!(provider.health_check().await, Ok(true));
}

#[tokio::test]
async fn test_health_check_unhealthy_status() {
    let mut server = mockito::Server::new_async().await;
    let base_url = server.url();

    let _mock = server
        .mock("GET", "/api/tags")
        .with_status(404)
        .create_async()
        .await;

    let provider = OllamaProvider::new(base_url, "m").unwrap();
    assert_eq!(provider.health_check().await, Ok(false));
}
