/*!
 * Tests for the HTTP providers against a local mock server
 */

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yadtwai::errors::ProviderError;
use yadtwai::providers::anthropic::Anthropic;
use yadtwai::providers::ollama::Ollama;
use yadtwai::providers::openai::OpenAI;
use yadtwai::providers::{ChatMessage, Provider};

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You translate documentation."),
        ChatMessage::user("# Hello\n"),
    ]
}

#[tokio::test]
async fn test_openaiChat_shouldSendBearerAndReturnUsage() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-test", "messages": [{"role": "system"}, {"role": "user"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "# Bonjour\n"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/v1", mock_server.uri());
    let provider = OpenAI::new("sk-test", &endpoint, "gpt-test", 0.0, 5).unwrap();
    let completion = provider.chat(&messages()).await.unwrap();

    assert_eq!(completion.content, "# Bonjour\n");
    assert_eq!(completion.prompt_tokens, Some(12));
    assert_eq!(completion.completion_tokens, Some(3));
}

#[tokio::test]
async fn test_openaiChat_withStatusErrors_shouldMapToProviderErrors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bad-key/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/busy/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/empty/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let client = |suffix: &str| OpenAI::new("k", &format!("{}/{}", mock_server.uri(), suffix), "m", 0.0, 5).unwrap();

    let auth = client("bad-key").chat(&messages()).await.unwrap_err();
    assert!(matches!(auth, ProviderError::AuthenticationError(_)));

    let busy = client("busy").chat(&messages()).await.unwrap_err();
    assert!(matches!(busy, ProviderError::RateLimitExceeded(_)));

    let empty = client("empty").chat(&messages()).await.unwrap_err();
    assert!(matches!(empty, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn test_anthropicChat_shouldLiftSystemPromptAndSendHeaders() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "system": "You translate documentation.",
            "messages": [{"role": "user", "content": "# Hello\n"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "# Bonjour\n"}],
            "usage": {"input_tokens": 20, "output_tokens": 4}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = Anthropic::new("ak-test", &mock_server.uri(), "claude-test", 0.0, 5).unwrap();
    let completion = provider.chat(&messages()).await.unwrap();

    assert_eq!(completion.content, "# Bonjour\n");
    assert_eq!(completion.prompt_tokens, Some(20));
    assert_eq!(provider.name(), "Anthropic");
}

#[tokio::test]
async fn test_ollamaChat_shouldDisableStreamingAndReadCounts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "llama-test", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama-test",
            "message": {"role": "assistant", "content": "# Bonjour\n"},
            "done": true,
            "prompt_eval_count": 30,
            "eval_count": 5
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "0.5.1"})))
        .mount(&mock_server)
        .await;

    let provider = Ollama::new(&mock_server.uri(), "llama-test", 0.0, 5).unwrap();

    assert_eq!(provider.version().await.unwrap(), "0.5.1");
    assert!(provider.test_connection().await.is_ok());
    let completion = provider.chat(&messages()).await.unwrap();
    assert_eq!(completion.content, "# Bonjour\n");
    assert_eq!(completion.completion_tokens, Some(5));
}

#[tokio::test]
async fn test_ollamaChat_withServerError_shouldReturnApiError() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&mock_server)
        .await;

    let provider = Ollama::new(&mock_server.uri(), "llama-test", 0.0, 5).unwrap();
    let error = provider.chat(&messages()).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 500, .. }));
}
