use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use travel_planner_api::config::AiConfig;
use travel_planner_api::services::ai_client::{
    AiError, ChatMessage, DashScopeClient, GenerationRequest, TextGenerator,
};

const GENERATION_PATH: &str = "/services/aigc/text-generation/generation";

fn config(base_url: String) -> AiConfig {
    AiConfig {
        api_key: "test-key".to_string(),
        base_url,
        model: "qwen-turbo".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn request() -> GenerationRequest {
    GenerationRequest {
        messages: vec![
            ChatMessage::system("你是旅游规划师"),
            ChatMessage::user("你好"),
        ],
        temperature: Some(0.5),
        max_tokens: Some(3000),
    }
}

#[actix_rt::test]
async fn test_generate_reads_message_content_and_usage() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GENERATION_PATH)
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen-turbo",
            "input": { "messages": [
                { "role": "system", "content": "你是旅游规划师" },
                { "role": "user", "content": "你好" }
            ]},
            "parameters": {
                "result_format": "message",
                "temperature": 0.5,
                "max_tokens": 3000
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "output": { "choices": [
                    { "finish_reason": "stop", "message": { "role": "assistant", "content": "你好！" } }
                ]},
                "usage": { "input_tokens": 12, "output_tokens": 3, "total_tokens": 15 },
                "request_id": "abc"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = DashScopeClient::new(&config(server.url())).unwrap();
    let completion = client.generate(request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(completion.content, "你好！");
    assert_eq!(completion.usage.total_tokens, 15);
    assert_eq!(client.model(), "qwen-turbo");
}

#[actix_rt::test]
async fn test_generate_surfaces_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GENERATION_PATH)
        .with_status(401)
        .with_body(r#"{"code":"InvalidApiKey"}"#)
        .create_async()
        .await;

    let client = DashScopeClient::new(&config(server.url())).unwrap();
    let err = client.generate(request()).await.unwrap_err();

    match err {
        AiError::Status { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("InvalidApiKey"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[actix_rt::test]
async fn test_generate_without_choices_is_missing_content() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GENERATION_PATH)
        .with_status(200)
        .with_body(r#"{"output":{"choices":[]},"usage":{"total_tokens":0}}"#)
        .create_async()
        .await;

    let client = DashScopeClient::new(&config(server.url())).unwrap();
    let err = client.generate(request()).await.unwrap_err();
    assert!(matches!(err, AiError::MissingContent));
}

#[actix_rt::test]
async fn test_missing_api_key_fails_without_a_request() {
    let client = DashScopeClient::new(&AiConfig {
        api_key: String::new(),
        ..config("http://127.0.0.1:9".to_string())
    })
    .unwrap();

    let err = client.generate(request()).await.unwrap_err();
    assert!(matches!(err, AiError::Config(_)));
}
