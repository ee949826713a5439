//! Wire-format tests for the Ollama provider against a mock HTTP server

use localpilot_provider::{
    object_schema, ChatParams, Message, OllamaProvider, Provider, ProviderError, Tool,
};
use mockito::Matcher;
use serde_json::json;

fn provider_for(server: &mockito::ServerGuard) -> OllamaProvider {
    OllamaProvider::new(Some(server.url()), Some("qwen3:0.6b".to_string()))
}

#[tokio::test]
async fn test_chat_posts_expected_body_and_parses_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "model": "qwen3:0.6b",
                "stream": false,
                "think": true
            })),
            Matcher::Regex(r#""content":"make a file""#.to_string()),
            Matcher::Regex(r#""name":"create_file""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "qwen3:0.6b",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "thinking": "The user wants a file.",
                    "tool_calls": [{
                        "function": {
                            "name": "create_file",
                            "arguments": {"file_path": ".", "file_name": "snake.py"}
                        }
                    }]
                },
                "done": true,
                "done_reason": "stop",
                "eval_count": 12
            })
            .to_string(),
        )
        .create_async()
        .await;

    let params = ChatParams {
        model: "qwen3:0.6b".to_string(),
        messages: vec![Message::user("make a file")],
        tools: vec![Tool::new(
            "create_file",
            "Create an empty file",
            object_schema(&[("file_path", "dir", true), ("file_name", "name", true)]),
        )],
        think: true,
        temperature: None,
    };

    let response = provider_for(&server).chat(params).await.unwrap();
    mock.assert_async().await;

    assert_eq!(response.tool_calls().len(), 1);
    assert_eq!(response.tool_calls()[0].name(), "create_file");
    assert_eq!(
        response.tool_calls()[0].arguments()["file_name"],
        "snake.py"
    );
    assert_eq!(response.thinking(), Some("The user wants a file."));
    assert_eq!(response.usage.completion_tokens, 12);
}

#[tokio::test]
async fn test_chat_plain_answer() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(r#"{"message":{"role":"assistant","content":"Done."},"done":true}"#)
        .create_async()
        .await;

    let response = provider_for(&server)
        .chat(ChatParams::default())
        .await
        .unwrap();

    assert!(!response.has_tool_calls());
    assert_eq!(response.content(), Some("Done."));
    assert_eq!(response.done_reason, "stop");
}

#[tokio::test]
async fn test_chat_error_status_maps_to_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(404)
        .with_body(r#"{"error":"model \"ghost\" not found, try pulling it first"}"#)
        .create_async()
        .await;

    let err = provider_for(&server)
        .chat(ChatParams::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::Api(msg) => assert!(msg.contains("not found")),
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_garbage_body_is_json_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let err = provider_for(&server)
        .chat(ChatParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Json(_)));
}

#[tokio::test]
async fn test_chat_unreachable_backend_is_request_error() {
    let provider = OllamaProvider::new(Some("http://127.0.0.1:1".to_string()), None);
    let err = provider.chat(ChatParams::default()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Request(_)));
}

#[tokio::test]
async fn test_list_models() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_body(r#"{"models":[{"name":"qwen3:0.6b"},{"name":"llama3.2:latest"}]}"#)
        .create_async()
        .await;

    let models = provider_for(&server).list_models().await.unwrap();
    assert_eq!(models, vec!["qwen3:0.6b", "llama3.2:latest"]);
}
