use fitcoach_client::FitcoachError;
use fitcoach_client::chat::{ChatMessage, ChatModel, OpenAiChatClient};
use fitcoach_client::config::LlmConfig;
use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenAiChatClient {
    OpenAiChatClient::new(&LlmConfig {
        api_key: SecretString::new("sk-test".into()),
        base_url: format!("{}/v1", server.uri()),
        model: "gpt-3.5-turbo".into(),
        temperature: 0.7,
    })
}

#[tokio::test]
async fn complete_posts_model_and_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "coach"},
                {"role": "user", "content": "How many rest days?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Two per week."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete(&[
            ChatMessage::system("coach"),
            ChatMessage::user("How many rest days?"),
        ])
        .await
        .expect("reply");
    assert_eq!(reply, "Two per week.");
}

#[tokio::test]
async fn rate_limit_is_reported_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&[ChatMessage::user("hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, FitcoachError::Api { status: 429, .. }));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let res = client(&server).complete(&[ChatMessage::user("hi")]).await;
    assert!(res.is_err());
}
