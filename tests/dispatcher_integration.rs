//! Dispatcher flows against a scripted transport.

mod common;

use common::{MockTransport, dispatcher};
use promptforge::audio::AudioContext;
use promptforge::llm::video_job::STATUS_IN_PROGRESS;
use promptforge::llm::{ErrorKind, HttpResponse, ProviderConfig, ProviderKind, VideoOptions};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn chat_reply(text: &str) -> HttpResponse {
    HttpResponse::from_json(200, &json!({"choices": [{"message": {"content": text}}]}))
}

#[tokio::test]
async fn test_assembled_prompt_reaches_provider() {
    let transport = MockTransport::with(vec![chat_reply("Outline ready")]);
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = dispatcher(transport.clone(), &temp_dir, Duration::ZERO);

    let template = promptforge::builtin_templates().remove(0);
    let inputs = promptforge::PromptInputs::for_template(&template).with("TOPIC", "Rust");
    let prompt = promptforge::assemble_prompt(&inputs, &template);
    let config = ProviderConfig::new(ProviderKind::DeepSeek, "sk-test");

    let text = dispatcher.generate_text(&prompt, &config).await.unwrap();
    assert_eq!(text, "Outline ready");

    let body = transport.request(0).body.unwrap();
    assert_eq!(body["model"], "deepseek-chat");
    assert_eq!(body["messages"][0]["content"], prompt.as_str());
}

#[tokio::test]
async fn test_media_requests_rejected_for_generic_providers() {
    let transport = MockTransport::with(Vec::new());
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = dispatcher(transport.clone(), &temp_dir, Duration::ZERO);
    let config = ProviderConfig::new(ProviderKind::Grok, "xai-key");

    let speech = dispatcher.generate_speech("hi", &config, None).await;
    assert_eq!(speech.unwrap_err().kind(), ErrorKind::CapabilityNotSupported);

    let video = dispatcher
        .generate_video("hi", &config, &|_: &str| {}, None, VideoOptions::default())
        .await;
    assert_eq!(video.unwrap_err().kind(), ErrorKind::CapabilityNotSupported);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_speech_renders_to_wav() {
    // 0x0000, 0x7fff, 0x8000 as little-endian PCM
    let transport = MockTransport::with(vec![HttpResponse::from_json(
        200,
        &json!({"candidates": [{"content": {"parts": [{"inlineData": {"data": "AAD/fwCA"}}]}}]}),
    )]);
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = dispatcher(transport, &temp_dir, Duration::ZERO);
    let config = ProviderConfig::new(ProviderKind::Gemini, "test-key");

    let audio = dispatcher
        .generate_speech("Hello", &config, None)
        .await
        .unwrap();

    let mut context = AudioContext::new(temp_dir.path().join("audio"));
    let rendered = context.render(&audio).unwrap();
    context.close();

    let reader = hound::WavReader::open(&rendered.path).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len(), 3);
}

#[tokio::test]
async fn test_video_cancelled_while_waiting_between_polls() {
    let transport = MockTransport::with(vec![HttpResponse::from_json(
        200,
        &json!({"name": "operations/op-1", "done": false}),
    )]);
    let temp_dir = TempDir::new().unwrap();
    let dispatcher = dispatcher(transport.clone(), &temp_dir, Duration::from_secs(3600));
    let config = ProviderConfig::new(ProviderKind::Gemini, "test-key");

    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = events.clone();
    let on_progress = move |status: &str| sink.lock().unwrap().push(status.to_string());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.generate_video(
            "A quiet harbor",
            &config,
            &on_progress,
            Some(&cancel),
            VideoOptions::default(),
        ),
    )
    .await
    .expect("cancellation should interrupt the poll wait")
    .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(transport.calls(), 1);
    assert!(!temp_dir.path().join("media").exists());
    assert_eq!(
        events.lock().unwrap().last().map(String::as_str),
        Some(STATUS_IN_PROGRESS)
    );
}
