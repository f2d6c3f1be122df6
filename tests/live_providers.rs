//! Requests against the real provider APIs.
//!
//! Run with `cargo test --test live_providers -- --ignored` and
//! `GEMINI_API_KEY` or `OPENAI_API_KEY` set.

use promptforge::llm::{DispatcherSettings, ProviderConfig, ProviderKind, ReqwestTransport};
use promptforge::ProviderDispatcher;
use std::sync::Arc;
use std::time::Duration;
use test_tag::tag;

fn live_dispatcher() -> ProviderDispatcher {
    let transport = ReqwestTransport::new(Duration::from_secs(60)).unwrap();
    ProviderDispatcher::new(Arc::new(transport), DispatcherSettings::default())
}

#[tokio::test]
#[tag(live)]
#[ignore]
async fn test_gemini_text_live() {
    if std::env::var("GEMINI_API_KEY").is_err() {
        eprintln!("GEMINI_API_KEY not set, skipping");
        return;
    }
    let config = ProviderConfig::new(ProviderKind::Gemini, "");

    let text = live_dispatcher()
        .generate_text("Reply with the single word: pong", &config)
        .await
        .unwrap();
    assert!(text.to_lowercase().contains("pong"));
}

#[tokio::test]
#[tag(live)]
#[ignore]
async fn test_openai_text_live() {
    let Ok(key) = std::env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY not set, skipping");
        return;
    };
    let config = ProviderConfig::new(ProviderKind::OpenAI, key).with_model("gpt-4o");

    let text = live_dispatcher()
        .generate_text("Reply with the single word: pong", &config)
        .await
        .unwrap();
    assert!(!text.is_empty());
}
