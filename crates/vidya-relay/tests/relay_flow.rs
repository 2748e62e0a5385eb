// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end relay behavior against scripted mock providers.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use vidya_core::{ChatProvider, ProviderErrorKind};
use vidya_relay::{ChatRelay, ProviderChain, RelayEvent};
use vidya_storage::Database;
use vidya_storage::queries::chat;
use vidya_test_utils::{MockProvider, MockScript};

async fn setup_db() -> (Arc<Database>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(
        Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap(),
    );
    (db, dir)
}

fn relay_over(db: Arc<Database>, providers: Vec<Arc<dyn ChatProvider>>) -> ChatRelay {
    let chain = ProviderChain::new(providers, Duration::from_secs(5));
    ChatRelay::new(db, chain, "llama3.2".to_string())
}

#[tokio::test]
async fn respond_appends_exactly_one_user_and_one_assistant_turn() {
    let (db, _dir) = setup_db().await;
    let primary = Arc::new(MockProvider::with_replies("rag", vec!["A fraction is a part."]));
    let relay = relay_over(db.clone(), vec![primary]);

    let outcome = relay
        .respond("u1", None, "what is a fraction?", "en")
        .await
        .unwrap();
    assert_eq!(outcome.response, "A fraction is a part.");

    let messages = chat::get_messages(&db, &outcome.session_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[0].content, "what is a fraction?");
    assert_eq!(messages[1].role, "assistant");
    assert_eq!(messages[1].content, "A fraction is a part.");
}

#[tokio::test]
async fn same_session_id_continues_the_same_conversation() {
    let (db, _dir) = setup_db().await;
    let primary = Arc::new(MockProvider::with_replies("rag", vec!["one", "two"]));
    let relay = relay_over(db.clone(), vec![primary]);

    let first = relay.respond("u1", None, "q1", "en").await.unwrap();
    let second = relay
        .respond("u1", Some(&first.session_id), "q2", "en")
        .await
        .unwrap();

    assert_eq!(first.session_id, second.session_id);
    let messages = chat::get_messages(&db, &first.session_id).await.unwrap();
    // Two exchanges: exactly four messages, alternating roles.
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].content, "q2");
    assert_eq!(messages[3].content, "two");
}

#[tokio::test]
async fn unhealthy_primary_is_skipped_without_a_chat_attempt() {
    let (db, _dir) = setup_db().await;
    let primary = Arc::new(MockProvider::with_replies("rag", vec!["never used"]));
    primary.set_healthy(false).await;
    let fallback = Arc::new(MockProvider::with_replies("ollama", vec!["from fallback"]));

    let relay = relay_over(db, vec![primary.clone(), fallback.clone()]);
    let outcome = relay.respond("u1", None, "hello", "en").await.unwrap();

    assert_eq!(outcome.response, "from fallback");
    assert!(primary.requests().await.is_empty());
    assert_eq!(fallback.requests().await.len(), 1);
}

#[tokio::test]
async fn healthy_primary_that_fails_falls_through() {
    let (db, _dir) = setup_db().await;
    let primary = Arc::new(MockProvider::new("rag"));
    primary
        .push(MockScript::Fail(
            ProviderErrorKind::Upstream,
            "empty reply".into(),
        ))
        .await;
    let fallback = Arc::new(MockProvider::with_replies("ollama", vec!["recovered"]));

    let relay = relay_over(db, vec![primary, fallback]);
    let outcome = relay.respond("u1", None, "hello", "en").await.unwrap();
    assert_eq!(outcome.response, "recovered");
}

#[tokio::test]
async fn total_provider_failure_degrades_to_an_apology() {
    let (db, _dir) = setup_db().await;
    let only = Arc::new(MockProvider::new("ollama"));
    only.push(MockScript::Fail(
        ProviderErrorKind::ModelNotFound,
        "404".into(),
    ))
    .await;

    let relay = relay_over(db.clone(), vec![only]);
    let outcome = relay.respond("u1", None, "hello", "en").await.unwrap();

    // Degraded but valid: the apology is the assistant turn, not an error.
    assert!(outcome.response.contains("llama3.2"));
    let messages = chat::get_messages(&db, &outcome.session_id).await.unwrap();
    assert_eq!(messages[1].content, outcome.response);
}

#[tokio::test]
async fn non_default_language_steers_prompt_and_last_message() {
    let (db, _dir) = setup_db().await;
    let provider = Arc::new(MockProvider::with_replies("ollama", vec!["उत्तर"]));
    let relay = relay_over(db, vec![provider.clone()]);

    relay.respond("u1", None, "what is light?", "hi").await.unwrap();

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let system = request.system_prompt.as_deref().unwrap();
    assert!(system.contains("HINDI"));
    let last = request.history.last().unwrap();
    assert!(last.content.starts_with("[Answer ONLY in Hindi]"));
    assert!(last.content.ends_with("what is light?"));
}

#[tokio::test]
async fn default_language_sends_plain_history() {
    let (db, _dir) = setup_db().await;
    let provider = Arc::new(MockProvider::with_replies("ollama", vec!["sure"]));
    let relay = relay_over(db, vec![provider.clone()]);

    relay.respond("u1", None, "plain question", "en").await.unwrap();

    let request = &provider.requests().await[0];
    assert_eq!(request.history.last().unwrap().content, "plain question");
    assert!(!request.system_prompt.as_deref().unwrap().contains("MANDATORY"));
}

#[tokio::test]
async fn stream_chunks_concatenate_to_the_terminal_full_response() {
    let (db, _dir) = setup_db().await;
    let provider = Arc::new(MockProvider::with_replies(
        "rag",
        vec!["light travels in straight lines"],
    ));
    let relay = relay_over(db.clone(), vec![provider]);

    let mut stream = relay
        .respond_stream("u1", None, "what is light?", "en")
        .await
        .unwrap();

    let mut chunks = String::new();
    let mut terminal = None;
    while let Some(event) = stream.next().await {
        match event {
            RelayEvent::Chunk(chunk) => chunks.push_str(&chunk),
            other => {
                terminal = Some(other);
                // A terminal event closes the exchange.
                assert!(stream.next().await.is_none());
                break;
            }
        }
    }

    let Some(RelayEvent::Done {
        session_id,
        full_response,
    }) = terminal
    else {
        panic!("expected Done terminal event");
    };
    assert_eq!(chunks, "light travels in straight lines");
    assert_eq!(full_response, chunks);

    // Persistence happened exactly once, after the stream ended.
    let messages = chat::get_messages(&db, &session_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, full_response);
}

#[tokio::test]
async fn mid_stream_failure_emits_one_diagnostic_then_done() {
    let (db, _dir) = setup_db().await;
    let provider = Arc::new(MockProvider::new("ollama"));
    provider
        .push(MockScript::StreamThenFail {
            chunks: vec!["partial ".into(), "answer".into()],
            message: "wire cut".into(),
        })
        .await;
    let relay = relay_over(db.clone(), vec![provider]);

    let mut stream = relay.respond_stream("u1", None, "hi", "en").await.unwrap();
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }

    // partial, answer, diagnostic chunk, then exactly one Done.
    assert_eq!(events.len(), 4);
    let RelayEvent::Done { full_response, .. } = events.last().unwrap() else {
        panic!("expected Done terminal event");
    };
    assert!(full_response.starts_with("partial answer"));
    assert!(full_response.contains("technical difficulties"));
    let RelayEvent::Chunk(diagnostic) = &events[2] else {
        panic!("expected diagnostic chunk");
    };
    assert!(diagnostic.contains("technical difficulties"));
}

#[tokio::test]
async fn stream_with_no_usable_provider_still_terminates_cleanly() {
    let (db, _dir) = setup_db().await;
    let only = Arc::new(MockProvider::new("ollama"));
    only.push(MockScript::Fail(
        ProviderErrorKind::ConnectionRefused,
        "refused".into(),
    ))
    .await;
    let relay = relay_over(db.clone(), vec![only]);

    let mut stream = relay.respond_stream("u1", None, "hi", "en").await.unwrap();
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], RelayEvent::Chunk(c) if c.contains("running")));
    assert!(events[1].is_terminal());
}

#[tokio::test]
async fn blank_message_is_rejected_before_any_session_work() {
    let (db, _dir) = setup_db().await;
    let relay = relay_over(db.clone(), vec![Arc::new(MockProvider::new("ollama"))]);

    let err = relay.respond("u1", None, "   ", "en").await.unwrap_err();
    assert!(matches!(err, vidya_core::VidyaError::Validation(_)));
    assert!(chat::list_sessions_for_user(&db, "u1", 20).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_session_id_is_healed_by_creation() {
    let (db, _dir) = setup_db().await;
    let relay = relay_over(
        db.clone(),
        vec![Arc::new(MockProvider::with_replies("ollama", vec!["ok"]))],
    );

    let outcome = relay
        .respond("u1", Some("not-a-session"), "hello", "en")
        .await
        .unwrap();
    let session = chat::get_session(&db, &outcome.session_id).await.unwrap().unwrap();
    assert_eq!(session.user_id, "u1");
}
