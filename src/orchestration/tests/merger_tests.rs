//! Unit tests for the pipeline run driven by the stream merger.

use std::sync::Arc;

use futures::{StreamExt, stream};
use rstest::rstest;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::{multiply, registry};
use crate::message::domain::{Message, Part, Role, ToolCallId, ToolCallState};
use crate::orchestration::adapters::{ScriptedGenerationProvider, ScriptedResponse};
use crate::orchestration::domain::{StreamEvent, ToolOutcome, ToolPhase};
use crate::orchestration::ports::{GenerationChunk, GenerationError, MockGenerationProvider};
use crate::orchestration::services::{EventSink, StreamMerger, SystemPrompt};
use crate::test_support::{FixedClock, approve, call, deny, message, pending_call};

type ScriptedMerger = StreamMerger<ScriptedGenerationProvider, FixedClock>;

fn scripted(responses: Vec<ScriptedResponse>) -> (ScriptedMerger, ScriptedGenerationProvider) {
    let provider = ScriptedGenerationProvider::new(responses);
    let merger = StreamMerger::new(
        Arc::new(provider.clone()),
        registry(),
        FixedClock::default(),
    );
    (merger, provider)
}

fn silent_provider() -> Arc<MockGenerationProvider> {
    let mut provider = MockGenerationProvider::new();
    provider.expect_generate().times(0);
    Arc::new(provider)
}

async fn run<P>(
    merger: &StreamMerger<P, FixedClock>,
    history: &[Message],
    cancel: &CancellationToken,
) -> (Vec<Message>, Vec<StreamEvent>)
where
    P: crate::orchestration::ports::GenerationProvider + ?Sized,
{
    let (sink, stream) = EventSink::channel();
    let messages = merger.run(history, sink, cancel).await;
    let events = stream.collect().await;
    (messages, events)
}

fn delta(text: &str) -> GenerationChunk {
    GenerationChunk::TextDelta {
        text: text.to_owned(),
    }
}

fn declare(id: &str, name: &str, input: serde_json::Value) -> GenerationChunk {
    GenerationChunk::ToolCall {
        tool_call_id: ToolCallId::new(id),
        tool_name: name.to_owned(),
        input,
    }
}

fn done_count(events: &[StreamEvent]) -> usize {
    events.iter().filter(|event| event.is_done()).count()
}

fn greeting() -> Vec<Message> {
    vec![message("u1", Role::User, vec![Part::text("hello")])]
}

#[rstest]
#[tokio::test]
async fn forwards_tokens_and_records_assistant_reply() {
    let (merger, provider) = scripted(vec![ScriptedResponse::new(vec![
        delta("Hel"),
        delta("lo!"),
        GenerationChunk::Finished,
    ])]);

    let (messages, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::TokenDelta {
                text: "Hel".to_owned()
            },
            StreamEvent::TokenDelta {
                text: "lo!".to_owned()
            },
            StreamEvent::Done,
        ]
    );
    let reply = messages.last().expect("assistant reply");
    assert_eq!(reply.role(), Role::Assistant);
    assert_eq!(reply.parts(), &[Part::text("Hello!")]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("one request");
    assert!(request.system.contains("2026-03-14T09:00:00+00:00"));
    assert_eq!(request.settings.model, "gpt-4o-mini");
    assert!(request.tools.iter().any(|tool| tool.name() == "calculator"));
}

#[rstest]
#[tokio::test]
async fn pending_confirmation_ends_run_without_generation() {
    let merger = StreamMerger::new(silent_provider(), registry(), FixedClock::default());
    let history = vec![
        message("u1", Role::User, vec![Part::text("multiply 3 and 4, then delete X")]),
        message(
            "a1",
            Role::Assistant,
            vec![
                pending_call("c1", "calculator", multiply(3, 4)),
                pending_call("c2", "delete_file", json!({"path": "X"})),
            ],
        ),
    ];

    let (messages, events) = run(&merger, &history, &CancellationToken::new()).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::ToolStatus {
                tool_call_id: "c1".into(),
                tool_name: "calculator".to_owned(),
                phase: ToolPhase::Completed,
            },
            StreamEvent::ToolResult {
                tool_call_id: "c1".into(),
                outcome: ToolOutcome::Output { output: json!(12) },
            },
            StreamEvent::ToolStatus {
                tool_call_id: "c2".into(),
                tool_name: "delete_file".to_owned(),
                phase: ToolPhase::AwaitingConfirmation,
            },
            StreamEvent::Done,
        ]
    );
    assert_eq!(messages.len(), 2);
}

#[rstest]
#[tokio::test]
async fn decision_run_sends_resolved_history_to_generation() {
    let (merger, provider) = scripted(vec![ScriptedResponse::text("Understood, X stays.")]);
    let history = vec![
        message("u1", Role::User, vec![Part::text("multiply 3 and 4, then delete X")]),
        message(
            "a1",
            Role::Assistant,
            vec![
                call(
                    "c1",
                    "calculator",
                    multiply(3, 4),
                    ToolCallState::OutputAvailable { output: json!(12) },
                ),
                pending_call("c2", "delete_file", json!({"path": "X"})),
            ],
        ),
        message("u2", Role::User, vec![deny("c2", None)]),
    ];

    let (_, events) = run(&merger, &history, &CancellationToken::new()).await;

    assert_eq!(
        events.first(),
        Some(&StreamEvent::ToolStatus {
            tool_call_id: "c2".into(),
            tool_name: "delete_file".to_owned(),
            phase: ToolPhase::Denied,
        })
    );
    assert_eq!(done_count(&events), 1);
    assert!(events.last().is_some_and(StreamEvent::is_done));

    let requests = provider.requests();
    let sent = &requests.first().expect("one request").messages;
    let states: Vec<&str> = sent
        .iter()
        .flat_map(Message::tool_calls)
        .map(|call| call.state.as_str())
        .collect();
    assert_eq!(states, vec!["output-available", "output-error"]);
}

#[rstest]
#[tokio::test]
async fn model_declared_calls_are_orchestrated_then_generation_resumes() {
    let (merger, provider) = scripted(vec![
        ScriptedResponse::new(vec![
            delta("Computing. "),
            declare("g1", "calculator", multiply(6, 7)),
            GenerationChunk::Finished,
        ]),
        ScriptedResponse::text("It is 42."),
    ]);

    let (messages, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    let kinds: Vec<String> = events
        .iter()
        .map(|event| match event {
            StreamEvent::TokenDelta { .. } => "token-delta".to_owned(),
            StreamEvent::ToolInput { .. } => "tool-input".to_owned(),
            StreamEvent::ToolStatus { phase, .. } => format!("tool-status:{}", phase.as_str()),
            StreamEvent::ToolResult { .. } => "tool-result".to_owned(),
            StreamEvent::Done => "done".to_owned(),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "token-delta",
            "tool-input",
            "tool-status:completed",
            "tool-result",
            "token-delta",
            "done",
        ]
    );

    let roles: Vec<Role> = messages.iter().map(Message::role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Assistant]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let follow_up = requests.get(1).expect("second request");
    let resolved = follow_up
        .messages
        .iter()
        .flat_map(Message::tool_calls)
        .next()
        .expect("declared call present");
    assert_eq!(resolved.state, ToolCallState::OutputAvailable { output: json!(42) });
}

#[rstest]
#[tokio::test]
async fn model_declared_gated_call_stops_the_run() {
    let (merger, provider) = scripted(vec![ScriptedResponse::new(vec![declare(
        "g1",
        "delete_file",
        json!({"path": "X"}),
    )])]);

    let (messages, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(provider.requests().len(), 1);
    assert!(events.iter().any(|event| matches!(
        event,
        StreamEvent::ToolStatus {
            phase: ToolPhase::AwaitingConfirmation,
            ..
        }
    )));
    assert_eq!(done_count(&events), 1);
    assert!(messages.last().is_some_and(Message::has_tool_calls));
}

#[rstest]
#[tokio::test]
async fn provider_request_failure_ends_with_done() {
    let mut provider = MockGenerationProvider::new();
    provider
        .expect_generate()
        .times(1)
        .returning(|_| Err(GenerationError::Request("rate limited".to_owned())));
    let merger = StreamMerger::new(Arc::new(provider), registry(), FixedClock::default());

    let (messages, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(events, vec![StreamEvent::Done]);
    assert_eq!(messages, greeting());
}

#[rstest]
#[tokio::test]
async fn mid_stream_failure_keeps_streamed_text() {
    let (merger, _) = scripted(vec![
        ScriptedResponse::new(vec![delta("Partial ")]).then_fail("connection reset"),
    ]);

    let (messages, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::TokenDelta {
                text: "Partial ".to_owned()
            },
            StreamEvent::Done,
        ]
    );
    assert_eq!(
        messages.last().map(Message::parts),
        Some([Part::text("Partial ")].as_slice())
    );
}

#[rstest]
#[tokio::test]
async fn cancelled_run_skips_generation() {
    let merger = StreamMerger::new(silent_provider(), registry(), FixedClock::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (_, events) = run(&merger, &greeting(), &cancel).await;

    assert_eq!(events, vec![StreamEvent::Done]);
}

#[rstest]
#[tokio::test]
async fn step_budget_caps_generation_calls() {
    let looping = (0..5)
        .map(|step| {
            ScriptedResponse::new(vec![declare(
                &format!("g{step}"),
                "calculator",
                multiply(step, 2),
            )])
        })
        .collect();
    let (merger, provider) = scripted(looping);
    let merger = merger.with_max_steps(2);

    let (_, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(provider.requests().len(), 2);
    assert_eq!(done_count(&events), 1);
}

#[rstest]
#[tokio::test]
async fn prompt_failure_ends_with_done() {
    let merger = StreamMerger::new(silent_provider(), registry(), FixedClock::default())
        .with_prompt(SystemPrompt::new("{{ unclosed"));

    let (_, events) = run(&merger, &greeting(), &CancellationToken::new()).await;

    assert_eq!(events, vec![StreamEvent::Done]);
}

#[rstest]
#[tokio::test]
async fn incomplete_calls_never_reach_generation() {
    let (merger, provider) = scripted(vec![ScriptedResponse::text("ok")]);
    let history = vec![
        message("u1", Role::User, vec![Part::text("delete X")]),
        message(
            "a1",
            Role::Assistant,
            vec![
                Part::text("Sure"),
                call(
                    "c1",
                    "delete_file",
                    json!({"path": "X"}),
                    ToolCallState::InputStreaming,
                ),
            ],
        ),
        message("u2", Role::User, vec![approve("c1"), Part::text("go ahead")]),
    ];

    let (_, events) = run(&merger, &history, &CancellationToken::new()).await;

    let requests = provider.requests();
    let sent = &requests.first().expect("one request").messages;
    assert!(sent.iter().all(|message| !message.has_tool_calls()));
    assert!(
        sent.iter()
            .flat_map(Message::parts)
            .all(|part| part.as_tool_decision().is_none())
    );
    assert_eq!(done_count(&events), 1);
}

#[rstest]
#[tokio::test]
async fn decided_call_of_superseded_turn_never_reaches_generation() {
    let (merger, provider) = scripted(vec![ScriptedResponse::text("It is nine.")]);
    let history = vec![
        message("u1", Role::User, vec![Part::text("delete X")]),
        message(
            "a1",
            Role::Assistant,
            vec![pending_call("c1", "delete_file", json!({"path": "X"}))],
        ),
        message("u2", Role::User, vec![approve("c1")]),
        message("a2", Role::Assistant, vec![Part::text("Anything else?")]),
        message("u3", Role::User, vec![Part::text("what time is it?")]),
    ];

    let (messages, events) = run(&merger, &history, &CancellationToken::new()).await;

    let requests = provider.requests();
    let sent = &requests.first().expect("one request").messages;
    assert!(sent.iter().all(|message| !message.has_tool_calls()));
    assert!(
        messages
            .iter()
            .flat_map(Message::tool_calls)
            .all(|call| call.state != ToolCallState::InputAvailable)
    );
    assert!(events.iter().all(|event| event.tool_call_id().is_none()));
    assert_eq!(done_count(&events), 1);
}

#[rstest]
#[tokio::test]
async fn cancellation_mid_stream_keeps_partial_text() {
    let mut provider = MockGenerationProvider::new();
    provider.expect_generate().times(1).returning(|_| {
        Ok(stream::iter(vec![Ok(delta("par"))])
            .chain(stream::pending())
            .boxed())
    });
    let merger = StreamMerger::new(Arc::new(provider), registry(), FixedClock::default());
    let cancel = CancellationToken::new();
    let history = greeting();
    let (sink, mut events_out) = EventSink::channel();

    let reader = async {
        let first = events_out.next().await;
        cancel.cancel();
        let mut events: Vec<StreamEvent> = first.into_iter().collect();
        events.extend(events_out.collect::<Vec<_>>().await);
        events
    };
    let (messages, events) = futures::join!(merger.run(&history, sink, &cancel), reader);

    assert_eq!(
        events,
        vec![
            StreamEvent::TokenDelta {
                text: "par".to_owned()
            },
            StreamEvent::Done,
        ]
    );
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages.last().map(Message::parts),
        Some([Part::text("par")].as_slice())
    );
}
