//! Tool agent: `llm_call` <-> `action` until the model stops requesting tools.

mod common;

use std::sync::Arc;

use labelgraph::agent::{NODE_ACTION, NODE_LLM_CALL};
use labelgraph::{
    build_tool_agent, AgentError, LlmResponse, Message, MockLlm, RunConfig, ToolCallRequest,
    ToolRegistry,
};
use serde_json::json;

use common::EchoTool;

fn call(id: &str, name: &str, text: &str) -> ToolCallRequest {
    ToolCallRequest::new(id, name, json!({ "text": text }))
}

/// **Scenario**: one tool call, then a final answer. The transcript is
/// user, assistant(tool call), tool result, assistant(answer).
#[tokio::test]
async fn act_then_stop() {
    let echo = EchoTool::new("search");
    let llm = Arc::new(MockLlm::first_tools_then_end(
        vec![call("c1", "search", "labelers")],
        "Labelers attach labels.",
    ));
    let graph = build_tool_agent(
        llm.clone(),
        Some("You are helpful."),
        ToolRegistry::new().with(echo.clone()),
    )
    .compile()
    .unwrap();

    let transcript = graph
        .run(vec![Message::user("what is a labeler?")], &RunConfig::default())
        .await
        .unwrap();

    assert_eq!(
        transcript.messages(),
        &[
            Message::user("what is a labeler?"),
            Message::assistant_with_tools("", vec![call("c1", "search", "labelers")]),
            Message::tool("c1", "search", "search: labelers"),
            Message::assistant("Labelers attach labels."),
        ]
    );
    assert_eq!(echo.call_count(), 1);

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].tools, vec!["search"]);
    assert_eq!(calls[0].messages[0], Message::system("You are helpful."));
    // the second call sees the tool result
    assert_eq!(calls[1].messages.last(), Some(&Message::tool("c1", "search", "search: labelers")));
}

/// **Scenario**: N calls in one assistant message yield N results in request order,
/// each carrying the matching id.
#[tokio::test]
async fn n_calls_n_results_in_order() {
    let a = EchoTool::new("alpha");
    let b = EchoTool::new("beta");
    let requests = vec![
        call("id-3", "beta", "one"),
        call("id-1", "alpha", "two"),
        call("id-2", "beta", "three"),
    ];
    let llm = Arc::new(MockLlm::first_tools_then_end(requests, "done"));
    let graph = build_tool_agent(llm, None, ToolRegistry::new().with(a.clone()).with(b.clone()))
        .compile()
        .unwrap();

    let transcript = graph
        .run(vec![Message::user("go")], &RunConfig::default())
        .await
        .unwrap();

    let results: Vec<_> = transcript
        .messages()
        .iter()
        .filter_map(|m| match m {
            Message::Tool { tool_call_id, content, .. } => Some((tool_call_id.as_str(), content.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        results,
        vec![("id-3", "beta: one"), ("id-1", "alpha: two"), ("id-2", "beta: three")]
    );
    assert_eq!(a.call_count(), 1);
    assert_eq!(b.call_count(), 2);
}

/// **Scenario**: an unknown tool name never fails the run; the model gets
/// "bad tool name, retry" and may try again.
#[tokio::test]
async fn unknown_tool_is_recoverable() {
    let echo = EchoTool::new("search");
    let llm = Arc::new(
        MockLlm::scripted([
            LlmResponse::with_tool_calls(vec![call("c1", "serach", "typo")]),
            LlmResponse::with_tool_calls(vec![call("c2", "search", "fixed")]),
        ])
        .with_fallback(LlmResponse::text("ok")),
    );
    let graph = build_tool_agent(llm, None, ToolRegistry::new().with(echo.clone()))
        .compile()
        .unwrap();

    let transcript = graph
        .run(vec![Message::user("go")], &RunConfig::default())
        .await
        .unwrap();

    assert_eq!(transcript.messages()[2], Message::tool("c1", "serach", "bad tool name, retry"));
    assert_eq!(transcript.messages()[4], Message::tool("c2", "search", "search: fixed"));
    assert_eq!(transcript.last(), Some(&Message::assistant("ok")));
    assert_eq!(echo.call_count(), 1);
}

/// **Scenario**: invalid tool arguments come back as an in-band error message.
#[tokio::test]
async fn tool_error_is_in_band() {
    let llm = Arc::new(MockLlm::first_tools_then_end(
        vec![ToolCallRequest::new("c1", "search", json!({}))],
        "sorry",
    ));
    let graph = build_tool_agent(llm, None, ToolRegistry::new().with(EchoTool::new("search")))
        .compile()
        .unwrap();
    let transcript = graph
        .run(vec![Message::user("go")], &RunConfig::default())
        .await
        .unwrap();
    assert_eq!(
        transcript.messages()[2].content(),
        "Error: invalid arguments: text is required\n Please fix your mistakes."
    );
}

/// **Scenario**: same input and deterministic collaborators give the same transcript.
#[tokio::test]
async fn replay_is_deterministic() {
    async fn once() -> Vec<Message> {
        let llm = Arc::new(MockLlm::first_tools_then_end(
            vec![call("c1", "search", "a"), call("c2", "search", "b")],
            "final",
        ));
        let graph = build_tool_agent(llm, Some("sys"), ToolRegistry::new().with(EchoTool::new("search")))
            .compile()
            .unwrap();
        graph
            .run(vec![Message::user("q")], &RunConfig::default())
            .await
            .unwrap()
            .into_messages()
    }
    assert_eq!(once().await, once().await);
}

/// **Scenario**: messages present before a run are unchanged after it (append-only).
#[tokio::test]
async fn earlier_messages_are_never_mutated() {
    let history = vec![
        Message::user("first question"),
        Message::assistant("first answer"),
        Message::user("second question"),
    ];
    let llm = Arc::new(MockLlm::first_tools_then_end(vec![call("c1", "search", "x")], "second answer"));
    let graph = build_tool_agent(llm, None, ToolRegistry::new().with(EchoTool::new("search")))
        .compile()
        .unwrap();

    let transcript = graph.run(history.clone(), &RunConfig::default()).await.unwrap();
    assert_eq!(&transcript.messages()[..history.len()], history.as_slice());
    assert!(transcript.len() > history.len());
}

/// **Scenario**: a model that always requests tools is stopped by the step budget.
#[tokio::test]
async fn endless_tool_loop_hits_budget() {
    let llm = Arc::new(MockLlm::new().with_fallback(LlmResponse::with_tool_calls(vec![call(
        "c", "search", "again",
    )])));
    let graph = build_tool_agent(llm, None, ToolRegistry::new().with(EchoTool::new("search")))
        .compile()
        .unwrap();
    let err = graph
        .run(vec![Message::user("loop")], &RunConfig::default().with_step_budget(3))
        .await
        .unwrap_err();
    match err {
        AgentError::StepBudgetExceeded { node, budget, .. } => {
            assert_eq!(node, NODE_LLM_CALL);
            assert_eq!(budget, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn node_ids_are_llm_call_and_action() {
    let graph = build_tool_agent(Arc::new(MockLlm::new()), None, ToolRegistry::new())
        .compile()
        .unwrap();
    assert_eq!(graph.entry(), NODE_LLM_CALL);
    assert_eq!(graph.node_ids(), vec![NODE_ACTION, NODE_LLM_CALL]);
}
