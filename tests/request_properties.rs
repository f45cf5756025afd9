// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for Gemini history → chat message conversion.

use proptest::prelude::*;

use genbridge_adapter::to_chat_messages;
use genbridge_gemini::{Content, Part, Role};
use genbridge_openai::OpenAIMessage;
use serde_json::json;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{1,40}"
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Model), Just(Role::System)]
}

/// Text-only content with at least one non-empty part.
fn text_content() -> impl Strategy<Value = Content> {
    (role(), prop::collection::vec(text(), 1..4))
        .prop_map(|(role, texts)| Content::new(role, texts.into_iter().map(Part::Text).collect()))
}

fn function_name() -> impl Strategy<Value = String> {
    "[a-z_]{1,12}"
}

fn expected_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
        Role::System => "system",
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Text-only histories map one-to-one, in order, with concatenated text.
    #[test]
    fn text_histories_preserve_order_and_text(
        contents in prop::collection::vec(text_content(), 0..8)
    ) {
        let messages = to_chat_messages(&contents, None);
        prop_assert_eq!(messages.len(), contents.len());
        for (content, message) in contents.iter().zip(&messages) {
            let joined: String = content.parts.iter().filter_map(Part::as_text).collect();
            prop_assert_eq!(message.text(), Some(joined.as_str()));
            prop_assert_eq!(message.role(), expected_role(content.role));
        }
    }

    /// A call whose name never receives a response is always folded to text.
    #[test]
    fn unanswered_calls_never_become_tool_calls(
        history in prop::collection::vec(text_content(), 0..4),
        name in function_name(),
        n in 0i64..1000,
    ) {
        let mut contents = history;
        contents.push(Content::model(vec![Part::function_call(&name, json!({"n": n}))]));

        let messages = to_chat_messages(&contents, None);
        prop_assert!(messages.iter().all(|m| m.tool_calls().is_empty()));
        let needle = format!("[Function call: {name}({{\"n\":{n}}})]");
        prop_assert!(messages.iter().any(|m| m.text() == Some(needle.as_str())));
    }

    /// Each answered call pairs with a tool message carrying the same id.
    #[test]
    fn answered_pairs_share_ids(
        names in prop::collection::btree_set(function_name(), 1..5),
    ) {
        let names: Vec<_> = names.into_iter().collect();
        let calls = names
            .iter()
            .map(|n| Part::function_call(n, json!({"for": n})))
            .collect();
        let responses = names
            .iter()
            .map(|n| Part::function_response(n, json!({"ok": n})))
            .collect();
        let contents = vec![Content::model(calls), Content::user(responses)];

        let messages = to_chat_messages(&contents, None);
        let tool_calls = messages[0].tool_calls();
        prop_assert_eq!(tool_calls.len(), names.len());

        for (call, message) in tool_calls.iter().zip(&messages[1..]) {
            match message {
                OpenAIMessage::Tool { tool_call_id, .. } => prop_assert_eq!(tool_call_id, &call.id),
                other => prop_assert!(false, "expected tool message, got {:?}", other),
            }
        }
    }
}
