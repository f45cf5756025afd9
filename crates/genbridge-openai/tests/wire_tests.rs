// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire-shape tests for chat-completions requests and streamed chunks.

use genbridge_openai::{
    ChatCompletionChunk, OpenAIMessage, OpenAIRequest, OpenAIToolCall, OpenAIToolDef,
    ToolCallAccumulator,
};
use serde_json::json;

#[test]
fn tool_round_request_snapshot() {
    let req = OpenAIRequest {
        model: "gpt-4o".into(),
        messages: vec![
            OpenAIMessage::user("What time is it?"),
            OpenAIMessage::Assistant {
                content: None,
                tool_calls: Some(vec![OpenAIToolCall::function("call_1", "now", "{}")]),
            },
            OpenAIMessage::tool("call_1", "\"12:00\""),
        ],
        tools: Some(vec![OpenAIToolDef::function(
            "now",
            "",
            json!({"type": "object", "properties": {}}),
        )]),
        ..Default::default()
    };
    insta::assert_json_snapshot!(req, @r#"
    {
      "model": "gpt-4o",
      "messages": [
        {
          "role": "user",
          "content": "What time is it?"
        },
        {
          "role": "assistant",
          "content": null,
          "tool_calls": [
            {
              "id": "call_1",
              "type": "function",
              "function": {
                "name": "now",
                "arguments": "{}"
              }
            }
          ]
        },
        {
          "role": "tool",
          "tool_call_id": "call_1",
          "content": "\"12:00\""
        }
      ],
      "tools": [
        {
          "type": "function",
          "function": {
            "name": "now",
            "description": "",
            "parameters": {
              "properties": {},
              "type": "object"
            }
          }
        }
      ]
    }
    "#);
}

#[test]
fn realistic_tool_call_stream_reassembles() {
    let payloads = [
        r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":null,"tool_calls":[{"index":0,"id":"call_abc","type":"function","function":{"name":"get_weather","arguments":""}}]},"finish_reason":null}]}"#,
        r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"loc"}}]},"finish_reason":null}]}"#,
        r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"ation\":\"Oslo\"}"}}]},"finish_reason":null}]}"#,
        r#"{"id":"chatcmpl-1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
    ];

    let mut acc = ToolCallAccumulator::new();
    let mut finish = None;
    for payload in payloads {
        let chunk: ChatCompletionChunk = serde_json::from_str(payload).unwrap();
        let choice = &chunk.choices[0];
        if let Some(fragments) = &choice.delta.tool_calls {
            acc.feed(fragments);
        }
        finish = finish.or(choice.finish_reason.clone());
    }

    assert_eq!(finish.as_deref(), Some("tool_calls"));
    let calls = acc.drain();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, "call_abc");
    assert_eq!(calls[0].name, "get_weather");
    let args: serde_json::Value = serde_json::from_str(&calls[0].arguments).unwrap();
    assert_eq!(args, json!({"location": "Oslo"}));
}

#[test]
fn usage_chunk_without_choices_parses() {
    let chunk: ChatCompletionChunk = serde_json::from_str(
        r#"{"id":"x","object":"chat.completion.chunk","created":2,"model":"gpt-4o","choices":[],"usage":{"prompt_tokens":9,"completion_tokens":3,"total_tokens":12}}"#,
    )
    .unwrap();
    assert!(chunk.choices.is_empty());
    assert_eq!(chunk.usage.and_then(|u| u.total_tokens), Some(12));
}
