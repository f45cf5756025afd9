// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz lenient request parsing and message conversion.
//!
//! Feeds arbitrary bytes through `GenerateContentRequest` deserialization,
//! verifying:
//! 1. Parsing never panics; malformed history elements are dropped.
//! 2. Every surviving content converts to chat messages without panicking.
//! 3. Tool messages only reference ids carried by some assistant tool call.
#![no_main]
use std::collections::HashSet;

use genbridge_adapter::{AdapterOptions, to_chat_request};
use genbridge_gemini::GenerateContentRequest;
use genbridge_openai::OpenAIMessage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<GenerateContentRequest>(data) else {
        return;
    };

    let chat = to_chat_request(&request, &AdapterOptions::default());

    let call_ids: HashSet<&str> = chat
        .messages
        .iter()
        .flat_map(OpenAIMessage::tool_calls)
        .map(|call| call.id.as_str())
        .collect();
    for message in &chat.messages {
        if let OpenAIMessage::Tool { tool_call_id, .. } = message {
            assert!(call_ids.contains(tool_call_id.as_str()), "orphan tool message {tool_call_id}");
        }
    }

    let _ = serde_json::to_string(&chat);
});
