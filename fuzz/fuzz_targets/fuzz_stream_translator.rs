// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the streaming translator with structured chunk sequences.
//!
//! Verifies:
//! 1. `push` and `finish` never panic on any delta sequence.
//! 2. Every emitted chunk has exactly one candidate at index 0.
//! 3. Without tool calls, emitted text equals the concatenated deltas.
//! 4. Nothing is emitted after termination.
#![no_main]
use arbitrary::Arbitrary;
use genbridge_adapter::StreamTranslator;
use genbridge_config::StreamConfig;
use genbridge_gemini::Part;
use genbridge_openai::{ChatCompletionChunk, ChunkToolCall};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Delta {
    Text(String),
    Tool {
        index: u8,
        id: Option<String>,
        name: Option<String>,
        arguments: Option<String>,
    },
    Finish(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    threshold: u8,
    paragraph: bool,
    deltas: Vec<Delta>,
}

const REASONS: &[&str] = &["stop", "length", "tool_calls", "content_filter", "other"];

fuzz_target!(|input: Input| {
    let config = StreamConfig {
        flush_threshold_chars: usize::from(input.threshold.max(1)),
        flush_on_paragraph_break: input.paragraph,
        include_usage: false,
    };
    let mut translator = StreamTranslator::new(config);
    let has_tools = input.deltas.iter().any(|d| matches!(d, Delta::Tool { .. }));

    let mut sent = String::new();
    let mut emitted = Vec::new();
    for delta in &input.deltas {
        let chunk = match delta {
            Delta::Text(t) => {
                sent.push_str(t);
                ChatCompletionChunk::text(t.as_str())
            }
            Delta::Tool { index, id, name, arguments } => {
                ChatCompletionChunk::tool_calls(vec![ChunkToolCall::fragment(
                    u32::from(*index),
                    id.as_deref(),
                    name.as_deref(),
                    arguments.as_deref(),
                )])
            }
            Delta::Finish(r) => ChatCompletionChunk::finish(REASONS[usize::from(*r) % REASONS.len()]),
        };
        let was_terminated = translator.is_terminated();
        match translator.push(&chunk) {
            Ok(out) => {
                assert!(!was_terminated || out.is_empty());
                emitted.extend(out);
            }
            Err(_) => {
                assert!(translator.is_terminated());
                return;
            }
        }
    }
    emitted.extend(translator.finish());

    for chunk in &emitted {
        assert_eq!(chunk.candidates.len(), 1);
        assert_eq!(chunk.candidates[0].index, 0);
    }
    if !has_tools {
        let text: String = emitted
            .iter()
            .flat_map(|c| &c.candidates[0].content.parts)
            .filter_map(Part::as_text)
            .collect();
        assert_eq!(text, sent);
    }
});
