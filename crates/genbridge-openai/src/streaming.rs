// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streaming types for the OpenAI Chat Completions API.
//!
//! These model the `chat.completion.chunk` objects emitted during streaming,
//! plus [`ToolCallAccumulator`], which reassembles tool calls that arrive in
//! fragments spread over several chunks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dialect::OpenAIUsage;

// ---------------------------------------------------------------------------
// Streaming chunk types
// ---------------------------------------------------------------------------

/// A single streaming chunk from the Chat Completions API.
///
/// Every field defaults, so backends that omit bookkeeping fields still parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Unique chunk identifier (e.g. `chatcmpl-...`).
    #[serde(default)]
    pub id: String,
    /// Object type, normally `"chat.completion.chunk"`.
    #[serde(default)]
    pub object: String,
    /// Unix timestamp when the chunk was created.
    #[serde(default)]
    pub created: u64,
    /// Model that generated the chunk.
    #[serde(default)]
    pub model: String,
    /// Streaming choices (typically one element).
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Token usage (only on the final chunk, when requested).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAIUsage>,
}

impl ChatCompletionChunk {
    /// Chunk carrying a single text delta.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_delta(ChunkDelta {
            content: Some(content.into()),
            ..ChunkDelta::default()
        })
    }

    /// Chunk carrying tool-call fragments.
    #[must_use]
    pub fn tool_calls(fragments: Vec<ChunkToolCall>) -> Self {
        Self::with_delta(ChunkDelta {
            tool_calls: Some(fragments),
            ..ChunkDelta::default()
        })
    }

    /// Chunk with an empty delta and the given finish reason.
    #[must_use]
    pub fn finish(reason: impl Into<String>) -> Self {
        Self::with_delta(ChunkDelta::default()).with_finish_reason(reason)
    }

    /// Chunk with no choices carrying only usage.
    #[must_use]
    pub fn usage_only(usage: OpenAIUsage) -> Self {
        Self {
            usage: Some(usage),
            ..Self::default()
        }
    }

    /// Set the finish reason on the first choice.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        if let Some(choice) = self.choices.first_mut() {
            choice.finish_reason = Some(reason.into());
        }
        self
    }

    fn with_delta(delta: ChunkDelta) -> Self {
        Self {
            object: "chat.completion.chunk".into(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason: None,
            }],
            ..Self::default()
        }
    }
}

/// A single choice inside a streaming chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Zero-based index of this choice.
    #[serde(default)]
    pub index: u32,
    /// The incremental delta for this choice.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Finish reason (`null` while streaming, then `"stop"`, `"tool_calls"`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The delta payload inside a streaming choice.
///
/// Only the fields that changed are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChunkDelta {
    /// Role of the message (only in the first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Incremental text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Incremental tool call fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
}

/// A tool call fragment inside a streaming delta.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkToolCall {
    /// Index of the tool call in the overall tool_calls array.
    #[serde(default)]
    pub index: u32,
    /// Tool call ID (normally only in the first fragment for this index).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call type (normally only in the first fragment).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    /// Incremental function call data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<ChunkFunctionCall>,
}

impl ChunkToolCall {
    /// Fragment for `index` with optional id, name and argument pieces.
    #[must_use]
    pub fn fragment(
        index: u32,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) -> Self {
        Self {
            index,
            id: id.map(str::to_string),
            call_type: id.map(|_| "function".to_string()),
            function: Some(ChunkFunctionCall {
                name: name.map(str::to_string),
                arguments: arguments.map(str::to_string),
            }),
        }
    }
}

/// Incremental function call data inside a streaming tool call fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkFunctionCall {
    /// Function name fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Incremental arguments string fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

// ---------------------------------------------------------------------------
// Tool-call accumulator for streaming
// ---------------------------------------------------------------------------

/// One tool call being reassembled from streamed fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallSlot {
    /// Backend position index.
    pub index: u32,
    /// First non-empty id seen for this index.
    pub id: String,
    /// Concatenated name fragments.
    pub name: String,
    /// Concatenated argument fragments.
    pub arguments: String,
}

impl ToolCallSlot {
    /// A slot is complete enough to emit once it has a name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Accumulates streamed tool call fragments keyed by their position index.
///
/// The first fragment for an index usually carries `id`, `type` and the
/// function `name`; later fragments append to `arguments`. Fragments for
/// different indices may interleave.
#[derive(Debug, Default, Clone)]
pub struct ToolCallAccumulator {
    slots: BTreeMap<u32, ToolCallSlot>,
}

impl ToolCallAccumulator {
    /// Create a new empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a slice of [`ChunkToolCall`] fragments into the accumulator.
    pub fn feed(&mut self, fragments: &[ChunkToolCall]) {
        for frag in fragments {
            let slot = self.slots.entry(frag.index).or_insert_with(|| ToolCallSlot {
                index: frag.index,
                ..ToolCallSlot::default()
            });

            if let Some(id) = &frag.id
                && slot.id.is_empty()
            {
                slot.id.clone_from(id);
            }
            if let Some(func) = &frag.function {
                if let Some(name) = &func.name {
                    slot.name.push_str(name);
                }
                if let Some(args) = &func.arguments {
                    slot.arguments.push_str(args);
                }
            }
        }
    }

    /// Whether any slot has collected enough to be emitted.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.slots.values().any(|s| !s.is_empty())
    }

    /// Number of slots opened so far, including nameless ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no fragment has been fed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Take every named slot in index order, leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<ToolCallSlot> {
        std::mem::take(&mut self.slots)
            .into_values()
            .filter(|s| !s.is_empty())
            .collect()
    }
}
