// SPDX-License-Identifier: MIT OR Apache-2.0
//! OpenAI Chat Completions dialect: request, message, tool and response types.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tool-format translation
// ---------------------------------------------------------------------------

/// OpenAI-style function tool definition (Chat Completions `tools` array element).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIToolDef {
    /// Tool type (always `"function"`).
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function definition payload.
    pub function: OpenAIFunctionDef,
}

impl OpenAIToolDef {
    /// Build a `"function"` tool definition.
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".into(),
            function: OpenAIFunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// The function payload inside an [`OpenAIToolDef`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIFunctionDef {
    /// Function name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the function parameters.
    pub parameters: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single message in the Chat Completions format, tagged by `role`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum OpenAIMessage {
    /// Instructions for the model.
    System {
        /// Message text.
        content: String,
    },
    /// End-user input.
    User {
        /// Message text.
        content: String,
    },
    /// Model output, optionally requesting tool invocations.
    Assistant {
        /// Message text; serialised as `null` when absent.
        content: Option<String>,
        /// Tool calls requested by the assistant.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<OpenAIToolCall>>,
    },
    /// Result of one tool invocation.
    Tool {
        /// ID of the tool call this message is responding to.
        tool_call_id: String,
        /// Serialised tool result.
        content: String,
    },
}

impl OpenAIMessage {
    /// A system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// A plain assistant text message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// A tool-result message.
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Wire name of the message role.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Text content of the message, if it carries any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                Some(content)
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Tool calls carried by an assistant message.
    #[must_use]
    pub fn tool_calls(&self) -> &[OpenAIToolCall] {
        match self {
            Self::Assistant {
                tool_calls: Some(calls),
                ..
            } => calls,
            _ => &[],
        }
    }
}

/// A tool call emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIToolCall {
    /// Unique identifier for this tool call.
    pub id: String,
    /// Call type (always `"function"`).
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// The function invocation details.
    pub function: OpenAIFunctionCall,
}

impl OpenAIToolCall {
    /// Build a `"function"` tool call.
    #[must_use]
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: OpenAIFunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

fn function_type() -> String {
    "function".into()
}

/// The function invocation inside an [`OpenAIToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIFunctionCall {
    /// Name of the function to invoke.
    pub name: String,
    /// JSON-encoded arguments for the function.
    #[serde(default)]
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A Chat Completions API request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenAIRequest {
    /// Model identifier (e.g. `gpt-4o`).
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAIMessage>,
    /// Tool definitions available to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAIToolDef>>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Whether the backend should stream chunks.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    /// Streaming options (only meaningful with `stream = true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

/// Options for streamed completions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamOptions {
    /// Append a final chunk carrying token usage.
    pub include_usage: bool,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A Chat Completions API response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenAIResponse {
    /// Unique response identifier.
    #[serde(default)]
    pub id: String,
    /// Object type (e.g. `chat.completion`).
    #[serde(default)]
    pub object: String,
    /// Model used for the completion.
    #[serde(default)]
    pub model: String,
    /// Completion choices.
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    /// Token usage statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<OpenAIUsage>,
}

/// A single choice in the Chat Completions response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIChoice {
    /// Zero-based index of this choice.
    #[serde(default)]
    pub index: u32,
    /// The assistant's response message.
    pub message: OpenAIResponseMessage,
    /// Reason the model stopped generating (e.g. `stop`, `tool_calls`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The assistant message inside a response choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OpenAIResponseMessage {
    /// Message role (normally `assistant`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text content of the message.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

/// Token usage reported by the backend. Any field may be missing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenAIUsage {
    /// Tokens consumed by the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    /// Tokens generated in the completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    /// Total tokens (prompt + completion).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl OpenAIUsage {
    /// Usage with every count present.
    #[must_use]
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(total_tokens),
        }
    }
}
