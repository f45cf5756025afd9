// SPDX-License-Identifier: MIT OR Apache-2.0
//! Chat-completions response → Gemini response.

use genbridge_error::{BridgeError, ErrorCode};
use genbridge_gemini::{
    Candidate, Content, FinishReason, GenerateContentResponse, Part, UsageMetadata,
};
use genbridge_openai::{OpenAIResponse, OpenAIUsage};
use serde_json::Value;

use crate::finish::map_finish_reason;

/// Convert a complete chat-completions response.
///
/// Only the first choice is used. The candidate holds a text part when the
/// message has content, followed by one function-call part per tool call.
///
/// # Errors
///
/// Returns [`ErrorCode::ToolArgumentsInvalid`] when a tool call's arguments
/// are not valid JSON.
pub fn from_chat_response(
    response: &OpenAIResponse,
) -> Result<GenerateContentResponse, BridgeError> {
    let usage_metadata = response.usage.as_ref().map(usage_metadata);

    let Some(choice) = response.choices.first() else {
        return Ok(GenerateContentResponse {
            usage_metadata,
            ..GenerateContentResponse::single(Vec::new(), Some(FinishReason::Unspecified))
        });
    };

    let mut parts = Vec::new();
    if let Some(text) = choice.message.content.as_deref()
        && !text.is_empty()
    {
        parts.push(Part::text(text));
    }
    for call in choice.message.tool_calls.iter().flatten() {
        let args = parse_tool_arguments(&call.function.name, &call.function.arguments)?;
        parts.push(Part::function_call(&call.function.name, args));
    }

    Ok(GenerateContentResponse {
        candidates: vec![Candidate {
            content: Content::model(parts),
            finish_reason: Some(map_finish_reason(choice.finish_reason.as_deref())),
            index: 0,
        }],
        usage_metadata,
    })
}

/// Copy usage field for field, treating missing counts as zero.
#[must_use]
pub fn usage_metadata(usage: &OpenAIUsage) -> UsageMetadata {
    UsageMetadata {
        prompt_token_count: usage.prompt_tokens.unwrap_or(0),
        candidates_token_count: usage.completion_tokens.unwrap_or(0),
        total_token_count: usage.total_tokens.unwrap_or(0),
    }
}

/// Parse a tool call's JSON argument string. No fallback: an empty string is
/// invalid JSON like any other.
pub(crate) fn parse_tool_arguments(name: &str, arguments: &str) -> Result<Value, BridgeError> {
    serde_json::from_str(arguments).map_err(|e| {
        BridgeError::new(
            ErrorCode::ToolArgumentsInvalid,
            format!("arguments for tool call `{name}` are not valid JSON"),
        )
        .with_context("tool", name)
        .with_context("arguments", arguments)
        .with_source(e)
    })
}
