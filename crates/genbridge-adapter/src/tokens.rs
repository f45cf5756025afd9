// SPDX-License-Identifier: MIT OR Apache-2.0
//! Character-length token estimate.

use genbridge_gemini::{CountTokensRequest, CountTokensResponse};
use genbridge_openai::OpenAIMessage;

use crate::request::to_chat_messages;

/// Estimate tokens for already-converted messages.
///
/// Message texts are joined with single spaces and the character count is
/// divided by `chars_per_token`, rounding up. A zero divisor counts as one.
#[must_use]
pub fn estimate_tokens(messages: &[OpenAIMessage], chars_per_token: u32) -> u64 {
    let texts: Vec<&str> = messages.iter().filter_map(OpenAIMessage::text).collect();
    let chars = texts.join(" ").chars().count() as u64;
    chars.div_ceil(u64::from(chars_per_token.max(1)))
}

/// Estimate tokens for a count-tokens request without contacting a backend.
#[must_use]
pub fn count_tokens(request: &CountTokensRequest, chars_per_token: u32) -> CountTokensResponse {
    let messages = to_chat_messages(&request.contents, request.system_instruction.as_ref());
    CountTokensResponse {
        total_tokens: estimate_tokens(&messages, chars_per_token),
    }
}
