// SPDX-License-Identifier: MIT OR Apache-2.0
//! Finish-reason mapping from chat-completions strings to [`FinishReason`].

use genbridge_gemini::FinishReason;
use tracing::warn;

/// Map a backend finish reason onto the Gemini vocabulary.
///
/// | backend                        | result                      |
/// |--------------------------------|-----------------------------|
/// | `stop`                         | `STOP`                      |
/// | `length`, `max_tokens`         | `MAX_TOKENS`                |
/// | `content_filter`               | `SAFETY`                    |
/// | `tool_calls`, `function_call`  | `STOP`                      |
/// | absent                         | `FINISH_REASON_UNSPECIFIED` |
/// | anything else                  | `STOP`, logged at warn      |
#[must_use]
pub fn map_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        None => FinishReason::Unspecified,
        Some("stop" | "tool_calls" | "function_call") => FinishReason::Stop,
        Some("length" | "max_tokens") => FinishReason::MaxTokens,
        Some("content_filter") => FinishReason::Safety,
        Some(other) => {
            warn!(target: "genbridge.finish", reason = other, "unknown finish reason, mapping to STOP");
            FinishReason::Stop
        }
    }
}
