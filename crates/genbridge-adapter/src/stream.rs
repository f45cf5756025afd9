// SPDX-License-Identifier: MIT OR Apache-2.0
//! Re-assembly of streamed chat-completion chunks into Gemini chunks.
//!
//! [`StreamTranslator`] is a synchronous state machine fed one backend chunk
//! at a time. Text is buffered until a flush fires (length threshold,
//! paragraph break, or finish signal). Tool-call fragments accumulate by
//! position index and are released together in one terminal chunk once the
//! finish signal arrives; nothing is emitted after that chunk.
//!
//! [`TranslatedStream`] drives a translator over an upstream chunk stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_core::Stream;
use genbridge_config::StreamConfig;
use genbridge_error::BridgeError;
use genbridge_gemini::{FinishReason, GenerateContentResponse, Part, UsageMetadata};
use genbridge_openai::{ChatCompletionChunk, ChunkToolCall, ToolCallAccumulator};
use pin_project_lite::pin_project;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::finish::map_finish_reason;
use crate::response::{parse_tool_arguments, usage_metadata};

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Per-stream translation state.
#[derive(Debug, Clone)]
pub struct StreamTranslator {
    config: StreamConfig,
    buffer: String,
    buffered_chars: usize,
    tool_calls: ToolCallAccumulator,
    last_finish_reason: Option<FinishReason>,
    terminated: bool,
}

impl Default for StreamTranslator {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl StreamTranslator {
    /// Create a translator with the given flush policy.
    #[must_use]
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            buffered_chars: 0,
            tool_calls: ToolCallAccumulator::new(),
            last_finish_reason: None,
            terminated: false,
        }
    }

    /// Whether the terminal tool-call chunk (or end of stream) has been produced.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Text buffered but not yet emitted.
    #[must_use]
    pub fn pending_text(&self) -> &str {
        &self.buffer
    }

    /// Consume one backend chunk and return the Gemini chunks it releases.
    ///
    /// Once terminated, further chunks are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`genbridge_error::ErrorCode::ToolArgumentsInvalid`] when the
    /// accumulated arguments of a tool call are not valid JSON. The
    /// translator is terminated in that case.
    pub fn push(
        &mut self,
        chunk: &ChatCompletionChunk,
    ) -> Result<Vec<GenerateContentResponse>, BridgeError> {
        if self.terminated {
            trace!(target: "genbridge.stream", "ignoring chunk after termination");
            return Ok(Vec::new());
        }

        let mut out = match chunk.choices.first() {
            Some(choice) => {
                let text = choice.delta.content.as_deref().unwrap_or_default();
                let fragments = choice.delta.tool_calls.as_deref().unwrap_or_default();
                self.step(text, fragments, choice.finish_reason.as_deref())?
            }
            None => Vec::new(),
        };

        if let Some(usage) = chunk.usage.as_ref().map(usage_metadata) {
            self.attach_usage(&mut out, usage);
        }
        Ok(out)
    }

    /// Signal the end of the upstream stream.
    ///
    /// Returns the remaining buffered text, if any, carrying the last observed
    /// finish reason (or `FINISH_REASON_UNSPECIFIED` when none was seen).
    pub fn finish(&mut self) -> Option<GenerateContentResponse> {
        if self.terminated {
            return None;
        }
        self.terminated = true;

        if !self.tool_calls.is_empty() {
            warn!(
                target: "genbridge.stream",
                slots = self.tool_calls.len(),
                "stream ended without a finish signal; dropping partial tool calls"
            );
        }
        if self.buffer.is_empty() {
            return None;
        }
        let text = self.take_buffer();
        debug!(target: "genbridge.stream", chars = text.chars().count(), "flushing tail at end of stream");
        Some(GenerateContentResponse::single(
            vec![Part::Text(text)],
            Some(self.last_finish_reason.unwrap_or(FinishReason::Unspecified)),
        ))
    }

    fn step(
        &mut self,
        text: &str,
        fragments: &[ChunkToolCall],
        finish_reason: Option<&str>,
    ) -> Result<Vec<GenerateContentResponse>, BridgeError> {
        let mut out = Vec::new();

        if !text.is_empty() {
            self.buffer.push_str(text);
            self.buffered_chars += text.chars().count();
        }
        if !fragments.is_empty() {
            self.tool_calls.feed(fragments);
        }
        let finished = finish_reason.is_some();
        if finished {
            self.last_finish_reason = Some(map_finish_reason(finish_reason));
        }

        let flush_reason = if self.buffered_chars >= self.config.flush_threshold_chars {
            Some("threshold")
        } else if self.buffer.is_empty() {
            None
        } else if self.config.flush_on_paragraph_break && text.contains("\n\n") {
            Some("paragraph")
        } else if finished {
            Some("finish")
        } else {
            None
        };

        let flushed = if let Some(reason) = flush_reason
            && !self.buffer.is_empty()
        {
            let text = self.take_buffer();
            trace!(target: "genbridge.stream", reason, chars = text.chars().count(), "flushing text");
            out.push(self.chunk(vec![Part::Text(text)]));
            true
        } else {
            false
        };

        if finished && self.tool_calls.has_pending() {
            out.push(self.terminal_chunk()?);
        } else if finished && !flushed && self.buffer.is_empty() {
            out.push(self.chunk(Vec::new()));
        }
        Ok(out)
    }

    fn terminal_chunk(&mut self) -> Result<GenerateContentResponse, BridgeError> {
        self.terminated = true;

        let mut parts = Vec::new();
        if !self.buffer.is_empty() {
            parts.push(Part::Text(self.take_buffer()));
        }
        for slot in self.tool_calls.drain() {
            // A call that never received an argument fragment takes no arguments.
            let args = if slot.arguments.is_empty() {
                Value::Object(serde_json::Map::new())
            } else {
                parse_tool_arguments(&slot.name, &slot.arguments)?
            };
            parts.push(Part::function_call(slot.name, args));
        }
        debug!(target: "genbridge.stream", parts = parts.len(), "emitting terminal tool-call chunk");
        Ok(self.chunk(parts))
    }

    fn attach_usage(&self, out: &mut Vec<GenerateContentResponse>, usage: UsageMetadata) {
        if out.is_empty() {
            out.push(self.chunk(Vec::new()));
        }
        for chunk in out.iter_mut() {
            chunk.usage_metadata = Some(usage);
        }
    }

    fn take_buffer(&mut self) -> String {
        self.buffered_chars = 0;
        std::mem::take(&mut self.buffer)
    }

    fn chunk(&self, parts: Vec<Part>) -> GenerateContentResponse {
        GenerateContentResponse::single(parts, self.last_finish_reason)
    }
}

// ---------------------------------------------------------------------------
// Stream adapter
// ---------------------------------------------------------------------------

pin_project! {
    /// Lazily translates an upstream chunk stream.
    ///
    /// Upstream errors are yielded once and end the stream. Dropping this
    /// stream drops the upstream.
    pub struct TranslatedStream<S> {
        #[pin]
        upstream: S,
        translator: StreamTranslator,
        ready: VecDeque<GenerateContentResponse>,
        done: bool,
    }
}

impl<S> TranslatedStream<S> {
    /// Wrap `upstream` with a fresh translator using `config`.
    pub fn new(upstream: S, config: StreamConfig) -> Self {
        Self {
            upstream,
            translator: StreamTranslator::new(config),
            ready: VecDeque::new(),
            done: false,
        }
    }
}

impl<S> Stream for TranslatedStream<S>
where
    S: Stream<Item = Result<ChatCompletionChunk, BridgeError>>,
{
    type Item = Result<GenerateContentResponse, BridgeError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(chunk) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if *this.done || this.translator.is_terminated() {
                *this.done = true;
                return Poll::Ready(None);
            }

            match ready!(this.upstream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => match this.translator.push(&chunk) {
                    Ok(out) => this.ready.extend(out),
                    Err(err) => {
                        *this.done = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                },
                Some(Err(err)) => {
                    warn!(target: "genbridge.stream", error = %err, "upstream stream failed");
                    *this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(this.translator.finish().map(Ok));
                }
            }
        }
    }
}
