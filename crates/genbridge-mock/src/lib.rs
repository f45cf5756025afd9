// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use genbridge_error::{BridgeError, ErrorCode};
use genbridge_openai::{
    ChatCompletionChunk, ChatCompletionsClient, ChunkStream, OpenAIChoice, OpenAIRequest,
    OpenAIResponse, OpenAIResponseMessage,
};
use tracing::debug;

/// One queued reply.
#[derive(Debug)]
pub enum Scripted {
    /// Reply to a non-streaming call.
    Response(OpenAIResponse),
    /// Reply to a streaming call with these items, in order.
    Chunks(Vec<Result<ChatCompletionChunk, BridgeError>>),
    /// Fail the call.
    Error(BridgeError),
}

/// A client for local development and unit tests.
///
/// Replies are consumed in FIFO order, one per call, whatever kind of call
/// it is. A call with the queue empty fails with `BACKEND_UNAVAILABLE`.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<OpenAIRequest>>,
}

impl ScriptedClient {
    /// Client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a non-streaming response.
    #[must_use]
    pub fn with_response(self, response: OpenAIResponse) -> Self {
        self.push(Scripted::Response(response));
        self
    }

    /// Queue a stream that yields `chunks` and then ends.
    #[must_use]
    pub fn with_chunks(self, chunks: Vec<ChatCompletionChunk>) -> Self {
        self.push(Scripted::Chunks(chunks.into_iter().map(Ok).collect()));
        self
    }

    /// Queue a stream whose items may include failures.
    #[must_use]
    pub fn with_chunk_results(self, items: Vec<Result<ChatCompletionChunk, BridgeError>>) -> Self {
        self.push(Scripted::Chunks(items));
        self
    }

    /// Queue a failing call.
    #[must_use]
    pub fn with_error(self, error: BridgeError) -> Self {
        self.push(Scripted::Error(error));
        self
    }

    /// Append a reply to the script.
    pub fn push(&self, reply: Scripted) {
        lock(&self.script).push_back(reply);
    }

    /// Replies not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<OpenAIRequest> {
        lock(&self.requests).clone()
    }

    fn next(&self, request: OpenAIRequest) -> Result<Scripted, BridgeError> {
        debug!(
            target: "genbridge.mock",
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "scripted request"
        );
        lock(&self.requests).push(request);
        lock(&self.script).pop_front().ok_or_else(|| {
            BridgeError::new(ErrorCode::BackendUnavailable, "scripted client has no replies left")
        })
    }
}

#[async_trait]
impl ChatCompletionsClient for ScriptedClient {
    async fn create(&self, request: OpenAIRequest) -> Result<OpenAIResponse, BridgeError> {
        match self.next(request)? {
            Scripted::Response(response) => Ok(response),
            Scripted::Error(error) => Err(error),
            Scripted::Chunks(_) => Err(BridgeError::new(
                ErrorCode::Internal,
                "scripted stream consumed by a non-streaming call",
            )),
        }
    }

    async fn create_stream(&self, request: OpenAIRequest) -> Result<ChunkStream, BridgeError> {
        match self.next(request)? {
            Scripted::Chunks(items) => Ok(Box::pin(tokio_stream::iter(items))),
            Scripted::Error(error) => Err(error),
            Scripted::Response(_) => Err(BridgeError::new(
                ErrorCode::Internal,
                "scripted response consumed by a streaming call",
            )),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A one-choice response carrying `text` and `finish_reason`.
#[must_use]
pub fn text_response(text: &str, finish_reason: &str) -> OpenAIResponse {
    OpenAIResponse {
        id: "chatcmpl-mock".into(),
        object: "chat.completion".into(),
        model: "mock".into(),
        choices: vec![OpenAIChoice {
            index: 0,
            message: OpenAIResponseMessage {
                role: Some("assistant".into()),
                content: Some(text.into()),
                tool_calls: None,
            },
            finish_reason: Some(finish_reason.into()),
        }],
        usage: None,
    }
}

/// Split `text` into chunks of at most `chars` characters, then a finish chunk.
#[must_use]
pub fn text_chunks(text: &str, chars: usize, finish_reason: &str) -> Vec<ChatCompletionChunk> {
    let chars_vec: Vec<char> = text.chars().collect();
    let mut out: Vec<ChatCompletionChunk> = chars_vec
        .chunks(chars.max(1))
        .map(|piece| ChatCompletionChunk::text(piece.iter().collect::<String>()))
        .collect();
    out.push(ChatCompletionChunk::finish(finish_reason));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn replies_in_order_and_records_requests() {
        let client = ScriptedClient::new()
            .with_response(text_response("one", "stop"))
            .with_response(text_response("two", "stop"));

        let first = client
            .create(OpenAIRequest {
                model: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = client.create(OpenAIRequest::default()).await.unwrap();

        assert_eq!(first.choices[0].message.content.as_deref(), Some("one"));
        assert_eq!(second.choices[0].message.content.as_deref(), Some("two"));
        assert_eq!(client.requests().len(), 2);
        assert_eq!(client.requests()[0].model, "a");
    }

    #[tokio::test]
    async fn exhausted_script_is_unavailable() {
        let err = ScriptedClient::new()
            .create(OpenAIRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendUnavailable);
    }

    #[tokio::test]
    async fn streams_scripted_chunks() {
        let client = ScriptedClient::new().with_chunks(text_chunks("abcdef", 4, "stop"));
        let stream = client.create_stream(OpenAIRequest::default()).await.unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[1].as_ref().unwrap().choices[0].delta.content.as_deref(),
            Some("ef")
        );
    }

    #[tokio::test]
    async fn mismatched_call_kind_is_internal_error() {
        let client = ScriptedClient::new().with_chunks(vec![]);
        let err = client.create(OpenAIRequest::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(client.remaining(), 0);
    }

    #[test]
    fn text_chunks_split_on_chars() {
        let chunks = text_chunks("ééé", 2, "length");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].choices[0].delta.content.as_deref(), Some("éé"));
        assert_eq!(chunks[2].choices[0].finish_reason.as_deref(), Some("length"));
    }
}
