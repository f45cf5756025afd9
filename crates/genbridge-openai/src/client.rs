// SPDX-License-Identifier: MIT OR Apache-2.0
//! The seam to whatever actually talks to a chat-completions backend.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::Stream;
use genbridge_error::BridgeError;

use crate::dialect::{OpenAIRequest, OpenAIResponse};
use crate::streaming::ChatCompletionChunk;

/// Boxed stream of chunks from a streaming completion.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, BridgeError>> + Send>>;

/// A chat-completions backend.
///
/// Implementations own transport, authentication and retries; callers see
/// only typed requests and responses.
#[async_trait]
pub trait ChatCompletionsClient: Send + Sync {
    /// Run a non-streaming completion.
    async fn create(&self, request: OpenAIRequest) -> Result<OpenAIResponse, BridgeError>;

    /// Start a streaming completion.
    async fn create_stream(&self, request: OpenAIRequest) -> Result<ChunkStream, BridgeError>;
}

#[async_trait]
impl<T: ChatCompletionsClient + ?Sized> ChatCompletionsClient for Arc<T> {
    async fn create(&self, request: OpenAIRequest) -> Result<OpenAIResponse, BridgeError> {
        (**self).create(request).await
    }

    async fn create_stream(&self, request: OpenAIRequest) -> Result<ChunkStream, BridgeError> {
        (**self).create_stream(request).await
    }
}
