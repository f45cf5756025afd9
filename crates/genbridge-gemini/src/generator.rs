// SPDX-License-Identifier: MIT OR Apache-2.0
//! The content-generation contract callers program against.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use genbridge_error::BridgeError;

use crate::types::{
    CountTokensRequest, CountTokensResponse, EmbedContentRequest, EmbedContentResponse,
    GenerateContentRequest, GenerateContentResponse,
};

/// Lazy, forward-only sequence of response chunks.
pub type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, BridgeError>> + Send>>;

/// A backend able to generate Gemini-shaped content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate one complete response.
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BridgeError>;

    /// Generate a response as a stream of chunks.
    ///
    /// The returned stream cannot be restarted; dropping it abandons the
    /// underlying backend stream.
    async fn generate_content_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ResponseStream, BridgeError>;

    /// Count (or estimate) the tokens a request would consume.
    async fn count_tokens(
        &self,
        request: CountTokensRequest,
    ) -> Result<CountTokensResponse, BridgeError>;

    /// Compute embeddings for the given contents.
    async fn embed_content(
        &self,
        request: EmbedContentRequest,
    ) -> Result<EmbedContentResponse, BridgeError>;
}
