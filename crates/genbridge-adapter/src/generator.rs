// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ContentGenerator`] over a chat-completions backend.

use async_trait::async_trait;
use genbridge_config::{BridgeConfig, StreamConfig, TokenConfig};
use genbridge_error::{BridgeError, ErrorCode};
use genbridge_gemini::{
    ContentGenerator, CountTokensRequest, CountTokensResponse, EmbedContentRequest,
    EmbedContentResponse, GenerateContentRequest, GenerateContentResponse, ResponseStream,
};
use genbridge_openai::{ChatCompletionsClient, StreamOptions};
use tracing::debug;

use crate::request::{AdapterOptions, to_chat_request};
use crate::response::from_chat_response;
use crate::stream::TranslatedStream;
use crate::tokens::count_tokens;

/// Serves Gemini-shaped calls from a backend that only speaks chat completions.
#[derive(Debug, Clone)]
pub struct OpenAiContentGenerator<C> {
    client: C,
    options: AdapterOptions,
    stream: StreamConfig,
    tokens: TokenConfig,
}

impl<C: ChatCompletionsClient> OpenAiContentGenerator<C> {
    /// Generator with default flush and token settings.
    pub fn new(client: C) -> Self {
        Self::from_config(client, &BridgeConfig::default())
    }

    /// Generator configured from a loaded [`BridgeConfig`].
    pub fn from_config(client: C, config: &BridgeConfig) -> Self {
        Self {
            client,
            options: AdapterOptions::from(config),
            stream: config.stream,
            tokens: config.tokens,
        }
    }

    /// The underlying backend client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ChatCompletionsClient + 'static> ContentGenerator for OpenAiContentGenerator<C> {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BridgeError> {
        let chat = to_chat_request(&request, &self.options);
        debug!(target: "genbridge.generator", model = %chat.model, "generate_content");
        let response = self.client.create(chat).await?;
        from_chat_response(&response)
    }

    async fn generate_content_stream(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ResponseStream, BridgeError> {
        let mut chat = to_chat_request(&request, &self.options);
        chat.stream = true;
        if self.stream.include_usage {
            chat.stream_options = Some(StreamOptions {
                include_usage: true,
            });
        }
        debug!(
            target: "genbridge.generator",
            model = %chat.model,
            flush_threshold = self.stream.flush_threshold_chars,
            "generate_content_stream"
        );
        let upstream = self.client.create_stream(chat).await?;
        Ok(Box::pin(TranslatedStream::new(upstream, self.stream)))
    }

    async fn count_tokens(
        &self,
        request: CountTokensRequest,
    ) -> Result<CountTokensResponse, BridgeError> {
        let response = count_tokens(&request, self.tokens.chars_per_token);
        debug!(target: "genbridge.generator", total = response.total_tokens, "count_tokens");
        Ok(response)
    }

    async fn embed_content(
        &self,
        request: EmbedContentRequest,
    ) -> Result<EmbedContentResponse, BridgeError> {
        Err(BridgeError::new(
            ErrorCode::EmbeddingUnsupported,
            "embeddings are not supported by chat-completions backends",
        )
        .with_context("model", request.model))
    }
}
