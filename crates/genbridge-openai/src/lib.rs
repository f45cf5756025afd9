// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dialect;
pub mod streaming;

pub use client::{ChatCompletionsClient, ChunkStream};
pub use dialect::{
    OpenAIChoice, OpenAIFunctionCall, OpenAIFunctionDef, OpenAIMessage, OpenAIRequest,
    OpenAIResponse, OpenAIResponseMessage, OpenAIToolCall, OpenAIToolDef, OpenAIUsage,
    StreamOptions,
};
pub use streaming::{
    ChatCompletionChunk, ChunkChoice, ChunkDelta, ChunkFunctionCall, ChunkToolCall,
    ToolCallAccumulator, ToolCallSlot,
};
