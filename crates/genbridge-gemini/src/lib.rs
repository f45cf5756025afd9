// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod generator;
pub mod lenient;
pub mod types;

pub use generator::{ContentGenerator, ResponseStream};
pub use types::{
    Candidate, Content, ContentEmbedding, CountTokensRequest, CountTokensResponse,
    EmbedContentRequest, EmbedContentResponse, FinishReason, FunctionDeclaration,
    FunctionDeclarationGroup, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, Role, ToolDeclaration, UsageMetadata,
};
