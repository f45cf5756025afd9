// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod finish;
pub mod generator;
pub mod request;
pub mod response;
pub mod stream;
pub mod tokens;

pub use finish::map_finish_reason;
pub use generator::OpenAiContentGenerator;
pub use request::{AdapterOptions, to_chat_messages, to_chat_request, to_tool_defs};
pub use response::{from_chat_response, usage_metadata};
pub use stream::{StreamTranslator, TranslatedStream};
pub use tokens::{count_tokens, estimate_tokens};
