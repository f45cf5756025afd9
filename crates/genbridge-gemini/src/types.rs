// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gemini-shaped request and response types.

use serde::{Deserialize, Serialize};

use crate::lenient;

// ---------------------------------------------------------------------------
// Content & parts
// ---------------------------------------------------------------------------

/// Author of a [`Content`] turn.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    #[default]
    User,
    /// The model.
    Model,
    /// System instructions.
    System,
}

impl Role {
    /// Parse a wire role, treating anything unrecognised as [`Role::User`].
    #[must_use]
    pub fn from_wire(role: &str) -> Self {
        match role {
            "model" => Self::Model,
            "system" => Self::System,
            _ => Self::User,
        }
    }

    /// Wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
            Self::System => "system",
        }
    }
}

/// A part within a content block.
///
/// Serialises with Gemini's externally tagged camelCase shape:
/// `{"text": ...}`, `{"functionCall": {...}}`, `{"functionResponse": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text content.
    Text(String),
    /// A function call requested by the model.
    FunctionCall {
        /// Name of the function to invoke.
        name: String,
        /// Arguments as a JSON value.
        #[serde(default)]
        args: serde_json::Value,
    },
    /// A function response returned to the model.
    FunctionResponse {
        /// Name of the function that was called.
        name: String,
        /// The function's response payload.
        #[serde(default)]
        response: serde_json::Value,
    },
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a function call part.
    #[must_use]
    pub fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Create a function response part.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self::FunctionResponse {
            name: name.into(),
            response,
        }
    }

    /// The text of a [`Part::Text`], if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Role of the content author.
    #[serde(default)]
    pub role: Role,
    /// Content parts, in order.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a content block with an explicit role.
    #[must_use]
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self { role, parts }
    }

    /// Create a user-role content block.
    #[must_use]
    pub fn user(parts: Vec<Part>) -> Self {
        Self::new(Role::User, parts)
    }

    /// Create a model-role content block.
    #[must_use]
    pub fn model(parts: Vec<Part>) -> Self {
        Self::new(Role::Model, parts)
    }

    /// Create a system-role content block.
    #[must_use]
    pub fn system(parts: Vec<Part>) -> Self {
        Self::new(Role::System, parts)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Generation parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Top-p (nucleus) sampling parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences that halt generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// A function declaration for tool use.
///
/// Every field is optional on the wire; declarations without a name are
/// skipped during conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionDeclaration {
    /// Function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the function parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl FunctionDeclaration {
    /// Declaration with a name, description and parameter schema.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            parameters: Some(parameters),
        }
    }
}

/// Gemini-style wrapper holding several declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclarationGroup {
    /// Function declarations available to the model.
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One entry of a request's `tools` list.
///
/// Callers send either the Gemini wrapper (`{"functionDeclarations": [...]}`)
/// or a bare declaration; both shapes are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolDeclaration {
    /// `{ "functionDeclarations": [...] }`.
    Group(FunctionDeclarationGroup),
    /// A flat function declaration.
    Function(FunctionDeclaration),
}

impl ToolDeclaration {
    /// Wrap declarations in a Gemini-style group.
    #[must_use]
    pub fn group(declarations: Vec<FunctionDeclaration>) -> Self {
        Self::Group(FunctionDeclarationGroup {
            function_declarations: declarations,
        })
    }

    /// Iterate over the declarations this entry carries.
    pub fn declarations(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        let slice: &[FunctionDeclaration] = match self {
            Self::Group(g) => &g.function_declarations,
            Self::Function(f) => std::slice::from_ref(f),
        };
        slice.iter()
    }
}

/// A content-generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Model identifier.
    #[serde(default)]
    pub model: String,
    /// Conversation history. Malformed elements are dropped on deserialisation.
    #[serde(default, deserialize_with = "lenient::deserialize_contents")]
    pub contents: Vec<Content>,
    /// Optional system instruction.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::deserialize_optional_content"
    )]
    pub system_instruction: Option<Content>,
    /// Generation configuration parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    /// Tool declarations available to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclaration>>,
}

impl GenerateContentRequest {
    /// Create a new request for the given model.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a content block and return `self` for chaining.
    #[must_use]
    pub fn add_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn system_instruction(mut self, content: Content) -> Self {
        self.system_instruction = Some(content);
        self
    }

    /// Set generation config.
    #[must_use]
    pub fn generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Set tool declarations.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = Some(tools);
        self
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// No finish reason was reported.
    #[serde(rename = "FINISH_REASON_UNSPECIFIED")]
    Unspecified,
    /// Natural stop point or a completed tool invocation.
    Stop,
    /// The output token limit was reached.
    MaxTokens,
    /// Output was withheld by a content filter.
    Safety,
    /// Output was withheld for recitation.
    Recitation,
    /// Any other reason.
    Other,
}

impl FinishReason {
    /// Wire representation (e.g. `"MAX_TOKENS"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "FINISH_REASON_UNSPECIFIED",
            Self::Stop => "STOP",
            Self::MaxTokens => "MAX_TOKENS",
            Self::Safety => "SAFETY",
            Self::Recitation => "RECITATION",
            Self::Other => "OTHER",
        }
    }
}

/// A single candidate in a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content.
    pub content: Content,
    /// Reason the model stopped generating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Position of this candidate in the response.
    #[serde(default)]
    pub index: u32,
}

/// Token usage metadata.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens consumed by the prompt.
    pub prompt_token_count: u64,
    /// Tokens generated across all candidates.
    pub candidates_token_count: u64,
    /// Total tokens (prompt + candidates).
    pub total_token_count: u64,
}

/// A full response, or one chunk of a streamed response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Response with a single model candidate at index 0.
    #[must_use]
    pub fn single(parts: Vec<Part>, finish_reason: Option<FinishReason>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Content::model(parts),
                finish_reason,
                index: 0,
            }],
            usage_metadata: None,
        }
    }

    /// Extract the text from the first candidate's first text part.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(Part::as_text))
    }

    /// Extract all function calls from the first candidate.
    #[must_use]
    pub fn function_calls(&self) -> Vec<(&str, &serde_json::Value)> {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| match p {
                        Part::FunctionCall { name, args } => Some((name.as_str(), args)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Finish reason of the first candidate.
    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates.first().and_then(|c| c.finish_reason)
    }
}

// ---------------------------------------------------------------------------
// Token counting & embeddings
// ---------------------------------------------------------------------------

/// Request for an approximate token count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensRequest {
    /// Model identifier.
    #[serde(default)]
    pub model: String,
    /// Conversation history to measure.
    #[serde(default, deserialize_with = "lenient::deserialize_contents")]
    pub contents: Vec<Content>,
    /// Optional system instruction, counted like any other message.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::deserialize_optional_content"
    )]
    pub system_instruction: Option<Content>,
}

/// Result of a token count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    /// Estimated total token count.
    pub total_tokens: u64,
}

/// Request for content embeddings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Model identifier.
    #[serde(default)]
    pub model: String,
    /// Contents to embed.
    #[serde(default, deserialize_with = "lenient::deserialize_contents")]
    pub contents: Vec<Content>,
}

/// A single embedding vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentEmbedding {
    /// Embedding values.
    pub values: Vec<f32>,
}

/// Result of an embedding request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmbedContentResponse {
    /// One embedding per input content.
    pub embeddings: Vec<ContentEmbedding>,
}
