// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy with stable error codes for genbridge.
//!
//! Every genbridge error carries an [`ErrorCode`] (a machine-readable, stable
//! string tag), a human-readable message, an optional cause chain, and
//! arbitrary key-value context.  Use the builder returned by
//! [`BridgeError::new`] to construct errors fluently.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// OpenAI-shaped response could not be translated.
    Response,
    /// Streaming translation errors.
    Stream,
    /// Failures reported by the chat-completions backend.
    Backend,
    /// Operations the backend cannot provide at all.
    Capability,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Response => "response",
            Self::Stream => "stream",
            Self::Backend => "backend",
            Self::Capability => "capability",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Response --
    /// Tool-call arguments are not valid JSON.
    ToolArgumentsInvalid,

    // -- Stream --
    /// The upstream chunk stream failed mid-flight.
    StreamInterrupted,

    // -- Backend --
    /// Backend could not be reached or returned a server-side failure.
    BackendUnavailable,
    /// Backend did not respond in time.
    BackendTimeout,

    // -- Capability --
    /// Embedding generation is not available through this adapter.
    EmbeddingUnsupported,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ToolArgumentsInvalid => ErrorCategory::Response,
            Self::StreamInterrupted => ErrorCategory::Stream,
            Self::BackendUnavailable | Self::BackendTimeout => ErrorCategory::Backend,
            Self::EmbeddingUnsupported => ErrorCategory::Capability,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation of the code (e.g.
    /// `"TOOL_ARGUMENTS_INVALID"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolArgumentsInvalid => "TOOL_ARGUMENTS_INVALID",
            Self::StreamInterrupted => "STREAM_INTERRUPTED",
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::BackendTimeout => "BACKEND_TIMEOUT",
            Self::EmbeddingUnsupported => "EMBEDDING_UNSUPPORTED",
            Self::Internal => "INTERNAL",
        }
    }

    /// Whether a higher layer may reasonably retry the failed call.
    ///
    /// Only transient backend conditions qualify; nothing in genbridge
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable | Self::BackendTimeout | Self::StreamInterrupted
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BridgeError
// ---------------------------------------------------------------------------

/// Unified genbridge error.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use genbridge_error::{BridgeError, ErrorCode};
///
/// let err = BridgeError::new(ErrorCode::ToolArgumentsInvalid, "bad arguments")
///     .with_context("function", "get_weather")
///     .with_context("index", 0);
/// assert_eq!(err.code, ErrorCode::ToolArgumentsInvalid);
/// ```
pub struct BridgeError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl BridgeError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Shorthand for `self.code.is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Debug for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("BridgeError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // BTreeMap keeps the rendering deterministic.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
