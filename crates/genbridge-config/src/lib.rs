// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for genbridge.
//!
//! This crate provides [`BridgeConfig`], the adapter's tunable policy,
//! together with helpers for loading from TOML files, applying environment
//! overrides, merging overlays, and producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The flush threshold is large enough to make streaming feel batched.
    LargeFlushThreshold {
        /// Configured threshold in characters.
        chars: usize,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeFlushThreshold { chars } => {
                write!(f, "stream flush threshold is large ({chars} chars)")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default number of buffered characters that forces a streaming flush.
pub const DEFAULT_FLUSH_THRESHOLD_CHARS: usize = 100;

/// Default characters-per-token ratio used by token estimation.
pub const DEFAULT_CHARS_PER_TOKEN: u32 = 4;

/// Threshold above which the flush threshold generates a warning.
const LARGE_FLUSH_THRESHOLD: usize = 4_096;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration for the genbridge adapter.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Model sent to the chat-completions backend. When unset the model
    /// named in each request is passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_model: Option<String>,

    /// Streaming re-assembly policy.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Token estimation policy.
    #[serde(default)]
    pub tokens: TokenConfig,
}

/// When buffered streaming text is released to the caller.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct StreamConfig {
    /// Buffered character count that forces a flush.
    pub flush_threshold_chars: usize,
    /// Flush as soon as a text delta contains a paragraph break (`\n\n`).
    pub flush_on_paragraph_break: bool,
    /// Ask the backend to append a usage chunk to the stream.
    pub include_usage: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            flush_threshold_chars: DEFAULT_FLUSH_THRESHOLD_CHARS,
            flush_on_paragraph_break: true,
            include_usage: false,
        }
    }
}

/// Character-length heuristic used by `count_tokens`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct TokenConfig {
    /// Characters counted as one token.
    pub chars_per_token: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`BridgeConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`BridgeConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => BridgeConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`BridgeConfig`].
pub fn parse_toml(content: &str) -> Result<BridgeConfig, ConfigError> {
    toml::from_str::<BridgeConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

/// JSON Schema describing [`BridgeConfig`], for editor tooling.
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(BridgeConfig)
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `GENBRIDGE_BACKEND_MODEL`
/// - `GENBRIDGE_FLUSH_THRESHOLD`
/// - `GENBRIDGE_INCLUDE_USAGE`
pub fn apply_env_overrides(config: &mut BridgeConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using an arbitrary variable lookup.
///
/// Values that fail to parse (a non-numeric threshold, a boolean other than
/// `true`/`false`/`1`/`0`) are ignored.
pub fn apply_overrides_from<F>(config: &mut BridgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("GENBRIDGE_BACKEND_MODEL") {
        config.backend_model = Some(val);
    }
    if let Some(val) = lookup("GENBRIDGE_FLUSH_THRESHOLD")
        && let Ok(n) = val.trim().parse::<usize>()
    {
        config.stream.flush_threshold_chars = n;
    }
    if let Some(val) = lookup("GENBRIDGE_INCLUDE_USAGE")
        && let Some(flag) = parse_flag(&val)
    {
        config.stream.include_usage = flag;
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (blank backend model, zero thresholds) are returned as a
/// [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &BridgeConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref model) = config.backend_model
        && model.trim().is_empty()
    {
        errors.push("backend_model must not be blank".into());
    }

    let threshold = config.stream.flush_threshold_chars;
    if threshold == 0 {
        errors.push("stream.flush_threshold_chars must be at least 1".into());
    } else if threshold > LARGE_FLUSH_THRESHOLD {
        warnings.push(ConfigWarning::LargeFlushThreshold { chars: threshold });
    }

    if config.tokens.chars_per_token == 0 {
        errors.push("tokens.chars_per_token must be at least 1".into());
    }

    if config.backend_model.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "backend_model".into(),
            hint: "request model names are forwarded to the backend as-is".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// Optional scalars fall back to `base` when the overlay leaves them unset;
/// the `stream` and `tokens` sections are taken from the overlay whenever it
/// differs from the defaults.
pub fn merge_configs(base: BridgeConfig, overlay: BridgeConfig) -> BridgeConfig {
    let stream = if overlay.stream == StreamConfig::default() {
        base.stream
    } else {
        overlay.stream
    };
    let tokens = if overlay.tokens == TokenConfig::default() {
        base.tokens
    } else {
        overlay.tokens
    };
    BridgeConfig {
        backend_model: overlay.backend_model.or(base.backend_model),
        stream,
        tokens,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let cfg = BridgeConfig::default();
        let warnings = validate_config(&cfg).expect("default config should be valid");
        assert_eq!(warnings.len(), 1, "only backend_model is advisory");
    }

    #[test]
    fn default_config_keeps_behavioural_defaults() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.stream.flush_threshold_chars, 100);
        assert!(cfg.stream.flush_on_paragraph_break);
        assert!(!cfg.stream.include_usage);
        assert_eq!(cfg.tokens.chars_per_token, 4);
    }

    #[test]
    fn parse_valid_toml_string() {
        let toml = r#"
            backend_model = "gpt-4o-mini"

            [stream]
            flush_threshold_chars = 64
            include_usage = true
        "#;
        let cfg = parse_toml(toml).unwrap();
        assert_eq!(cfg.backend_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cfg.stream.flush_threshold_chars, 64);
        assert!(cfg.stream.flush_on_paragraph_break, "unset keys keep defaults");
        assert!(cfg.stream.include_usage);
    }

    #[test]
    fn empty_toml_yields_section_defaults() {
        let cfg = parse_toml("").unwrap();
        assert_eq!(cfg.stream, StreamConfig::default());
        assert_eq!(cfg.tokens, TokenConfig::default());
        assert!(cfg.backend_model.is_none());
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let err = parse_toml("this is [not valid toml =").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn parse_wrong_types_gives_parse_error() {
        let err = parse_toml("[stream]\nflush_threshold_chars = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn validation_rejects_zero_threshold_and_ratio() {
        let cfg = BridgeConfig {
            stream: StreamConfig {
                flush_threshold_chars: 0,
                ..Default::default()
            },
            tokens: TokenConfig { chars_per_token: 0 },
            ..Default::default()
        };
        match validate_config(&cfg).unwrap_err() {
            ConfigError::ValidationError { reasons } => {
                assert_eq!(reasons.len(), 2);
                assert!(reasons.iter().any(|r| r.contains("flush_threshold_chars")));
                assert!(reasons.iter().any(|r| r.contains("chars_per_token")));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn large_threshold_is_only_a_warning() {
        let cfg = BridgeConfig {
            backend_model: Some("gpt-4o".into()),
            stream: StreamConfig {
                flush_threshold_chars: 10_000,
                ..Default::default()
            },
            ..Default::default()
        };
        let warnings = validate_config(&cfg).unwrap();
        assert_eq!(
            warnings,
            vec![ConfigWarning::LargeFlushThreshold { chars: 10_000 }]
        );
    }

    #[test]
    fn blank_backend_model_is_rejected() {
        let cfg = BridgeConfig {
            backend_model: Some("  ".into()),
            ..Default::default()
        };
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn overrides_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GENBRIDGE_BACKEND_MODEL", "local-llama"),
            ("GENBRIDGE_FLUSH_THRESHOLD", " 250 "),
            ("GENBRIDGE_INCLUDE_USAGE", "TRUE"),
        ]);
        let mut cfg = BridgeConfig::default();
        apply_overrides_from(&mut cfg, |k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(cfg.backend_model.as_deref(), Some("local-llama"));
        assert_eq!(cfg.stream.flush_threshold_chars, 250);
        assert!(cfg.stream.include_usage);
    }

    #[test]
    fn unparseable_overrides_are_ignored() {
        let mut cfg = BridgeConfig::default();
        apply_overrides_from(&mut cfg, |k| match k {
            "GENBRIDGE_FLUSH_THRESHOLD" => Some("lots".into()),
            "GENBRIDGE_INCLUDE_USAGE" => Some("maybe".into()),
            _ => None,
        });
        assert_eq!(cfg, BridgeConfig::default());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genbridge.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[tokens]\nchars_per_token = 3").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.tokens.chars_per_token, 3);
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/genbridge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn merge_overlay_overrides_base() {
        let base = BridgeConfig {
            backend_model: Some("gpt-4o".into()),
            ..Default::default()
        };
        let overlay = BridgeConfig {
            backend_model: None,
            stream: StreamConfig {
                flush_threshold_chars: 32,
                ..Default::default()
            },
            tokens: TokenConfig::default(),
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.backend_model.as_deref(), Some("gpt-4o"));
        assert_eq!(merged.stream.flush_threshold_chars, 32);
    }

    #[test]
    fn merge_keeps_base_sections_when_overlay_is_default() {
        let base = BridgeConfig {
            tokens: TokenConfig { chars_per_token: 2 },
            ..Default::default()
        };
        let merged = merge_configs(base, BridgeConfig::default());
        assert_eq!(merged.tokens.chars_per_token, 2);
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = BridgeConfig {
            backend_model: Some("gpt-4o".into()),
            ..Default::default()
        };
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(parse_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn schema_mentions_stream_section() {
        let schema = serde_json::to_string(&config_schema()).unwrap();
        assert!(schema.contains("flush_threshold_chars"));
        assert!(schema.contains("chars_per_token"));
    }

    #[test]
    fn warning_display() {
        let w = ConfigWarning::LargeFlushThreshold { chars: 9000 };
        assert_eq!(w.to_string(), "stream flush threshold is large (9000 chars)");
    }
}
