// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gemini request → chat-completions request.
//!
//! Gemini histories carry no call ids, so calls and responses are paired by
//! `(name, serialized args)` and responses take the id of the first call
//! with the same name. Calls that never receive a response are folded into
//! the message text instead of being sent as tool calls, which keeps the
//! backend's call/response pairing rules satisfied.

use std::collections::HashSet;

use chrono::Utc;
use genbridge_config::BridgeConfig;
use genbridge_gemini::{Content, GenerateContentRequest, Part, Role, ToolDeclaration};
use genbridge_openai::{OpenAIMessage, OpenAIRequest, OpenAIToolCall, OpenAIToolDef};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

/// Request-level knobs that do not come from the Gemini request itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Model sent to the backend instead of the request's own model.
    pub backend_model: Option<String>,
}

impl From<&BridgeConfig> for AdapterOptions {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            backend_model: config.backend_model.clone(),
        }
    }
}

/// Convert a full Gemini request into a non-streaming chat-completions request.
#[must_use]
pub fn to_chat_request(request: &GenerateContentRequest, options: &AdapterOptions) -> OpenAIRequest {
    let messages = to_chat_messages(&request.contents, request.system_instruction.as_ref());
    let tools = to_tool_defs(request.tools.as_deref().unwrap_or_default());
    let config = request.generation_config.clone().unwrap_or_default();

    let model = options
        .backend_model
        .clone()
        .unwrap_or_else(|| request.model.clone());

    debug!(
        target: "genbridge.request",
        model = %model,
        contents = request.contents.len(),
        messages = messages.len(),
        tools = tools.len(),
        "converted generate-content request"
    );

    OpenAIRequest {
        model,
        messages,
        tools: (!tools.is_empty()).then_some(tools),
        temperature: config.temperature,
        max_tokens: config.max_output_tokens,
        top_p: config.top_p,
        stop: config.stop_sequences,
        stream: false,
        stream_options: None,
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Convert a Gemini history (plus optional system instruction) into chat messages.
#[must_use]
pub fn to_chat_messages(
    contents: &[Content],
    system_instruction: Option<&Content>,
) -> Vec<OpenAIMessage> {
    let ids = CallIds::collect(contents);
    let mut messages = Vec::new();

    if let Some(system) = system_instruction {
        let text = concat_text(&system.parts);
        if !text.is_empty() {
            messages.push(OpenAIMessage::system(text));
        }
    }

    for content in contents {
        convert_content(content, &ids, &mut messages);
    }
    messages
}

fn convert_content(content: &Content, ids: &CallIds, out: &mut Vec<OpenAIMessage>) {
    let mut text = TextBuilder::default();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();

    for part in &content.parts {
        match part {
            Part::Text(t) => text.push(t),
            Part::FunctionCall { name, args } => {
                let args_json = args.to_string();
                match ids.call_id(name, &args_json) {
                    Some(id) if ids.has_response(name) => {
                        tool_calls.push(OpenAIToolCall::function(id, name, args_json));
                    }
                    _ => text.fold(&format!("[Function call: {name}({args_json})]")),
                }
            }
            Part::FunctionResponse { name, response } => match ids.first_id_for(name) {
                Some(id) => tool_results.push(OpenAIMessage::tool(id, response.to_string())),
                None => {
                    debug!(target: "genbridge.request", function = %name, "function response without a call");
                    text.fold(&format!("[Function response: {name}({response})]"));
                }
            },
        }
    }

    let text = text.finish();
    if !tool_calls.is_empty() {
        out.push(OpenAIMessage::Assistant {
            content: (!text.is_empty()).then_some(text),
            tool_calls: Some(tool_calls),
        });
        out.extend(tool_results);
    } else if !tool_results.is_empty() {
        out.extend(tool_results);
        if !text.is_empty() {
            out.push(role_message(content.role, text));
        }
    } else if !text.is_empty() {
        out.push(role_message(content.role, text));
    }
}

fn role_message(role: Role, text: String) -> OpenAIMessage {
    match role {
        Role::User => OpenAIMessage::user(text),
        Role::Model => OpenAIMessage::assistant(text),
        Role::System => OpenAIMessage::system(text),
    }
}

fn concat_text(parts: &[Part]) -> String {
    parts.iter().filter_map(Part::as_text).collect()
}

/// Text parts concatenate directly; folded descriptions sit on their own line.
#[derive(Default)]
struct TextBuilder {
    text: String,
    after_fold: bool,
}

impl TextBuilder {
    fn push(&mut self, t: &str) {
        if self.after_fold && !t.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(t);
        self.after_fold = false;
    }

    fn fold(&mut self, description: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(description);
        self.after_fold = true;
    }

    fn finish(self) -> String {
        self.text
    }
}

// ---------------------------------------------------------------------------
// Call-id correlation
// ---------------------------------------------------------------------------

/// Call ids keyed by `(name, serialized args)`, in first-seen order.
struct CallIds {
    keys: Vec<(String, String, String)>,
    answered: HashSet<String>,
}

impl CallIds {
    fn collect(contents: &[Content]) -> Self {
        let mut ids = Self {
            keys: Vec::new(),
            answered: HashSet::new(),
        };
        for part in contents.iter().flat_map(|c| &c.parts) {
            match part {
                Part::FunctionCall { name, args } => {
                    let args_json = args.to_string();
                    if ids.call_id(name, &args_json).is_none() {
                        ids.keys.push((name.clone(), args_json, new_call_id()));
                    }
                }
                Part::FunctionResponse { name, .. } => {
                    ids.answered.insert(name.clone());
                }
                Part::Text(_) => {}
            }
        }
        ids
    }

    fn call_id(&self, name: &str, args_json: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(n, a, _)| n == name && a == args_json)
            .map(|(_, _, id)| id.as_str())
    }

    fn first_id_for(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, id)| id.as_str())
    }

    fn has_response(&self, name: &str) -> bool {
        self.answered.contains(name)
    }
}

/// `call_<unix-millis>_<9 alphanumerics>`.
pub(crate) fn new_call_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("call_{}_{suffix}", Utc::now().timestamp_millis())
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Flatten Gemini tool declarations into chat-completions function tools.
///
/// Declarations without a name are skipped.
#[must_use]
pub fn to_tool_defs(tools: &[ToolDeclaration]) -> Vec<OpenAIToolDef> {
    tools
        .iter()
        .flat_map(ToolDeclaration::declarations)
        .filter_map(|decl| {
            let name = decl.name.as_deref().filter(|n| !n.is_empty())?;
            Some(OpenAIToolDef::function(
                name,
                decl.description.clone().unwrap_or_default(),
                decl.parameters
                    .clone()
                    .unwrap_or_else(empty_object_schema),
            ))
        })
        .collect()
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}
