//! Connection adapter for the Google generative-language service.

mod serde_api;
mod transport;

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use async_stream::try_stream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    BoxedEventStream, ConnectionConfig, ConnectionFuture, ModelConnection, ModelConnector,
    ModelMessage, ProviderError, Role, StreamEvent, ToolCall, ToolDeclaration, ToolResultPayload,
};

pub use transport::{GeminiChunkStream, GeminiHttpTransport, GenerativeTransport, GEMINI_BASE_URL};

/// One conversation entry on the wire: a role plus its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![GeminiPart::text(text)],
        }
    }

    pub fn model_parts(parts: Vec<GeminiPart>) -> Self {
        Self {
            role: "model".to_string(),
            parts,
        }
    }

    pub fn tool_response(result: &ToolResultPayload) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![GeminiPart::function_response(GeminiFunctionResponse {
                name: result.tool_name.clone(),
                response: result.response.clone(),
            })],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "functionCall",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub function_call: Option<GeminiFunctionCall>,
    #[serde(
        rename = "functionResponse",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn function_call(call: GeminiFunctionCall) -> Self {
        Self {
            function_call: Some(call),
            ..Self::default()
        }
    }

    pub fn function_response(response: GeminiFunctionResponse) -> Self {
        Self {
            function_response: Some(response),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiRequest {
    pub model: String,
    pub system_instruction: String,
    pub tools: Vec<ToolDeclaration>,
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeminiStreamChunk {
    TextDelta(String),
    FunctionCall(GeminiFunctionCall),
}

#[derive(Clone, PartialEq, Eq)]
pub enum GeminiAuth {
    ApiKey(String),
}

impl Debug for GeminiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// A stateful dialogue handle. The accumulated exchange history lives here;
/// each send snapshots it, streams the reply, and records the model's side
/// once the stream drains.
pub struct GeminiConnection {
    transport: Arc<dyn GenerativeTransport>,
    auth: GeminiAuth,
    model: String,
    system_instruction: String,
    tools: Vec<ToolDeclaration>,
    history: Mutex<Vec<GeminiContent>>,
}

impl GeminiConnection {
    pub fn new(
        transport: Arc<dyn GenerativeTransport>,
        auth: GeminiAuth,
        config: ConnectionConfig,
    ) -> Self {
        let history = config
            .history
            .iter()
            .map(content_from_message)
            .collect::<Vec<_>>();

        Self {
            transport,
            auth,
            model: config.model,
            system_instruction: config.system_instruction,
            tools: config.tools,
            history: Mutex::new(history),
        }
    }

    pub fn history(&self) -> Result<Vec<GeminiContent>, ProviderError> {
        let history = self
            .history
            .lock()
            .map_err(|_| ProviderError::other("connection history lock poisoned"))?;
        Ok(history.clone())
    }

    fn push_history(&self, parts: Vec<GeminiPart>) -> Result<(), ProviderError> {
        let mut history = self
            .history
            .lock()
            .map_err(|_| ProviderError::other("connection history lock poisoned"))?;
        history.push(GeminiContent::model_parts(parts));
        Ok(())
    }

    fn exchange<'a>(
        &'a self,
        outgoing: GeminiContent,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let contents = {
                let mut history = self
                    .history
                    .lock()
                    .map_err(|_| ProviderError::other("connection history lock poisoned"))?;
                history.push(outgoing);
                history.clone()
            };

            let request = GeminiRequest {
                model: self.model.clone(),
                system_instruction: self.system_instruction.clone(),
                tools: self.tools.clone(),
                contents,
            };

            let mut chunks = self
                .transport
                .stream_generate(request, self.auth.clone())
                .await?;

            let stream = try_stream! {
                let mut narration = String::new();
                let mut first_call = None::<GeminiFunctionCall>;

                while let Some(chunk) = chunks.next().await {
                    match chunk? {
                        GeminiStreamChunk::TextDelta(delta) => {
                            narration.push_str(&delta);
                            yield StreamEvent::TextDelta(delta);
                        }
                        GeminiStreamChunk::FunctionCall(call) => {
                            if first_call.is_none() {
                                first_call = Some(call.clone());
                            }
                            yield StreamEvent::ToolCall(ToolCall::new(call.name, call.args));
                        }
                    }
                }

                let mut parts = Vec::new();
                if !narration.is_empty() {
                    parts.push(GeminiPart::text(narration));
                }
                if let Some(call) = first_call {
                    parts.push(GeminiPart::function_call(call));
                }

                if !parts.is_empty() {
                    self.push_history(parts)?;
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}

impl ModelConnection for GeminiConnection {
    fn send_user_message<'a>(
        &'a self,
        text: String,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        self.exchange(GeminiContent::user_text(text))
    }

    fn send_tool_result<'a>(
        &'a self,
        result: ToolResultPayload,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        self.exchange(GeminiContent::tool_response(&result))
    }
}

/// Long-lived factory for [`GeminiConnection`] handles.
#[derive(Debug, Clone)]
pub struct GeminiConnector {
    transport: Arc<dyn GenerativeTransport>,
    auth: GeminiAuth,
    model: String,
    system_instruction: String,
    tools: Vec<ToolDeclaration>,
}

impl GeminiConnector {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(GeminiHttpTransport::new(reqwest::Client::new())),
            auth: GeminiAuth::ApiKey(api_key.into()),
            model: model.into(),
            system_instruction: String::new(),
            tools: Vec::new(),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn GenerativeTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_system_instruction(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = system_instruction.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }
}

impl ModelConnector for GeminiConnector {
    fn connect(
        &self,
        history: Vec<ModelMessage>,
    ) -> Result<Arc<dyn ModelConnection>, ProviderError> {
        let config = ConnectionConfig::builder(self.model.clone())
            .system_instruction(self.system_instruction.clone())
            .tools(self.tools.clone())
            .history(history)
            .build()?;

        Ok(Arc::new(GeminiConnection::new(
            Arc::clone(&self.transport),
            self.auth.clone(),
            config,
        )))
    }
}

fn content_from_message(message: &ModelMessage) -> GeminiContent {
    let role = match message.role {
        Role::User => "user",
        Role::Model => "model",
    };

    GeminiContent {
        role: role.to_string(),
        parts: vec![GeminiPart::text(message.text.clone())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_debug_never_prints_the_key() {
        let auth = GeminiAuth::ApiKey("AIzaSy-secret".to_string());
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn history_messages_map_to_wire_roles() {
        let user = content_from_message(&ModelMessage::new(Role::User, "اهلا"));
        let model = content_from_message(&ModelMessage::new(Role::Model, "تحت أمرك"));

        assert_eq!(user.role, "user");
        assert_eq!(model.role, "model");
        assert_eq!(model.parts[0].text.as_deref(), Some("تحت أمرك"));
    }

    #[test]
    fn tool_response_content_carries_function_response_part() {
        let payload = ToolResultPayload::new(
            "recordPayment",
            serde_json::json!({"success": true}),
        );
        let content = GeminiContent::tool_response(&payload);

        assert_eq!(content.role, "user");
        let response = content.parts[0]
            .function_response
            .as_ref()
            .expect("part should hold a function response");
        assert_eq!(response.name, "recordPayment");
    }
}
