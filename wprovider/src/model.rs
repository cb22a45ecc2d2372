//! Connection-agnostic message, tool, and configuration types.
//!
//! ```rust
//! use wprovider::{ConnectionConfig, ModelMessage, Role};
//!
//! let ok = ConnectionConfig::builder("gemini-2.5-flash")
//!     .system_instruction("أنت مساعد الورشة الذكي")
//!     .history(vec![ModelMessage::new(Role::User, "اهلا")])
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ConnectionConfig::builder("").build();
//! assert!(err.is_err());
//! ```

use serde_json::Value;

use crate::{ProviderError, ProviderErrorKind};

/// Transcript roles as the model service sees them. Transient UI roles never
/// reach the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMessage {
    pub role: Role,
    pub text: String,
}

impl ModelMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// One declared operation in the fixed tool contract handed to the model:
/// a name, a natural-language description, and a JSON parameter schema.
/// The engine honors this contract; it does not author it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A structured intent the model emitted mid-stream, naming one declared
/// tool and its argument bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// The execution result fed back into the dialogue so the model can narrate
/// the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultPayload {
    pub tool_name: String,
    pub response: Value,
}

impl ToolResultPayload {
    pub fn new(tool_name: impl Into<String>, response: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            response,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub model: String,
    pub system_instruction: String,
    pub tools: Vec<ToolDeclaration>,
    pub history: Vec<ModelMessage>,
}

impl ConnectionConfig {
    pub fn builder(model: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(model)
    }

    /// Same configuration over a replaced transcript; used when a data
    /// import swaps the conversation history wholesale.
    pub fn with_history(mut self, history: Vec<ModelMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "model must not be empty",
                false,
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfigBuilder {
    model: String,
    system_instruction: String,
    tools: Vec<ToolDeclaration>,
    history: Vec<ModelMessage>,
}

impl ConnectionConfigBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: String::new(),
            tools: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn system_instruction(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = system_instruction.into();
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn tool(mut self, tool: ToolDeclaration) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn history(mut self, history: Vec<ModelMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn build(self) -> Result<ConnectionConfig, ProviderError> {
        let config = ConnectionConfig {
            model: self.model,
            system_instruction: self.system_instruction,
            tools: self.tools,
            history: self.history,
        };

        config.validate()?;
        Ok(config)
    }
}
