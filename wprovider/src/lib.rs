//! Model-connection boundary: dialogue handles, stream events, and the
//! generative-language wire adapter.

pub mod adapters;
mod connection;
mod error;
mod model;
mod stream;

pub mod prelude {
    pub use crate::adapters::gemini::{GeminiConnection, GeminiConnector};
    pub use crate::{
        BoxedEventStream, ConnectionConfig, ConnectionFuture, ModelConnection, ModelConnector,
        ModelMessage, ProviderError, ProviderErrorKind, Role, StreamEvent, ToolCall,
        ToolDeclaration, ToolResultPayload, VecEventStream,
    };
}

pub use connection::{ConnectionFuture, ModelConnection, ModelConnector};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    ConnectionConfig, ConnectionConfigBuilder, ModelMessage, Role, ToolCall, ToolDeclaration,
    ToolResultPayload,
};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
