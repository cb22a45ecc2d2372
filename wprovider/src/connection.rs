//! Model connection seams: the live dialogue handle and its factory.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{BoxedEventStream, ModelMessage, ProviderError, ToolResultPayload};

pub type ConnectionFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A live, stateful dialogue with the external generative-language service.
/// The connection owns the accumulated exchange history; both operations
/// continue the same conversation and return a lazy stream of fragments.
pub trait ModelConnection: Send + Sync {
    fn send_user_message<'a>(
        &'a self,
        text: String,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;

    fn send_tool_result<'a>(
        &'a self,
        result: ToolResultPayload,
    ) -> ConnectionFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}

/// Builds fresh connections from a transcript. Sessions are reconstructed
/// wholesale whenever history is replaced, so the factory is long-lived
/// while connections are disposable.
pub trait ModelConnector: Send + Sync {
    fn connect(
        &self,
        history: Vec<ModelMessage>,
    ) -> Result<Arc<dyn ModelConnection>, ProviderError>;
}
