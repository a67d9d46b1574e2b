// Invoke-by-name transport to the execution backend
use crate::error::BackendError;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Carries one named command and its JSON argument object to the backend
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BackendError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BackendError> {
        (**self).invoke(command, args).await
    }
}

type CommandHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// In-process command router.
///
/// Handlers are registered by command name and answer with
/// `Result<Value, String>`, the same shape command handlers return on the
/// backend side. Useful for embedding a backend in the same process.
#[derive(Default)]
pub struct HandlerTransport {
    handlers: RwLock<HashMap<String, CommandHandler>>,
}

impl HandlerTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `command`
    pub fn register<F, Fut>(&self, command: &str, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move |args| handler(args).boxed());
        self.handlers.write().insert(command.to_string(), handler);
    }

    /// Builder form of [`HandlerTransport::register`]
    pub fn with_handler<F, Fut>(self, command: &str, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        self.register(command, handler);
        self
    }

    pub fn unregister(&self, command: &str) -> bool {
        self.handlers.write().remove(command).is_some()
    }

    pub fn has_command(&self, command: &str) -> bool {
        self.handlers.read().contains_key(command)
    }
}

#[async_trait]
impl Transport for HandlerTransport {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, BackendError> {
        // Clone the handler out so the lock is not held across the await
        let handler = self.handlers.read().get(command).cloned();
        let handler = handler.ok_or_else(|| BackendError::UnknownCommand(command.to_string()))?;

        debug!("Invoking backend command: {}", command);
        handler(args)
            .await
            .map_err(|message| BackendError::command(command, message))
    }
}
