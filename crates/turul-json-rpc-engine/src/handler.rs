//! Method implementations and the lookup the engine dispatches through.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::MethodError;

/// A callable JSON-RPC method
#[async_trait]
pub trait JsonRpcMethod: Send + Sync {
    /// Invoke the method with its positional arguments.
    ///
    /// Return `MethodError::Rpc` for structured application errors (sent to
    /// the peer unchanged) and `MethodError::Other` for anything else (sent as
    /// an internal error).
    async fn call(&self, params: Vec<Value>) -> Result<Value, MethodError>;
}

/// A simple function-based method
pub struct FunctionMethod<F> {
    handler_fn: F,
}

impl<F> FunctionMethod<F> {
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F, Fut> JsonRpcMethod for FunctionMethod<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
{
    async fn call(&self, params: Vec<Value>) -> Result<Value, MethodError> {
        (self.handler_fn)(params).await
    }
}

/// Wrap an async closure as a shareable method
pub fn method_fn<F, Fut>(handler_fn: F) -> Arc<dyn JsonRpcMethod>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
{
    Arc::new(FunctionMethod::new(handler_fn))
}

/// Maps a method name to its implementation
pub trait MethodResolver: Send + Sync {
    fn resolve(&self, method: &str) -> Option<Arc<dyn JsonRpcMethod>>;

    /// List supported methods (optional - used for introspection)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

/// Resolver backed by a lookup closure
pub struct FunctionResolver<F> {
    resolve_fn: F,
}

impl<F> FunctionResolver<F>
where
    F: Fn(&str) -> Option<Arc<dyn JsonRpcMethod>> + Send + Sync,
{
    pub fn new(resolve_fn: F) -> Self {
        Self { resolve_fn }
    }
}

impl<F> MethodResolver for FunctionResolver<F>
where
    F: Fn(&str) -> Option<Arc<dyn JsonRpcMethod>> + Send + Sync,
{
    fn resolve(&self, method: &str) -> Option<Arc<dyn JsonRpcMethod>> {
        (self.resolve_fn)(method)
    }
}

/// Table of named methods
#[derive(Default, Clone)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn JsonRpcMethod>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under `name`, replacing any previous one
    pub fn register_method<M>(&mut self, name: impl Into<String>, method: M) -> &mut Self
    where
        M: JsonRpcMethod + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Register an async closure under `name`
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, handler_fn: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
    {
        self.methods.insert(name.into(), method_fn(handler_fn));
        self
    }

    /// Builder-style variant of [`register_fn`](Self::register_fn)
    pub fn with_fn<F, Fut>(mut self, name: impl Into<String>, handler_fn: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, MethodError>> + Send + 'static,
    {
        self.register_fn(name, handler_fn);
        self
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.methods.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl MethodResolver for MethodRegistry {
    fn resolve(&self, method: &str) -> Option<Arc<dyn JsonRpcMethod>> {
        self.methods.get(method).cloned()
    }

    fn supported_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}
