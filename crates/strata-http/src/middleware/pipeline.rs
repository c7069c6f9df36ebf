//! Middleware chain for composing multiple middleware

use super::{Handler, Middleware};
use std::fmt;
use std::sync::Arc;

/// Nest `middleware` around `terminal`, first entry outermost
pub fn compose(middleware: &[Arc<dyn Middleware>], terminal: Handler) -> Handler {
    middleware
        .iter()
        .rev()
        .fold(terminal, |next, layer| layer.wrap(next))
}

/// Ordered list of middleware, earliest-registered first
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
        }
    }

    /// Add middleware to the chain
    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Add an already-shared middleware to the chain
    pub fn add_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Add middleware to the chain (mutable version)
    pub fn push<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Append `other`; its middleware run inside this chain's middleware
    pub fn extend(mut self, other: &MiddlewareChain) -> Self {
        self.middleware.extend(other.middleware.iter().cloned());
        self
    }

    /// Compose the chain around a terminal handler
    pub fn compose(&self, terminal: Handler) -> Handler {
        compose(&self.middleware, terminal)
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Get middleware names for debugging
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewareChain {
    fn from(middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middleware }
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("middleware", &self.names())
            .finish()
    }
}
