//! Screen-text context capability.
//!
//! The engine only needs "what text is visible right now". Extraction and
//! filtering belong to the platform layer, which implements
//! [`ContextProvider`] or pushes text into a [`SharedContext`].

use std::sync::{Arc, RwLock};

/// Supplies the currently visible text.
///
/// Implementations must be fast relative to network latency and must not
/// fail: return an empty string when nothing can be read.
pub trait ContextProvider: Send + Sync {
    fn current_context(&self) -> String;
}

/// Always returns the same text.
#[derive(Debug, Clone, Default)]
pub struct StaticContext(String);

impl StaticContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl ContextProvider for StaticContext {
    fn current_context(&self) -> String {
        self.0.clone()
    }
}

/// Context slot the host updates as the screen changes.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    text: Arc<RwLock<String>>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible text.
    pub fn set(&self, text: impl Into<String>) {
        match self.text.write() {
            Ok(mut guard) => *guard = text.into(),
            Err(poisoned) => *poisoned.into_inner() = text.into(),
        }
    }
}

impl ContextProvider for SharedContext {
    fn current_context(&self) -> String {
        match self.text.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
