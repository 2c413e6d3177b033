//! Scoped access to a [`ViewportContext`]

use std::sync::Arc;

use contracts::ViewportBackend;

use crate::context::{ViewportContext, ViewportProviderProps};

/// Panic message of [`ViewportScope::use_viewport`] outside a provider
pub const MISSING_PROVIDER_MESSAGE: &str = "use_viewport must be used within a ViewportProvider";

/// Handle passed down to consumers; either provides a context or does not.
///
/// Cloning shares the same context.
pub struct ViewportScope<B> {
    context: Option<Arc<ViewportContext<B>>>,
}

impl<B> Clone for ViewportScope<B> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<B> Default for ViewportScope<B> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<B> ViewportScope<B> {
    /// A scope with no provider above it
    pub fn detached() -> Self {
        Self { context: None }
    }

    pub fn is_provided(&self) -> bool {
        self.context.is_some()
    }

    /// Strict accessor.
    ///
    /// # Panics
    /// When no provider is in scope; that is a programming error, not a
    /// runtime condition.
    #[track_caller]
    pub fn use_viewport(&self) -> &ViewportContext<B> {
        match &self.context {
            Some(context) => &**context,
            None => panic!("{MISSING_PROVIDER_MESSAGE}"),
        }
    }

    /// Lenient accessor for consumers that can run without a session
    pub fn use_viewport_optional(&self) -> Option<&ViewportContext<B>> {
        self.context.as_deref()
    }
}

impl<B: ViewportBackend + Sync + 'static> ViewportScope<B> {
    /// Create a context and a scope providing it
    pub fn provide(props: ViewportProviderProps, backend: B) -> Self {
        Self::from_context(Arc::new(ViewportContext::new(props, backend)))
    }

    pub fn from_context(context: Arc<ViewportContext<B>>) -> Self {
        Self {
            context: Some(context),
        }
    }
}
