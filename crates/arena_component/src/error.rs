//! Component-layer error types.

/// Errors raised while building objects or running component hooks.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A second component of the same concrete type was attached.
    #[error("component '{component}' is already attached to '{object}'")]
    Duplicate {
        component: &'static str,
        object: String,
    },

    /// The component is not attached, or is lifted out of its slot because
    /// one of its own hooks is running.
    #[error("component '{0}' is not available")]
    Missing(&'static str),

    /// A hook failed for a reason owned by another layer (state machine
    /// wiring, resources).
    #[error("{component} hook failed: {source}")]
    Hook {
        component: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ComponentError {
    /// Wrap a foreign error raised inside `component`'s hook.
    pub fn hook(
        component: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Hook {
            component,
            source: source.into(),
        }
    }
}

/// Errors surfaced by a sprite/resource provider.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No sprite is registered under the key.
    #[error("sprite '{0}' not found")]
    NotFound(String),
}
