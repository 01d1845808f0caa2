//! Error Types
//!
//! Every fallible operation in the engine returns one of the enums below.
//! Errors are never swallowed: a failing component render aborts the current
//! scheduling pass, and a failing host operation aborts the commit.

use thiserror::Error;

use crate::fiber::UnitId;

/// Failure reported by a [`Host`](crate::host::Host) implementation.
#[derive(Debug, Error)]
pub enum HostError {
    /// The node handle does not refer to a live host node.
    #[error("unknown host node {0}")]
    UnknownNode(String),

    /// `remove_child` or `insert_before` named a node that is not a child of the parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Debug rendering of the parent handle.
        parent: String,
        /// Debug rendering of the child handle.
        child: String,
    },

    /// The host refused the operation for a host-specific reason.
    #[error("host rejected operation: {0}")]
    Rejected(String),
}

/// Misuse of the hook store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    /// The hook at this cursor position held a different kind of state last render.
    #[error("hook #{index} changed kind between renders (expected state of type `{expected}`)")]
    KindMismatch {
        /// Cursor position of the offending call.
        index: usize,
        /// Type requested by the current call.
        expected: &'static str,
    },

    /// A component called a different number of hooks than on its previous render.
    #[error("hook count changed between renders: {previous} before, {current} now")]
    CountMismatch {
        /// Hooks recorded on the previously committed unit.
        previous: usize,
        /// Hooks recorded during this render.
        current: usize,
    },

    /// A state setter was called while a component was rendering.
    #[error("state updated while rendering `{component}`")]
    UpdateDuringRender {
        /// Label of the component being rendered.
        component: String,
    },
}

/// Error raised while rendering a single work unit.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A host element carried a user attribute named `children`.
    #[error("`children` is reserved for nested content and cannot be set as an attribute on <{tag}>")]
    ReservedAttribute {
        /// Tag of the malformed element.
        tag: String,
    },

    /// A hook was used incorrectly.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// A component reported a failure of its own.
    #[error("component `{component}` failed: {message}")]
    Component {
        /// Name of the failing component.
        component: String,
        /// Human-readable reason.
        message: String,
    },
}

impl RenderError {
    /// Convenience constructor for component-level failures.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Top-level error returned by [`Engine`](crate::engine::Engine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rendering a work unit failed; the pass is left unfinished.
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// The host rejected an operation.
    #[error("host operation failed: {0}")]
    Host(#[from] HostError),

    /// A unit that needed a host ancestor had none.
    #[error("work unit {0} has no host ancestor")]
    DetachedUnit(UnitId),

    /// Engine configuration could not be parsed.
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the engine.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_errors_convert_into_engine_errors() {
        let err: EngineError = RenderError::from(HookError::CountMismatch {
            previous: 2,
            current: 1,
        })
        .into();

        assert!(matches!(
            err,
            EngineError::Render(RenderError::Hook(HookError::CountMismatch { .. }))
        ));
        assert_eq!(
            err.to_string(),
            "render failed: hook count changed between renders: 2 before, 1 now"
        );
    }

    #[test]
    fn component_error_message() {
        let err = RenderError::component("Counter", "negative count");
        assert_eq!(err.to_string(), "component `Counter` failed: negative count");
    }
}
