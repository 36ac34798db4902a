//! Error types for Vellum.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),
}

/// Hook execution errors.
///
/// A failing callback aborts the rest of its chain and surfaces here
/// unchanged. The dispatcher never retries and never continues a chain
/// past a failure.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Hook {hook} failed: {reason}")]
    Callback { hook: String, reason: String },
}

impl HookError {
    /// Build a callback failure from any displayable reason.
    pub fn callback(hook: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Callback {
            hook: hook.into(),
            reason: reason.to_string(),
        }
    }
}

/// Document operation errors.
///
/// These come from the operation harness, not from hooks. A callback
/// returning a value of an unexpected shape is *not* an error here:
/// shape checking belongs to the schema/validation layer downstream.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("{operation} expects a JSON object document, found {found}")]
    NonObjectDocument {
        operation: &'static str,
        found: &'static str,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
