//! Vellum — field-level lifecycle hooks for headless content documents.
//!
//! A document operation invokes the hooks registered on each field at
//! five well-defined points, threading a context and letting every hook
//! transform the field's value before the operation proceeds:
//!
//! ```text
//! create / update                duplicate                 read
//!       │                            │                       │
//!       │                      beforeDuplicate               │
//!       │                     (or copy fallback)             │
//!       ▼                            │                       ▼
//! beforeValidate ◄───────────────────┘                   afterRead
//!       │
//! beforeChange
//!       │
//!    persist
//!       │
//!  afterChange
//! ```
//!
//! Chains run per field in registration order, strictly sequentially,
//! and fail fast: the first hook error aborts the whole operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde_json::{Value, json};
//! use vellum::operations;
//! use vellum::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> vellum::Result<()> {
//!     let posts = DocumentConfig::collection(
//!         "posts",
//!         vec![
//!             FieldConfig::text("title").before_validate(value_hook("trim", |v| {
//!                 v.and_then(Value::as_str)
//!                     .map(|s| Value::String(s.trim().to_string()))
//!             })),
//!             FieldConfig::text("sku").unique().required(),
//!         ],
//!     );
//!
//!     let req = Arc::new(RequestContext::internal());
//!     let doc = operations::create(&posts, json!({"title": "  Hi ", "sku": "p-1"}), req).await?;
//!     assert_eq!(doc["title"], json!("Hi"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fields;
pub mod hooks;
pub mod operations;
pub mod request;
pub mod testing;

pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{Error, HookError, Result};
    pub use crate::fields::{FieldConfig, FieldHooks, FieldKind, FieldPath, PathSegment};
    pub use crate::hooks::{
        FieldHook, HookContext, HookFuture, HookOwner, HookPoint, Operation, OperationContext,
        hook_fn, run_chain, run_field_hooks, value_hook,
    };
    pub use crate::operations::DocumentConfig;
    pub use crate::request::RequestContext;
}
