//! Field lifecycle hooks: transform a field's value at well-defined
//! points of a document operation.
//!
//! Five interception points exist per field:
//!
//! - **BeforeValidate** — before server-side validation of incoming data
//! - **BeforeChange** — after validation, before the value is persisted
//! - **AfterChange** — after the document has been persisted
//! - **AfterRead** — after a document is read, before values are returned
//! - **BeforeDuplicate** — when a document is duplicated, before anything
//!   else runs
//!
//! Hooks run in registration order. Each receives the full
//! [`HookContext`] and may replace the field's value by returning
//! `Some(value)`, or leave it untouched by returning `None`. The chain
//! is strictly sequential and fail-fast: the first error aborts the
//! remaining hooks and the surrounding operation.

pub mod dispatcher;
pub mod hook;

pub use dispatcher::{run_chain, run_field_hooks};
pub use hook::{
    FieldHook, HookContext, HookFuture, HookOwner, HookPoint, Operation, OperationContext,
    hook_fn, value_hook,
};
