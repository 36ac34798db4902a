//! Core hook types and traits.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HookError;
use crate::fields::{FieldConfig, FieldPath};
use crate::request::RequestContext;

/// Lifecycle points of a document field where hooks can be attached.
///
/// For a mutation the points run `BeforeValidate` → `BeforeChange` →
/// persist → `AfterChange`; `AfterRead` runs after any read, and
/// `BeforeDuplicate` runs first when a document is duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before server-side validation of the incoming value.
    BeforeValidate,
    /// After validation, before the value is persisted.
    BeforeChange,
    /// After the document has been persisted.
    AfterChange,
    /// After a document is read, before the value is returned.
    AfterRead,
    /// When a document is duplicated, before anything else runs.
    BeforeDuplicate,
}

/// The document operation a mutation hook is running under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
}

/// Which parent schema owns the field for this invocation.
///
/// Exactly one of collection/global owns a field at a time; the enum
/// makes that invariant structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOwner {
    /// The field belongs to a collection with this slug.
    Collection(String),
    /// The field belongs to a global with this slug.
    Global(String),
}

impl HookOwner {
    /// The owning schema's slug, whichever kind it is.
    pub fn slug(&self) -> &str {
        match self {
            Self::Collection(slug) | Self::Global(slug) => slug,
        }
    }
}

/// Caller-defined state carried between hooks within one operation.
///
/// An explicit mapping owned by the document operation and discarded
/// when it completes; never a process-wide singleton. The hook chain is
/// sequential, so plain `&mut` access suffices and no locking exists.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    entries: serde_json::Map<String, Value>,
}

impl OperationContext {
    /// An empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a previously stored value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Store a value for later hooks in the same operation.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Remove a stored value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Contextual data passed to every hook invocation.
///
/// Every hook receives the same shape; fields irrelevant to a lifecycle
/// point are present but unset. Constructed fresh per document operation
/// and field, and discarded once the operation completes.
#[derive(Debug)]
pub struct HookContext {
    /// The parent schema owning the field.
    pub owner: HookOwner,
    /// Current value of the field. Opaque to the dispatcher.
    pub value: Option<Value>,
    /// The field's value before the current change. Populated only for
    /// `BeforeChange`/`AfterChange`.
    pub previous_value: Option<Value>,
    /// The full incoming or resulting document payload.
    pub data: Value,
    /// Snapshot of the document before the operation applied. `None`
    /// when there is no prior document (create).
    pub original_doc: Option<Value>,
    /// Snapshot fed to `AfterChange` of the document before this change.
    pub previous_doc: Option<Value>,
    /// Data of the fields adjacent to this one at its nesting level.
    pub sibling_data: Option<Value>,
    /// Configs of the fields adjacent to this one at its nesting level.
    pub sibling_fields: Arc<[FieldConfig]>,
    /// Adjacent data from the document before the operation applied.
    pub previous_sibling_doc: Option<Value>,
    /// The mutation being performed. Unset for read-only points.
    pub operation: Option<Operation>,
    /// Structural location including array row indexes.
    pub path: FieldPath,
    /// Structural location without array row indexes.
    pub schema_path: FieldPath,
    /// True only inside `AfterRead` when reading a collection of
    /// documents rather than a single one.
    pub find_many: bool,
    /// Ambient request context, possibly a synthesized stand-in.
    pub req: Arc<RequestContext>,
    /// Caller-defined state shared by all hooks in this operation.
    pub context: OperationContext,
}

/// Trait for implementing field lifecycle hooks.
///
/// Returning `Ok(Some(value))` replaces the field's value for the next
/// hook in the chain; returning `Ok(None)` preserves it (hooks may run
/// purely for side effects). Errors abort the rest of the chain and
/// propagate to the surrounding operation.
#[async_trait]
pub trait FieldHook: Send + Sync {
    /// A name for this hook, used in logs and error messages.
    fn name(&self) -> &str;

    /// Execute the hook.
    async fn run(&self, ctx: &mut HookContext) -> Result<Option<Value>, HookError>;
}

/// Boxed future returned by closure-based hooks.
pub type HookFuture<'a> = BoxFuture<'a, Result<Option<Value>, HookError>>;

struct FnHook<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> FieldHook for FnHook<F>
where
    F: for<'a> Fn(&'a mut HookContext) -> HookFuture<'a> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &mut HookContext) -> Result<Option<Value>, HookError> {
        (self.f)(ctx).await
    }
}

/// Wrap an async function into a [`FieldHook`].
///
/// The function receives the full mutable context, so it can read
/// siblings, stash state in `ctx.context`, or await external I/O.
pub fn hook_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn FieldHook>
where
    F: for<'a> Fn(&'a mut HookContext) -> HookFuture<'a> + Send + Sync + 'static,
{
    Arc::new(FnHook {
        name: name.into(),
        f,
    })
}

struct ValueHook<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F> FieldHook for ValueHook<F>
where
    F: Fn(Option<&Value>) -> Option<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &mut HookContext) -> Result<Option<Value>, HookError> {
        Ok((self.f)(ctx.value.as_ref()))
    }
}

/// Wrap a plain value transform into a [`FieldHook`].
///
/// Covers the common case of a synchronous map over the current value;
/// return `None` to leave the value untouched.
pub fn value_hook<F>(name: impl Into<String>, f: F) -> Arc<dyn FieldHook>
where
    F: Fn(Option<&Value>) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(ValueHook {
        name: name.into(),
        f,
    })
}
