//! Test helpers for exercising hook chains without a full schema.
//!
//! Provides:
//! - [`ContextBuilder`]: builds a [`HookContext`] with sensible defaults
//! - [`RecordingHook`]: records its invocations into a shared log
//! - [`FailingHook`]: always fails, for abort-path tests
//!
//! Use these in tests instead of creating ad-hoc stub implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HookError;
use crate::fields::{FieldConfig, FieldPath};
use crate::hooks::{FieldHook, HookContext, HookOwner, Operation, OperationContext};
use crate::request::RequestContext;

/// A hook that records its name into a shared log and leaves the value
/// untouched.
pub struct RecordingHook {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingHook {
    /// Record invocations of `name` into `log`.
    pub fn new(name: impl Into<String>, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }
}

#[async_trait]
impl FieldHook for RecordingHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &mut HookContext) -> Result<Option<Value>, HookError> {
        self.log.lock().expect("log poisoned").push(self.name.clone());
        Ok(None)
    }
}

/// A hook that always fails with a callback error.
pub struct FailingHook {
    name: String,
    reason: String,
}

impl FailingHook {
    /// Fail with the given reason every time.
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl FieldHook for FailingHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &mut HookContext) -> Result<Option<Value>, HookError> {
        Err(HookError::callback(&self.name, &self.reason))
    }
}

/// Builder for a [`HookContext`] with test defaults: a collection owner,
/// a synthesized internal request, empty siblings, root paths.
pub struct ContextBuilder {
    owner: HookOwner,
    value: Option<Value>,
    previous_value: Option<Value>,
    data: Value,
    operation: Option<Operation>,
    find_many: bool,
    req: Arc<RequestContext>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            owner: HookOwner::Collection("posts".to_string()),
            value: None,
            previous_value: None,
            data: Value::Null,
            operation: None,
            find_many: false,
            req: Arc::new(RequestContext::internal()),
        }
    }

    pub fn owner(mut self, owner: HookOwner) -> Self {
        self.owner = owner;
        self
    }

    pub fn value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn previous_value(mut self, value: Value) -> Self {
        self.previous_value = Some(value);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn find_many(mut self, find_many: bool) -> Self {
        self.find_many = find_many;
        self
    }

    pub fn req(mut self, req: Arc<RequestContext>) -> Self {
        self.req = req;
        self
    }

    pub fn build(self) -> HookContext {
        HookContext {
            owner: self.owner,
            value: self.value,
            previous_value: self.previous_value,
            data: self.data,
            original_doc: None,
            previous_doc: None,
            sibling_data: None,
            sibling_fields: Vec::<FieldConfig>::new().into(),
            previous_sibling_doc: None,
            operation: self.operation,
            path: FieldPath::root(),
            schema_path: FieldPath::root(),
            find_many: self.find_many,
            req: self.req,
            context: OperationContext::new(),
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
