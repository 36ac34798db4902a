//! Field model: per-field configuration and hook registration.
//!
//! This is registration surface for the dispatcher, not a schema engine.
//! A [`FieldConfig`] carries a name, a kind, the `unique`/`required`
//! flags the duplicate fallback consults, and the five ordered hook
//! chains. `Group` and `Array` kinds nest further fields, which is what
//! makes `path` and `schema_path` diverge: array row indexes appear in
//! `path` only.

use std::fmt;
use std::sync::Arc;

use crate::hooks::{FieldHook, HookPoint};

/// One segment of a field's structural location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field.
    Key(String),
    /// An array row index. Never appears in `schema_path`.
    Index(usize),
}

/// Structural location of a field within a document.
///
/// Displays dot-joined, e.g. `items.0.sku`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The document root (empty path).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Extend with a named field segment.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        Self(segments)
    }

    /// Extend with an array row index.
    pub fn row(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// The raw segments.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Key(name) => write!(f, "{name}")?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// What kind of value a field holds.
///
/// The dispatcher itself stays value-type-agnostic; kinds exist so the
/// operation harness knows where to descend into nested fields.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A string value.
    Text,
    /// A numeric value.
    Number,
    /// A boolean value.
    Checkbox,
    /// A nested object of named fields. Extends `path` and `schema_path`.
    Group(Arc<[FieldConfig]>),
    /// Rows of nested fields. Row indexes extend `path` only.
    Array(Arc<[FieldConfig]>),
}

/// The ordered hook chains registered for one field.
///
/// Chains run in registration order; there is no priority and no
/// reordering.
#[derive(Default)]
pub struct FieldHooks {
    pub before_validate: Vec<Arc<dyn FieldHook>>,
    pub before_change: Vec<Arc<dyn FieldHook>>,
    pub after_change: Vec<Arc<dyn FieldHook>>,
    pub after_read: Vec<Arc<dyn FieldHook>>,
    pub before_duplicate: Vec<Arc<dyn FieldHook>>,
}

impl FieldHooks {
    /// The chain registered for a lifecycle point.
    pub fn chain(&self, point: HookPoint) -> &[Arc<dyn FieldHook>] {
        match point {
            HookPoint::BeforeValidate => &self.before_validate,
            HookPoint::BeforeChange => &self.before_change,
            HookPoint::AfterChange => &self.after_change,
            HookPoint::AfterRead => &self.after_read,
            HookPoint::BeforeDuplicate => &self.before_duplicate,
        }
    }

    /// Whether no hooks are registered at any point.
    pub fn is_empty(&self) -> bool {
        self.before_validate.is_empty()
            && self.before_change.is_empty()
            && self.after_change.is_empty()
            && self.after_read.is_empty()
            && self.before_duplicate.is_empty()
    }
}

impl fmt::Debug for FieldHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHooks")
            .field("before_validate", &self.before_validate.len())
            .field("before_change", &self.before_change.len())
            .field("after_change", &self.after_change.len())
            .field("after_read", &self.after_read.len())
            .field("before_duplicate", &self.before_duplicate.len())
            .finish()
    }
}

/// Configuration for a single document field.
pub struct FieldConfig {
    /// Field name within its level of the document.
    pub name: String,
    /// Value kind, including nesting for groups and arrays.
    pub kind: FieldKind,
    /// Whether values must be unique across documents. Consulted by the
    /// `beforeDuplicate` fallback.
    pub unique: bool,
    /// Whether a value is required. Consulted by the `beforeDuplicate`
    /// fallback.
    pub required: bool,
    /// The registered hook chains.
    pub hooks: FieldHooks,
}

impl FieldConfig {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            unique: false,
            required: false,
            hooks: FieldHooks::default(),
        }
    }

    /// A string field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A numeric field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// A boolean field.
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Checkbox)
    }

    /// A nested object of named fields.
    pub fn group(name: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self::new(name, FieldKind::Group(fields.into()))
    }

    /// Rows of nested fields.
    pub fn array(name: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self::new(name, FieldKind::Array(fields.into()))
    }

    /// Mark values as unique across documents.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark a value as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Append a hook to the `beforeValidate` chain.
    pub fn before_validate(mut self, hook: Arc<dyn FieldHook>) -> Self {
        self.hooks.before_validate.push(hook);
        self
    }

    /// Append a hook to the `beforeChange` chain.
    pub fn before_change(mut self, hook: Arc<dyn FieldHook>) -> Self {
        self.hooks.before_change.push(hook);
        self
    }

    /// Append a hook to the `afterChange` chain.
    pub fn after_change(mut self, hook: Arc<dyn FieldHook>) -> Self {
        self.hooks.after_change.push(hook);
        self
    }

    /// Append a hook to the `afterRead` chain.
    pub fn after_read(mut self, hook: Arc<dyn FieldHook>) -> Self {
        self.hooks.after_read.push(hook);
        self
    }

    /// Append a hook to the `beforeDuplicate` chain.
    pub fn before_duplicate(mut self, hook: Arc<dyn FieldHook>) -> Self {
        self.hooks.before_duplicate.push(hook);
        self
    }

    /// Nested field configs for `Group` and `Array` kinds.
    pub fn nested(&self) -> Option<&Arc<[FieldConfig]>> {
        match &self.kind {
            FieldKind::Group(fields) | FieldKind::Array(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("unique", &self.unique)
            .field("required", &self.required)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::value_hook;

    #[test]
    fn test_path_display() {
        let path = FieldPath::root().child("items").row(2).child("sku");
        assert_eq!(path.to_string(), "items.2.sku");
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_chain_lookup_per_point() {
        let field = FieldConfig::text("title")
            .before_validate(value_hook("a", |v| v.cloned()))
            .before_validate(value_hook("b", |v| v.cloned()))
            .after_read(value_hook("c", |v| v.cloned()));

        assert_eq!(field.hooks.chain(HookPoint::BeforeValidate).len(), 2);
        assert_eq!(field.hooks.chain(HookPoint::AfterRead).len(), 1);
        assert_eq!(field.hooks.chain(HookPoint::BeforeChange).len(), 0);
        assert!(!field.hooks.is_empty());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let field = FieldConfig::text("title")
            .before_change(value_hook("first", |v| v.cloned()))
            .before_change(value_hook("second", |v| v.cloned()));

        let names: Vec<&str> = field
            .hooks
            .chain(HookPoint::BeforeChange)
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_nested_configs() {
        let field = FieldConfig::group("meta", vec![FieldConfig::text("keywords")]);
        assert_eq!(field.nested().unwrap().len(), 1);
        assert!(FieldConfig::text("title").nested().is_none());
    }
}
