//! In-memory document operations driving the field hook lifecycle.
//!
//! This is the in-repo stand-in for the surrounding document operation
//! engine: it walks a document payload against the configured fields,
//! builds a fresh context per field, and feeds each dispatcher result
//! forward. Mutations run the points in order `BeforeValidate` →
//! `BeforeChange` → persist → `AfterChange`; `AfterRead` runs after any
//! read; duplication runs `BeforeDuplicate` first and then the create
//! pipeline on its output.
//!
//! In-memory only: no persistence and no wire surface. Operations build
//! a fresh output document and return it only on full success, so a
//! failing hook leaves nothing partially committed.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::{OperationError, Result};
use crate::fields::{FieldConfig, FieldKind, FieldPath};
use crate::hooks::{
    HookContext, HookOwner, HookPoint, Operation, OperationContext, run_field_hooks,
};
use crate::request::RequestContext;

type JsonMap = Map<String, Value>;

/// The owner and fields of one document shape.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Which parent schema owns these fields.
    pub owner: HookOwner,
    /// Top-level fields, in declaration order.
    pub fields: Arc<[FieldConfig]>,
}

impl DocumentConfig {
    /// A document shape owned by a collection.
    pub fn collection(slug: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self {
            owner: HookOwner::Collection(slug.into()),
            fields: fields.into(),
        }
    }

    /// A document shape owned by a global.
    pub fn global(slug: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self {
            owner: HookOwner::Global(slug.into()),
            fields: fields.into(),
        }
    }
}

/// Create a document: `beforeValidate` → `beforeChange` → persist →
/// `afterChange`. Returns the document as shaped by `afterChange`.
pub async fn create(
    config: &DocumentConfig,
    data: Value,
    req: Arc<RequestContext>,
) -> Result<Value> {
    let payload = into_object(data, "create")?;
    let mut op_ctx = OperationContext::new();
    let doc = create_pipeline(config, payload, &req, &mut op_ctx).await?;
    Ok(Value::Object(doc))
}

/// Update a document with a partial patch. Fields absent from the patch
/// fall back to their original value before the chains run;
/// `previous_value` and the document snapshots come from `original`.
pub async fn update(
    config: &DocumentConfig,
    original: &Value,
    patch: Value,
    req: Arc<RequestContext>,
) -> Result<Value> {
    let original_map = as_object(original, "update")?;
    let patch_map = into_object(patch, "update")?;
    let merged = merge_objects(original_map.clone(), patch_map);

    let mut op_ctx = OperationContext::new();
    let op = Some(Operation::Update);
    let validated = run_phase(
        config,
        HookPoint::BeforeValidate,
        op,
        merged,
        Some(original_map),
        &req,
        &mut op_ctx,
        false,
    )
    .await?;
    let persisted = run_phase(
        config,
        HookPoint::BeforeChange,
        op,
        validated,
        Some(original_map),
        &req,
        &mut op_ctx,
        false,
    )
    .await?;
    let shaped = run_phase(
        config,
        HookPoint::AfterChange,
        op,
        persisted,
        Some(original_map),
        &req,
        &mut op_ctx,
        false,
    )
    .await?;
    Ok(Value::Object(shaped))
}

/// Read a single document: `afterRead` per field, `find_many` false.
pub async fn read(config: &DocumentConfig, doc: &Value, req: Arc<RequestContext>) -> Result<Value> {
    let map = as_object(doc, "read")?;
    let mut op_ctx = OperationContext::new();
    let shaped = run_phase(
        config,
        HookPoint::AfterRead,
        None,
        map.clone(),
        None,
        &req,
        &mut op_ctx,
        false,
    )
    .await?;
    Ok(Value::Object(shaped))
}

/// Read a set of documents: `afterRead` per field with `find_many` true.
/// Each document is its own operation with its own context carrier.
pub async fn read_many(
    config: &DocumentConfig,
    docs: &[Value],
    req: Arc<RequestContext>,
) -> Result<Vec<Value>> {
    let mut shaped = Vec::with_capacity(docs.len());
    for doc in docs {
        let map = as_object(doc, "read")?;
        let mut op_ctx = OperationContext::new();
        let out = run_phase(
            config,
            HookPoint::AfterRead,
            None,
            map.clone(),
            None,
            &req,
            &mut op_ctx,
            true,
        )
        .await?;
        shaped.push(Value::Object(out));
    }
    Ok(shaped)
}

/// Duplicate a document: `beforeDuplicate` (or the unique+required copy
/// fallback) produces the incoming payload for the new document, then
/// the full create pipeline runs on it. One context carrier spans the
/// whole operation.
pub async fn duplicate(
    config: &DocumentConfig,
    original: &Value,
    req: Arc<RequestContext>,
) -> Result<Value> {
    let original_map = as_object(original, "duplicate")?;
    let mut op_ctx = OperationContext::new();

    let seeded = run_phase(
        config,
        HookPoint::BeforeDuplicate,
        Some(Operation::Create),
        original_map.clone(),
        Some(original_map),
        &req,
        &mut op_ctx,
        false,
    )
    .await?;

    let doc = create_pipeline(config, seeded, &req, &mut op_ctx).await?;
    Ok(Value::Object(doc))
}

async fn create_pipeline(
    config: &DocumentConfig,
    payload: JsonMap,
    req: &Arc<RequestContext>,
    op_ctx: &mut OperationContext,
) -> Result<JsonMap> {
    let op = Some(Operation::Create);
    let validated = run_phase(
        config,
        HookPoint::BeforeValidate,
        op,
        payload,
        None,
        req,
        op_ctx,
        false,
    )
    .await?;
    let persisted = run_phase(
        config,
        HookPoint::BeforeChange,
        op,
        validated,
        None,
        req,
        op_ctx,
        false,
    )
    .await?;
    // `persisted` is the stored document; afterChange shapes what the
    // operation returns.
    run_phase(
        config,
        HookPoint::AfterChange,
        op,
        persisted,
        None,
        req,
        op_ctx,
        false,
    )
    .await
}

/// Everything about the current phase that stays fixed while walking
/// one document.
struct PhaseEnv {
    owner: HookOwner,
    point: HookPoint,
    operation: Option<Operation>,
    find_many: bool,
    req: Arc<RequestContext>,
    data_root: Value,
    original_doc: Option<Value>,
    previous_doc: Option<Value>,
}

#[allow(clippy::too_many_arguments)]
async fn run_phase(
    config: &DocumentConfig,
    point: HookPoint,
    operation: Option<Operation>,
    payload: JsonMap,
    original: Option<&JsonMap>,
    req: &Arc<RequestContext>,
    op_ctx: &mut OperationContext,
    find_many: bool,
) -> Result<JsonMap> {
    let original_doc = original.map(|m| Value::Object(m.clone()));
    let env = PhaseEnv {
        owner: config.owner.clone(),
        point,
        operation,
        find_many,
        req: Arc::clone(req),
        data_root: Value::Object(payload.clone()),
        previous_doc: original_doc.clone(),
        original_doc,
    };
    apply_level(
        &env,
        Arc::clone(&config.fields),
        payload,
        original,
        FieldPath::root(),
        FieldPath::root(),
        op_ctx,
    )
    .await
}

/// Apply one lifecycle point to every field at one nesting level,
/// descending into groups and array rows. Fields run in declaration
/// order; the context carrier is threaded through every invocation.
fn apply_level<'a>(
    env: &'a PhaseEnv,
    fields: Arc<[FieldConfig]>,
    level: JsonMap,
    previous_level: Option<&'a JsonMap>,
    path: FieldPath,
    schema_path: FieldPath,
    op_ctx: &'a mut OperationContext,
) -> BoxFuture<'a, Result<JsonMap>> {
    Box::pin(async move {
        let mut level = level;

        for field in fields.iter() {
            let field_path = path.child(&field.name);
            let field_schema_path = schema_path.child(&field.name);

            let with_previous = matches!(
                env.point,
                HookPoint::BeforeChange | HookPoint::AfterChange
            );
            let previous_value = if with_previous {
                previous_level.and_then(|m| m.get(&field.name)).cloned()
            } else {
                None
            };

            let mut ctx = HookContext {
                owner: env.owner.clone(),
                value: level.get(&field.name).cloned(),
                previous_value,
                data: env.data_root.clone(),
                original_doc: env.original_doc.clone(),
                previous_doc: env.previous_doc.clone(),
                sibling_data: Some(Value::Object(level.clone())),
                sibling_fields: Arc::clone(&fields),
                previous_sibling_doc: previous_level.map(|m| Value::Object(m.clone())),
                operation: env.operation,
                path: field_path.clone(),
                schema_path: field_schema_path.clone(),
                find_many: env.find_many,
                req: Arc::clone(&env.req),
                context: std::mem::take(op_ctx),
            };

            let outcome = run_field_hooks(field, env.point, &mut ctx).await;
            *op_ctx = std::mem::take(&mut ctx.context);
            match outcome? {
                Some(value) => {
                    level.insert(field.name.clone(), value);
                }
                None => {
                    level.remove(&field.name);
                }
            }

            // Descend into nested structures with whatever the hooks
            // produced at this level.
            match &field.kind {
                FieldKind::Group(nested) => {
                    if let Some(Value::Object(group_data)) = level.get(&field.name).cloned() {
                        let previous_group = previous_level
                            .and_then(|m| m.get(&field.name))
                            .and_then(Value::as_object);
                        let walked = apply_level(
                            env,
                            Arc::clone(nested),
                            group_data,
                            previous_group,
                            field_path.clone(),
                            field_schema_path.clone(),
                            &mut *op_ctx,
                        )
                        .await?;
                        level.insert(field.name.clone(), Value::Object(walked));
                    }
                }
                FieldKind::Array(nested) => {
                    if let Some(Value::Array(rows)) = level.get(&field.name).cloned() {
                        let previous_rows = previous_level
                            .and_then(|m| m.get(&field.name))
                            .and_then(Value::as_array);
                        let mut walked_rows = Vec::with_capacity(rows.len());
                        for (index, row) in rows.into_iter().enumerate() {
                            match row {
                                Value::Object(row_data) => {
                                    let previous_row = previous_rows
                                        .and_then(|r| r.get(index))
                                        .and_then(Value::as_object);
                                    let walked = apply_level(
                                        env,
                                        Arc::clone(nested),
                                        row_data,
                                        previous_row,
                                        field_path.row(index),
                                        field_schema_path.clone(),
                                        &mut *op_ctx,
                                    )
                                    .await?;
                                    walked_rows.push(Value::Object(walked));
                                }
                                // Mis-shaped rows are the validation
                                // layer's problem; pass them through.
                                other => walked_rows.push(other),
                            }
                        }
                        level.insert(field.name.clone(), Value::Array(walked_rows));
                    }
                }
                FieldKind::Text | FieldKind::Number | FieldKind::Checkbox => {}
            }
        }

        Ok(level)
    })
}

fn as_object<'v>(
    doc: &'v Value,
    operation: &'static str,
) -> std::result::Result<&'v JsonMap, OperationError> {
    doc.as_object().ok_or(OperationError::NonObjectDocument {
        operation,
        found: json_type_name(doc),
    })
}

fn into_object(doc: Value, operation: &'static str) -> std::result::Result<JsonMap, OperationError> {
    match doc {
        Value::Object(map) => Ok(map),
        other => Err(OperationError::NonObjectDocument {
            operation,
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deep-merge `patch` over `base`: objects merge recursively, anything
/// else in the patch replaces the base value.
fn merge_objects(mut base: JsonMap, patch: JsonMap) -> JsonMap {
    for (key, incoming) in patch {
        match (base.remove(&key), incoming) {
            (Some(Value::Object(prev)), Value::Object(next)) => {
                base.insert(key, Value::Object(merge_objects(prev, next)));
            }
            (_, incoming) => {
                base.insert(key, incoming);
            }
        }
    }
    base
}
