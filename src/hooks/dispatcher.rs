//! Sequential execution of a field's hook chain.

use std::sync::Arc;

use serde_json::Value;

use crate::error::HookError;
use crate::fields::FieldConfig;
use crate::hooks::hook::{FieldHook, HookContext, HookPoint};

/// Run one field's chain for a lifecycle point.
///
/// Picks the chain registered on the field for `point` and runs it via
/// [`run_chain`]. When the point is `BeforeDuplicate` and no hook is
/// registered, a unique+required field gets the default copy suffix so
/// the duplicate does not collide; registering any `BeforeDuplicate`
/// hook disables the default entirely.
pub async fn run_field_hooks(
    field: &FieldConfig,
    point: HookPoint,
    ctx: &mut HookContext,
) -> Result<Option<Value>, HookError> {
    let chain = field.hooks.chain(point);

    if chain.is_empty() {
        if point == HookPoint::BeforeDuplicate && field.unique && field.required {
            // Only string values can carry the suffix; anything else is
            // the schema layer's collision to resolve.
            if let Some(Value::String(original)) = ctx.value.as_ref() {
                let fallback = format!("{original} - Copy");
                tracing::debug!(
                    field = %field.name,
                    "no beforeDuplicate hook registered, applying copy suffix"
                );
                ctx.value = Some(Value::String(fallback));
            }
        }
        return Ok(ctx.value.clone());
    }

    run_chain(chain, ctx).await
}

/// Run an ordered hook chain against one context.
///
/// Hooks execute strictly in sequence: hook *n+1* is not invoked until
/// hook *n*'s future settles, because later hooks may depend on earlier
/// transformations. A returned `Some(value)` replaces `ctx.value` for
/// the next hook; `None` preserves it. The first error aborts the rest
/// of the chain and propagates unchanged — no partial application.
pub async fn run_chain(
    chain: &[Arc<dyn FieldHook>],
    ctx: &mut HookContext,
) -> Result<Option<Value>, HookError> {
    for hook in chain {
        match hook.run(ctx).await? {
            Some(value) => {
                tracing::debug!(hook = hook.name(), path = %ctx.path, "hook replaced field value");
                ctx.value = Some(value);
            }
            None => {
                // Side-effect-only hook, value preserved.
            }
        }
    }

    Ok(ctx.value.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::fields::FieldConfig;
    use crate::hooks::hook::{HookFuture, hook_fn, value_hook};
    use crate::testing::{ContextBuilder, FailingHook, RecordingHook};

    #[tokio::test]
    async fn test_empty_chain_preserves_value() {
        let mut ctx = ContextBuilder::new().value(json!("hello")).build();
        let out = run_chain(&[], &mut ctx).await.unwrap();
        assert_eq!(out, Some(json!("hello")));
    }

    #[tokio::test]
    async fn test_chain_composes_left_to_right() {
        let chain = vec![
            value_hook("trim", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(s.trim().to_string()))
            }),
            value_hook("lowercase", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(s.to_lowercase()))
            }),
        ];

        let mut ctx = ContextBuilder::new().value(json!("  Alice ")).build();
        let out = run_chain(&chain, &mut ctx).await.unwrap();
        assert_eq!(out, Some(json!("alice")));
    }

    #[tokio::test]
    async fn test_none_return_preserves_value() {
        // First hook runs only for side effects; second reads the
        // preserved value and appends.
        let chain = vec![
            value_hook("noop", |_| None),
            value_hook("bang", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(format!("{s}!")))
            }),
        ];

        let mut ctx = ContextBuilder::new().value(json!("hi")).build();
        let out = run_chain(&chain, &mut ctx).await.unwrap();
        assert_eq!(out, Some(json!("hi!")));
    }

    #[tokio::test]
    async fn test_error_aborts_rest_of_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Vec<Arc<dyn FieldHook>> = vec![
            Arc::new(RecordingHook::new("first", Arc::clone(&log))),
            Arc::new(FailingHook::new("boom", "lookup failed")),
            Arc::new(RecordingHook::new("never", Arc::clone(&log))),
        ];

        let mut ctx = ContextBuilder::new().value(json!("x")).build();
        let err = run_chain(&chain, &mut ctx).await.unwrap_err();

        match err {
            HookError::Callback { hook, reason } => {
                assert_eq!(hook, "boom");
                assert_eq!(reason, "lookup failed");
            }
        }
        assert_eq!(*log.lock().unwrap(), vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_order_is_deterministic_across_runs() {
        let chain = vec![
            value_hook("a", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(format!("{s}-A")))
            }),
            value_hook("b", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(format!("{s}-B")))
            }),
        ];

        for _ in 0..3 {
            let mut ctx = ContextBuilder::new().value(json!("seed")).build();
            let out = run_chain(&chain, &mut ctx).await.unwrap();
            assert_eq!(out, Some(json!("seed-A-B")));
        }
    }

    fn bang(ctx: &mut HookContext) -> HookFuture<'_> {
        Box::pin(async move {
            let next = ctx
                .value
                .as_ref()
                .and_then(Value::as_str)
                .map(|s| Value::String(format!("{s}!")));
            Ok(next)
        })
    }

    #[tokio::test]
    async fn test_async_hook_fn_adapter() {
        let chain = vec![hook_fn("bang", bang)];
        let mut ctx = ContextBuilder::new().value(json!("async")).build();
        let out = run_chain(&chain, &mut ctx).await.unwrap();
        assert_eq!(out, Some(json!("async!")));
    }

    #[tokio::test]
    async fn test_duplicate_fallback_appends_copy_suffix() {
        let field = FieldConfig::text("sku").unique().required();
        let mut ctx = ContextBuilder::new().value(json!("sku-1")).build();

        let out = run_field_hooks(&field, HookPoint::BeforeDuplicate, &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, Some(json!("sku-1 - Copy")));
    }

    #[tokio::test]
    async fn test_duplicate_fallback_needs_unique_and_required() {
        let unique_only = FieldConfig::text("sku").unique();
        let mut ctx = ContextBuilder::new().value(json!("sku-1")).build();
        let out = run_field_hooks(&unique_only, HookPoint::BeforeDuplicate, &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, Some(json!("sku-1")));

        let required_only = FieldConfig::text("sku").required();
        let mut ctx = ContextBuilder::new().value(json!("sku-1")).build();
        let out = run_field_hooks(&required_only, HookPoint::BeforeDuplicate, &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, Some(json!("sku-1")));
    }

    #[tokio::test]
    async fn test_duplicate_fallback_leaves_non_strings_alone() {
        let field = FieldConfig::number("serial").unique().required();
        let mut ctx = ContextBuilder::new().value(json!(42)).build();
        let out = run_field_hooks(&field, HookPoint::BeforeDuplicate, &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, Some(json!(42)));
    }

    #[tokio::test]
    async fn test_registered_duplicate_hook_disables_fallback() {
        let field = FieldConfig::number("counter").unique().required().before_duplicate(
            value_hook("increment", |v| {
                Some(json!(v.and_then(Value::as_i64).unwrap_or(0) + 1))
            }),
        );

        let mut ctx = ContextBuilder::new().value(json!(5)).build();
        let out = run_field_hooks(&field, HookPoint::BeforeDuplicate, &mut ctx)
            .await
            .unwrap();
        assert_eq!(out, Some(json!(6)));
    }

    #[tokio::test]
    async fn test_chain_order_on_field_chains() {
        let field = FieldConfig::text("title")
            .before_validate(value_hook("upper", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(s.to_uppercase()))
            }))
            .before_validate(value_hook("bang", |v| {
                v.and_then(Value::as_str)
                    .map(|s| Value::String(format!("{s}!")))
            }));

        let mut ctx = ContextBuilder::new().value(json!("hi")).build();
        let out = run_field_hooks(&field, HookPoint::BeforeValidate, &mut ctx)
            .await
            .unwrap();
        // Registration order: uppercase first, then the suffix.
        assert_eq!(out, Some(json!("HI!")));
    }
}
