//! Ambient request context threaded into hook invocations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Where a document operation originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOrigin {
    /// A real inbound network request.
    Network,
    /// A synthesized stand-in for operations invoked outside a request
    /// (seeding scripts, background jobs, tests).
    Internal,
}

/// Ambient request/operation context handed to every hook as `req`.
///
/// Hooks treat this as read-only. When a document operation runs outside
/// a network request, [`RequestContext::internal`] provides a stand-in
/// with the same shape.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Unique ID for this request, stable across the whole operation.
    pub id: Uuid,
    /// The authenticated user, if any. Opaque to the dispatcher.
    pub user: Option<Value>,
    /// Requested locale, if any.
    pub locale: Option<String>,
    /// When the request was received (or synthesized).
    pub received_at: DateTime<Utc>,
    /// Where the operation originated.
    pub origin: RequestOrigin,
}

impl RequestContext {
    /// Context for a real inbound request.
    pub fn new() -> Self {
        Self::with_origin(RequestOrigin::Network)
    }

    /// Synthesized stand-in for operations invoked outside a request.
    pub fn internal() -> Self {
        Self::with_origin(RequestOrigin::Internal)
    }

    fn with_origin(origin: RequestOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: None,
            locale: None,
            received_at: Utc::now(),
            origin,
        }
    }

    /// Attach the authenticated user.
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    /// Attach the requested locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Whether this context was synthesized outside a network request.
    pub fn is_internal(&self) -> bool {
        self.origin == RequestOrigin::Internal
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_is_flagged() {
        assert!(RequestContext::internal().is_internal());
        assert!(!RequestContext::new().is_internal());
    }

    #[test]
    fn test_builder_helpers() {
        let req = RequestContext::internal()
            .with_user(serde_json::json!({"id": "u1"}))
            .with_locale("en");
        assert_eq!(req.locale.as_deref(), Some("en"));
        assert!(req.user.is_some());
    }
}
