//! Targeting context
//!
//! The identity a decision is made for, and the provider trait used to obtain
//! it at call time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity and group memberships of the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingContext {
    /// User id, if the caller is identified
    pub user_id: Option<String>,

    /// Groups the caller belongs to, in priority order
    pub groups: Vec<String>,
}

impl TargetingContext {
    /// Create an anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::new().with_user_id(user_id)
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// User id, or the empty string for anonymous callers
    pub fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or("")
    }
}

/// Error type returned by context providers
pub type ContextError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies the targeting context for the current call
///
/// Implementations may read request-local state, a session store, or any
/// other source. `Ok(None)` means no context is available, which is a normal
/// condition (for example a background job with no authenticated user).
#[async_trait]
pub trait TargetingContextProvider: Send + Sync {
    /// Resolve the current context
    async fn context(&self) -> Result<Option<TargetingContext>, ContextError>;
}

/// Provider that always returns the same context
#[derive(Debug, Clone, Default)]
pub struct StaticContextProvider {
    context: Option<TargetingContext>,
}

impl StaticContextProvider {
    pub fn new(context: TargetingContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Provider with no context
    pub fn empty() -> Self {
        Self { context: None }
    }
}

#[async_trait]
impl TargetingContextProvider for StaticContextProvider {
    async fn context(&self) -> Result<Option<TargetingContext>, ContextError> {
        Ok(self.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_context() {
        let context = TargetingContext::new();

        assert_eq!(context.user_id(), "");
        assert!(context.groups.is_empty());
    }

    #[test]
    fn test_builder() {
        let context = TargetingContext::for_user("alice")
            .with_group("beta")
            .with_groups(["ring0", "ring1"]);

        assert_eq!(context.user_id(), "alice");
        assert_eq!(context.groups, vec!["beta", "ring0", "ring1"]);
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticContextProvider::new(TargetingContext::for_user("bob"));
        let context = provider.context().await.unwrap();

        assert_eq!(context.unwrap().user_id(), "bob");
        assert!(StaticContextProvider::empty().context().await.unwrap().is_none());
    }
}
