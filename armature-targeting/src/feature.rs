//! Feature definitions and evaluation
//!
//! Ties the audience evaluator and the variant allocator to named features.

use crate::allocation::Allocation;
use crate::allocator::{VariantAllocator, VariantAssignment, VariantAssignmentReason};
use crate::audience::Audience;
use crate::context::{TargetingContext, TargetingContextProvider};
use crate::error::{TargetingError, TargetingResult};
use crate::evaluator::TargetingEvaluator;
use crate::options::TargetingOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Feature definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    /// Feature name
    pub id: String,

    /// Feature description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the feature is switched on at all
    #[serde(default)]
    pub enabled: bool,

    /// Audience restricting who the feature is on for
    #[serde(default)]
    pub audience: Option<Audience>,

    /// Variants of a multi-variant feature
    #[serde(default)]
    pub variants: Vec<VariantDefinition>,

    /// How variants are assigned
    #[serde(default)]
    pub allocation: Option<Allocation>,
}

impl FeatureDefinition {
    /// Create an enabled feature with no audience
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_targeting::{Audience, FeatureDefinition};
    ///
    /// let feature = FeatureDefinition::new("new-ui")
    ///     .with_audience(Audience::new(25.0).with_group("beta", 100.0));
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            enabled: true,
            audience: None,
            variants: Vec::new(),
            allocation: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn with_variant(mut self, variant: VariantDefinition) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_allocation(mut self, allocation: Allocation) -> Self {
        self.allocation = Some(allocation);
        self
    }

    /// Look up a variant by name
    pub fn variant(&self, name: &str) -> Option<&VariantDefinition> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Variant of a multi-variant feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub name: String,

    /// Value handed to the caller when this variant is assigned
    #[serde(default)]
    pub configuration_value: Option<serde_json::Value>,

    /// Overrides the feature's enabled state when this variant is assigned
    #[serde(default)]
    pub status_override: StatusOverride,
}

impl VariantDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configuration_value: None,
            status_override: StatusOverride::None,
        }
    }

    pub fn with_configuration(mut self, value: serde_json::Value) -> Self {
        self.configuration_value = Some(value);
        self
    }

    pub fn with_status_override(mut self, status_override: StatusOverride) -> Self {
        self.status_override = status_override;
        self
    }
}

/// Enabled-state override carried by a variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusOverride {
    #[default]
    None,
    Enabled,
    Disabled,
}

/// Variant served to a caller
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    pub configuration: Option<serde_json::Value>,
    pub reason: VariantAssignmentReason,
}

/// Collection of feature definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default)]
    pub feature_flags: Vec<FeatureDefinition>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: FeatureDefinition) -> Self {
        self.feature_flags.push(feature);
        self
    }

    /// Parse a JSON document of the form `{ "feature_flags": [...] }`
    pub fn from_json(content: &str) -> TargetingResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| TargetingError::parse(format!("JSON parse error: {}", e)))
    }

    /// Parse a TOML document with `[[feature_flags]]` tables
    pub fn from_toml(content: &str) -> TargetingResult<Self> {
        toml::from_str(content)
            .map_err(|e| TargetingError::parse(format!("TOML parse error: {}", e)))
    }
}

/// Evaluates named features for targeting contexts
#[derive(Clone)]
pub struct FeatureManager {
    features: HashMap<String, FeatureDefinition>,
    evaluator: TargetingEvaluator,
    allocator: VariantAllocator,
    provider: Option<Arc<dyn TargetingContextProvider>>,
}

impl FeatureManager {
    /// Create a manager over `features`. Later definitions replace earlier
    /// ones with the same id.
    pub fn new(features: FeatureSet) -> Self {
        let features = features
            .feature_flags
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();

        Self {
            features,
            evaluator: TargetingEvaluator::default(),
            allocator: VariantAllocator::default(),
            provider: None,
        }
    }

    pub fn with_options(mut self, options: TargetingOptions) -> Self {
        self.evaluator = TargetingEvaluator::new(options);
        self.allocator = VariantAllocator::new(options);
        self
    }

    pub fn with_context_provider(mut self, provider: Arc<dyn TargetingContextProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Look up a feature by name
    pub fn feature(&self, name: &str) -> Option<&FeatureDefinition> {
        self.features.get(name)
    }

    /// Names of all known features
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    /// Whether `name` is on, using the configured context provider
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_targeting::*;
    /// use std::sync::Arc;
    ///
    /// # tokio_test::block_on(async {
    /// let features = FeatureSet::new().with_feature(
    ///     FeatureDefinition::new("beta").with_audience(Audience::new(0.0).with_user("Doe")),
    /// );
    /// let provider = StaticContextProvider::new(TargetingContext::for_user("Doe"));
    /// let manager = FeatureManager::new(features).with_context_provider(Arc::new(provider));
    ///
    /// assert!(manager.is_enabled("beta").await.unwrap());
    /// # });
    /// ```
    pub async fn is_enabled(&self, name: &str) -> TargetingResult<bool> {
        let context = self.resolve_context().await?;
        self.is_enabled_for(name, context.as_ref())
    }

    /// Variant of `name`, using the configured context provider
    pub async fn variant(&self, name: &str) -> TargetingResult<Option<Variant>> {
        let context = self.resolve_context().await?;
        self.variant_for(name, context.as_ref())
    }

    /// Whether `name` is on for `context`.
    ///
    /// Unknown features are off. A missing context is evaluated as an
    /// anonymous caller.
    pub fn is_enabled_for(
        &self,
        name: &str,
        context: Option<&TargetingContext>,
    ) -> TargetingResult<bool> {
        let Some(feature) = self.lookup(name) else {
            return Ok(false);
        };

        let mut enabled = self.audience_enabled(feature, context)?;

        if !feature.variants.is_empty()
            && let Some(allocation) = &feature.allocation
        {
            let assignment = self.assignment(feature, allocation, enabled, context)?;
            if let Some(variant) = assignment.and_then(|a| feature.variant(&a.variant)) {
                match variant.status_override {
                    StatusOverride::Enabled => enabled = true,
                    StatusOverride::Disabled => enabled = false,
                    StatusOverride::None => {}
                }
            }
        }

        debug!(feature = %name, enabled, "Feature evaluated");
        Ok(enabled)
    }

    /// Variant of `name` assigned to `context`.
    ///
    /// Disabled features serve `default_when_disabled`; enabled features are
    /// allocated and fall back to `default_when_enabled`.
    pub fn variant_for(
        &self,
        name: &str,
        context: Option<&TargetingContext>,
    ) -> TargetingResult<Option<Variant>> {
        let Some(feature) = self.lookup(name) else {
            return Ok(None);
        };

        let Some(allocation) = &feature.allocation else {
            return Ok(None);
        };

        let enabled = self.audience_enabled(feature, context)?;
        let Some(assignment) = self.assignment(feature, allocation, enabled, context)? else {
            return Ok(None);
        };

        match feature.variant(&assignment.variant) {
            Some(definition) => Ok(Some(Variant {
                name: definition.name.clone(),
                configuration: definition.configuration_value.clone(),
                reason: assignment.reason,
            })),
            None => {
                warn!(
                    feature = %name,
                    variant = %assignment.variant,
                    "Allocated variant is not defined"
                );
                Ok(None)
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<&FeatureDefinition> {
        let feature = self.features.get(name);
        if feature.is_none() {
            warn!(feature = %name, "Feature not found");
        }
        feature
    }

    fn audience_enabled(
        &self,
        feature: &FeatureDefinition,
        context: Option<&TargetingContext>,
    ) -> TargetingResult<bool> {
        let Some(audience) = &feature.audience else {
            return Ok(feature.enabled);
        };

        if !feature.enabled {
            audience.validate()?;
            return Ok(false);
        }

        let anonymous = TargetingContext::default();
        let context = context.unwrap_or(&anonymous);
        self.evaluator.is_targeted(context, audience, &feature.id)
    }

    fn assignment(
        &self,
        feature: &FeatureDefinition,
        allocation: &Allocation,
        enabled: bool,
        context: Option<&TargetingContext>,
    ) -> TargetingResult<Option<VariantAssignment>> {
        if !enabled {
            allocation.validate()?;
            return Ok(allocation.default_when_disabled.as_ref().map(|v| {
                VariantAssignment::new(v, VariantAssignmentReason::DefaultWhenDisabled)
            }));
        }

        let assigned = self.allocator.assign_variant(context, &feature.id, allocation)?;
        Ok(assigned.or_else(|| {
            allocation
                .default_when_enabled
                .as_ref()
                .map(|v| VariantAssignment::new(v, VariantAssignmentReason::DefaultWhenEnabled))
        }))
    }

    async fn resolve_context(&self) -> TargetingResult<Option<TargetingContext>> {
        match &self.provider {
            Some(provider) => provider.context().await.map_err(TargetingError::Context),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for FeatureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureManager")
            .field("features", &self.features.len())
            .field("options", self.evaluator.options())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
