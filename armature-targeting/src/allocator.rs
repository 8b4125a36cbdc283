//! Variant allocation
//!
//! Picks the variant a context is assigned to. Explicit user assignments win,
//! then group assignments in the context's group order, then the first
//! percentile range containing the user's seeded bucket.

use crate::allocation::Allocation;
use crate::context::TargetingContext;
use crate::error::TargetingResult;
use crate::hasher::StableHasher;
use crate::options::TargetingOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Why a variant was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantAssignmentReason {
    /// No variant was assigned
    None,
    /// The feature was disabled and `default_when_disabled` was served
    DefaultWhenDisabled,
    /// Nothing matched and `default_when_enabled` was served
    DefaultWhenEnabled,
    /// Explicit user assignment
    User,
    /// Explicit group assignment
    Group,
    /// Percentile range
    Percentile,
}

/// Variant chosen by the allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantAssignment {
    pub variant: String,
    pub reason: VariantAssignmentReason,
}

impl VariantAssignment {
    pub fn new(variant: impl Into<String>, reason: VariantAssignmentReason) -> Self {
        Self {
            variant: variant.into(),
            reason,
        }
    }
}

/// Assigns variants from an [`Allocation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantAllocator {
    options: TargetingOptions,
}

impl VariantAllocator {
    pub fn new(options: TargetingOptions) -> Self {
        Self { options }
    }

    /// Assign a variant to `context`.
    ///
    /// Returns `Ok(None)` when there is no context or nothing matched; the
    /// caller decides what default to serve.
    ///
    /// # Errors
    ///
    /// Returns a validation error for percentile bounds outside `[0, 100]`
    /// or with `from > to`, before any bucketing.
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_targeting::{Allocation, TargetingContext, VariantAllocator};
    ///
    /// let allocation = Allocation::new().with_percentile("A", 0.0, 100.0);
    /// let context = TargetingContext::for_user("anyone");
    ///
    /// let assigned = VariantAllocator::default()
    ///     .assign_variant(Some(&context), "checkout", &allocation)
    ///     .unwrap();
    /// assert_eq!(assigned.map(|a| a.variant), Some("A".to_string()));
    /// ```
    pub fn assign_variant(
        &self,
        context: Option<&TargetingContext>,
        feature_name: &str,
        allocation: &Allocation,
    ) -> TargetingResult<Option<VariantAssignment>> {
        allocation.validate()?;

        let Some(context) = context else {
            trace!(feature = %feature_name, "No targeting context, no variant assigned");
            return Ok(None);
        };

        let assignment = self.assign(context, feature_name, allocation);
        debug!(
            feature = %feature_name,
            user = %context.user_id(),
            variant = ?assignment.as_ref().map(|a| a.variant.as_str()),
            reason = ?assignment.as_ref().map(|a| a.reason),
            "Variant allocated"
        );

        Ok(assignment)
    }

    fn assign(
        &self,
        context: &TargetingContext,
        feature_name: &str,
        allocation: &Allocation,
    ) -> Option<VariantAssignment> {
        if let Some(user) = context.user_id.as_deref() {
            let user = self.options.normalize(user);
            let matched = allocation.users.iter().find(|entry| {
                entry
                    .users
                    .iter()
                    .any(|candidate| self.options.matches_normalized(candidate, &user))
            });

            if let Some(entry) = matched {
                return Some(VariantAssignment::new(
                    &entry.variant,
                    VariantAssignmentReason::User,
                ));
            }
        }

        for group in &context.groups {
            let group = self.options.normalize(group);
            let matched = allocation.groups.iter().find(|entry| {
                entry
                    .groups
                    .iter()
                    .any(|candidate| self.options.matches_normalized(candidate, &group))
            });

            if let Some(entry) = matched {
                return Some(VariantAssignment::new(
                    &entry.variant,
                    VariantAssignmentReason::Group,
                ));
            }
        }

        if allocation.percentiles.is_empty() {
            return None;
        }

        let seed = allocation.seed.as_deref().unwrap_or(feature_name);
        let user = self.options.normalize(context.user_id());
        let percentile = StableHasher::keyed_percentage(seed, &user);
        trace!(feature = %feature_name, percentile, "Percentile bucket");

        allocation
            .percentiles
            .iter()
            .find(|entry| entry.contains(percentile))
            .map(|entry| VariantAssignment::new(&entry.variant, VariantAssignmentReason::Percentile))
    }
}
