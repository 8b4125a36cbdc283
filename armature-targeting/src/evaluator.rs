//! Audience targeting
//!
//! Decides whether a context belongs to a feature's audience. Rules are
//! applied in a fixed order and the first decisive rule wins:
//!
//! 1. exclusion (user or any group) → not targeted
//! 2. explicit user → targeted
//! 3. group rollouts, in declared order → targeted if the group's bucket is
//!    below its percentage
//! 4. default rollout on the user's bucket
//!
//! Validation runs over the entire audience before any rule is applied.

use crate::audience::Audience;
use crate::context::TargetingContext;
use crate::error::TargetingResult;
use crate::hasher::StableHasher;
use crate::options::TargetingOptions;
use tracing::{debug, trace};

/// Evaluates audiences against targeting contexts
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetingEvaluator {
    options: TargetingOptions,
}

impl TargetingEvaluator {
    pub fn new(options: TargetingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TargetingOptions {
        &self.options
    }

    /// Decide whether `context` is in `audience` for `feature_name`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any rollout percentage in the audience
    /// lies outside `[0, 100]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_targeting::{Audience, TargetingContext, TargetingEvaluator};
    ///
    /// let evaluator = TargetingEvaluator::default();
    /// let audience = Audience::new(0.0).with_user("Doe");
    ///
    /// let doe = TargetingContext::for_user("Doe");
    /// assert!(evaluator.is_targeted(&doe, &audience, "testFeature").unwrap());
    ///
    /// let john = TargetingContext::for_user("John");
    /// assert!(!evaluator.is_targeted(&john, &audience, "testFeature").unwrap());
    /// ```
    pub fn is_targeted(
        &self,
        context: &TargetingContext,
        audience: &Audience,
        feature_name: &str,
    ) -> TargetingResult<bool> {
        audience.validate()?;

        let targeted = self.evaluate(context, audience, feature_name);
        debug!(
            feature = %feature_name,
            user = %context.user_id(),
            targeted,
            "Audience evaluated"
        );

        Ok(targeted)
    }

    fn evaluate(&self, context: &TargetingContext, audience: &Audience, feature_name: &str) -> bool {
        let user_id = context.user_id.as_deref();

        if self.is_excluded(context, audience) {
            trace!(feature = %feature_name, "Context excluded from audience");
            return false;
        }

        if let Some(user) = user_id
            && self.contains(&audience.users, user)
        {
            trace!(feature = %feature_name, user = %user, "Explicit user match");
            return true;
        }

        for group in &audience.groups {
            if !self.contains(&context.groups, &group.name) {
                continue;
            }

            let name = self.options.normalize(&group.name);
            let bucket = StableHasher::keyed_percentage(feature_name, &name);
            if bucket < group.rollout_percentage {
                trace!(
                    feature = %feature_name,
                    group = %group.name,
                    bucket,
                    rollout = group.rollout_percentage,
                    "Group rollout match"
                );
                return true;
            }
        }

        let user = self.options.normalize(user_id.unwrap_or(""));
        let bucket = StableHasher::keyed_percentage(feature_name, &user);
        trace!(
            feature = %feature_name,
            bucket,
            rollout = audience.default_rollout_percentage,
            "Default rollout"
        );

        bucket < audience.default_rollout_percentage
    }

    fn is_excluded(&self, context: &TargetingContext, audience: &Audience) -> bool {
        if let Some(user) = context.user_id.as_deref()
            && self.contains(&audience.exclusion.users, user)
        {
            return true;
        }

        context
            .groups
            .iter()
            .any(|group| self.contains(&audience.exclusion.groups, group))
    }

    fn contains(&self, haystack: &[String], needle: &str) -> bool {
        let needle = self.options.normalize(needle);
        haystack
            .iter()
            .any(|candidate| self.options.matches_normalized(candidate, &needle))
    }
}
