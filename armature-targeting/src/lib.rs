//! Audience Targeting for Armature
//!
//! Deterministic targeting and variant assignment for feature flags. Every
//! decision is derived from a stable hash of the feature and user, so all
//! nodes reach the same answer for the same caller without shared state.
//!
//! # Features
//!
//! - 🎯 **Audiences** - Explicit users, group rollouts, default rollout and exclusions
//! - 🎲 **Stable Bucketing** - Percentage rollout by seeded hashing, not randomness
//! - 📊 **Variants** - User, group and percentile allocation for multi-variant features
//! - ✅ **Eager Validation** - Out-of-range percentages fail the whole evaluation
//!
//! # Targeting
//!
//! ```
//! use armature_targeting::*;
//!
//! let audience = Audience::new(20.0)
//!     .with_user("Doe")
//!     .with_group("beta-testers", 50.0)
//!     .exclude_user("Mallory");
//!
//! let context = TargetingContext::for_user("Doe").with_group("beta-testers");
//! let evaluator = TargetingEvaluator::default();
//!
//! assert!(evaluator.is_targeted(&context, &audience, "new-ui").unwrap());
//! ```
//!
//! # Variants
//!
//! ```
//! use armature_targeting::*;
//!
//! let allocation = Allocation::new()
//!     .with_users("Big", ["Marsha"])
//!     .with_percentile("Small", 0.0, 50.0)
//!     .with_percentile("Big", 50.0, 100.0);
//!
//! let context = TargetingContext::for_user("Marsha");
//! let assignment = VariantAllocator::default()
//!     .assign_variant(Some(&context), "button-size", &allocation)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(assignment.variant, "Big");
//! assert_eq!(assignment.reason, VariantAssignmentReason::User);
//! ```
//!
//! # Feature Manager
//!
//! ```
//! use armature_targeting::*;
//!
//! let features = FeatureSet::new().with_feature(
//!     FeatureDefinition::new("beta").with_audience(Audience::new(0.0).with_user("Doe")),
//! );
//! let manager = FeatureManager::new(features);
//!
//! let doe = TargetingContext::for_user("Doe");
//! assert!(manager.is_enabled_for("beta", Some(&doe)).unwrap());
//! ```

pub mod allocation;
pub mod allocator;
pub mod audience;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod feature;
pub mod hasher;
pub mod options;

pub use allocation::{Allocation, GroupAllocation, PercentileAllocation, UserAllocation};
pub use allocator::{VariantAllocator, VariantAssignment, VariantAssignmentReason};
pub use audience::{Audience, Exclusion, GroupRollout};
pub use context::{ContextError, StaticContextProvider, TargetingContext, TargetingContextProvider};
pub use error::{TargetingError, TargetingResult};
pub use evaluator::TargetingEvaluator;
pub use feature::{
    FeatureDefinition, FeatureManager, FeatureSet, StatusOverride, Variant, VariantDefinition,
};
pub use hasher::StableHasher;
pub use options::TargetingOptions;
