//! Property tests for bucketing, targeting and allocation

use armature_targeting::*;
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.@-]{0,24}"
}

fn arb_percentage() -> impl Strategy<Value = f64> {
    (0u32..=1_000_000).prop_map(|n| f64::from(n) / 10_000.0)
}

proptest! {
    /// Every input hashes into [0, 100).
    #[test]
    fn hash_is_in_range(input in ".*") {
        let p = StableHasher::percentage(&input);
        prop_assert!((0.0..100.0).contains(&p));
    }

    /// Hashing the same key twice gives the same bucket.
    #[test]
    fn hash_is_deterministic(feature in arb_id(), user in arb_id()) {
        prop_assert_eq!(
            StableHasher::keyed_percentage(&feature, &user),
            StableHasher::keyed_percentage(&feature, &user)
        );
    }

    /// Excluded users are never targeted, even when explicitly included.
    #[test]
    fn exclusion_dominates_inclusion(
        user in arb_id(),
        feature in arb_id(),
        rollout in arb_percentage(),
    ) {
        let audience = Audience::new(rollout)
            .with_user(user.clone())
            .exclude_user(user.clone());
        let context = TargetingContext::for_user(user);

        prop_assert!(!TargetingEvaluator::default().is_targeted(&context, &audience, &feature).unwrap());
    }

    /// Raising the default rollout never turns a targeted user off.
    #[test]
    fn rollout_is_monotonic(
        user in arb_id(),
        feature in arb_id(),
        low in arb_percentage(),
        high in arb_percentage(),
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let context = TargetingContext::for_user(user);
        let evaluator = TargetingEvaluator::default();

        let before = evaluator.is_targeted(&context, &Audience::new(low), &feature).unwrap();
        let after = evaluator.is_targeted(&context, &Audience::new(high), &feature).unwrap();

        prop_assert!(!before || after);
    }

    /// A user listed for a variant always receives it.
    #[test]
    fn user_allocation_is_exact(
        user in arb_id(),
        feature in arb_id(),
        split in arb_percentage(),
    ) {
        let allocation = Allocation::new()
            .with_users("V", [user.clone()])
            .with_percentile("A", 0.0, split)
            .with_percentile("B", split, 100.0);
        let context = TargetingContext::for_user(user);

        let assignment = VariantAllocator::default()
            .assign_variant(Some(&context), &feature, &allocation)
            .unwrap()
            .unwrap();

        prop_assert_eq!(assignment.variant, "V");
        prop_assert_eq!(assignment.reason, VariantAssignmentReason::User);
    }

    /// Contiguous ranges covering [0, 100] always assign some variant.
    #[test]
    fn covering_percentiles_always_assign(
        user in arb_id(),
        feature in arb_id(),
        split in arb_percentage(),
    ) {
        let allocation = Allocation::new()
            .with_percentile("A", 0.0, split)
            .with_percentile("B", split, 100.0);
        let context = TargetingContext::for_user(user);

        let assignment = VariantAllocator::default()
            .assign_variant(Some(&context), &feature, &allocation)
            .unwrap();

        prop_assert!(assignment.is_some());
    }

    /// Out-of-range percentages are rejected regardless of the context.
    #[test]
    fn out_of_range_rollout_is_rejected(
        user in arb_id(),
        excess in 0.0001f64..1_000.0,
        negative in any::<bool>(),
    ) {
        let rollout = if negative { -excess } else { 100.0 + excess };
        let audience = Audience::new(50.0).with_user(user.clone()).with_group("g", rollout);
        let context = TargetingContext::for_user(user);

        let err = TargetingEvaluator::default()
            .is_targeted(&context, &audience, "feature")
            .unwrap_err();

        prop_assert!(err.is_validation());
    }
}
