//! Variant allocation policy
//!
//! Describes how a multi-variant feature spreads its variants over users:
//! explicit user and group assignments, then percentile ranges bucketed by a
//! seeded hash.

use crate::error::{ensure_percentage, TargetingError, TargetingResult};
use serde::{Deserialize, Serialize};

/// Allocation of variants for a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allocation {
    /// Variant served when the feature is enabled but nothing was allocated
    pub default_when_enabled: Option<String>,

    /// Variant served when the feature is disabled for the context
    pub default_when_disabled: Option<String>,

    /// Explicit user assignments, checked in order
    #[serde(rename = "user")]
    pub users: Vec<UserAllocation>,

    /// Explicit group assignments
    #[serde(rename = "group")]
    pub groups: Vec<GroupAllocation>,

    /// Percentile ranges, first match wins
    #[serde(rename = "percentile")]
    pub percentiles: Vec<PercentileAllocation>,

    /// Seed replacing the feature name in percentile hashing
    pub seed: Option<String>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_when_enabled(mut self, variant: impl Into<String>) -> Self {
        self.default_when_enabled = Some(variant.into());
        self
    }

    pub fn with_default_when_disabled(mut self, variant: impl Into<String>) -> Self {
        self.default_when_disabled = Some(variant.into());
        self
    }

    /// Assign `users` to `variant`
    pub fn with_users(
        mut self,
        variant: impl Into<String>,
        users: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.users.push(UserAllocation {
            variant: variant.into(),
            users: users.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Assign `groups` to `variant`
    pub fn with_groups(
        mut self,
        variant: impl Into<String>,
        groups: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.groups.push(GroupAllocation {
            variant: variant.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Assign the percentile range `[from, to)` to `variant`
    pub fn with_percentile(mut self, variant: impl Into<String>, from: f64, to: f64) -> Self {
        self.percentiles
            .push(PercentileAllocation::new(variant, from, to));
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Check every percentile entry.
    ///
    /// Bounds must lie in `[0, 100]` with `from <= to`. Overlapping entries
    /// are allowed.
    pub fn validate(&self) -> TargetingResult<()> {
        for (index, entry) in self.percentiles.iter().enumerate() {
            ensure_percentage(entry.from, || format!("Allocation.Percentile[{}].From", index))?;
            ensure_percentage(entry.to, || format!("Allocation.Percentile[{}].To", index))?;

            if entry.from > entry.to {
                return Err(TargetingError::invalid_percentile(
                    format!("Allocation.Percentile[{}]", index),
                    entry.from,
                    entry.to,
                ));
            }
        }

        Ok(())
    }
}

/// Users assigned to a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAllocation {
    pub variant: String,
    #[serde(default)]
    pub users: Vec<String>,
}

/// Groups assigned to a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAllocation {
    pub variant: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Percentile range assigned to a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileAllocation {
    pub variant: String,
    pub from: f64,
    pub to: f64,
}

impl PercentileAllocation {
    pub fn new(variant: impl Into<String>, from: f64, to: f64) -> Self {
        Self {
            variant: variant.into(),
            from,
            to,
        }
    }

    /// Whether `percentile` falls in `[from, to)`.
    ///
    /// An entry ending at 100 also accepts 100 itself.
    pub fn contains(&self, percentile: f64) -> bool {
        if self.to >= 100.0 && percentile >= 100.0 {
            return self.from <= percentile;
        }

        self.from <= percentile && percentile < self.to
    }
}
