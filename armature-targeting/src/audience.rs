//! Audience definitions
//!
//! Who is included in or excluded from a feature, and at what rollout
//! percentage. These are plain values handed over by the configuration layer;
//! numeric ranges are checked by [`Audience::validate`].

use crate::error::{ensure_percentage, TargetingResult};
use serde::{Deserialize, Serialize};

/// Audience targeted by a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Audience {
    /// Explicitly included users
    pub users: Vec<String>,

    /// Groups with per-group rollout, checked in order
    pub groups: Vec<GroupRollout>,

    /// Rollout percentage (0-100) for everyone else
    pub default_rollout_percentage: f64,

    /// Users and groups that are never targeted
    pub exclusion: Exclusion,
}

impl Audience {
    /// Create an empty audience with the given default rollout
    pub fn new(default_rollout_percentage: f64) -> Self {
        Self {
            default_rollout_percentage,
            ..Default::default()
        }
    }

    /// Include a user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.users.push(user.into());
        self
    }

    /// Include multiple users
    pub fn with_users(mut self, users: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Include a group at the given rollout percentage
    pub fn with_group(mut self, name: impl Into<String>, rollout_percentage: f64) -> Self {
        self.groups.push(GroupRollout::new(name, rollout_percentage));
        self
    }

    /// Exclude a user
    pub fn exclude_user(mut self, user: impl Into<String>) -> Self {
        self.exclusion.users.push(user.into());
        self
    }

    /// Exclude a group
    pub fn exclude_group(mut self, group: impl Into<String>) -> Self {
        self.exclusion.groups.push(group.into());
        self
    }

    /// Check every rollout percentage in the audience.
    ///
    /// Runs over the whole audience regardless of which rule would decide, so
    /// a bad value fails every evaluation the same way.
    pub fn validate(&self) -> TargetingResult<()> {
        ensure_percentage(self.default_rollout_percentage, || {
            "Audience.DefaultRolloutPercentage".to_string()
        })?;

        for (index, group) in self.groups.iter().enumerate() {
            ensure_percentage(group.rollout_percentage, || {
                format!("Audience.Groups[{}].RolloutPercentage", index)
            })?;
        }

        Ok(())
    }
}

/// Group rollout entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRollout {
    /// Group name
    pub name: String,

    /// Percentage (0-100) of the group's members that are targeted
    pub rollout_percentage: f64,
}

impl GroupRollout {
    pub fn new(name: impl Into<String>, rollout_percentage: f64) -> Self {
        Self {
            name: name.into(),
            rollout_percentage,
        }
    }
}

/// Exclusion lists; these win over every inclusion rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusion {
    pub users: Vec<String>,
    pub groups: Vec<String>,
}
