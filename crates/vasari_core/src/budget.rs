//! Size budget policy for completion calls.

use serde::{Deserialize, Serialize};

/// Controls how many tokens a stage may request and how the budget escalates
/// across retry attempts.
///
/// Each stage carries its own policy as plain data; nothing is inferred from
/// stage names.
///
/// # Examples
///
/// ```
/// use vasari_core::BudgetPolicy;
///
/// let policy = BudgetPolicy::builder()
///     .initial(2048)
///     .max_attempts(4)
///     .growth(2.0)
///     .build();
///
/// assert_eq!(*policy.initial(), 2048);
/// assert_eq!(policy.grow(2048), 4096);
///
/// // Default: 1024 tokens, 3 attempts, 1.5x growth
/// let default = BudgetPolicy::default();
/// assert_eq!(*default.max_attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct BudgetPolicy {
    /// Size budget (in tokens) for the first attempt.
    #[serde(default = "default_initial")]
    initial: u32,

    /// Maximum number of completion attempts before giving up.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Multiplier applied to the budget when a retry needs more room.
    #[serde(default = "default_growth")]
    growth: f32,
}

fn default_initial() -> u32 {
    1024
}

fn default_max_attempts() -> u32 {
    3
}

fn default_growth() -> f32 {
    1.5
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            max_attempts: default_max_attempts(),
            growth: default_growth(),
        }
    }
}

impl BudgetPolicy {
    /// Creates a new budget policy builder.
    pub fn builder() -> BudgetPolicyBuilder {
        BudgetPolicyBuilder::default()
    }

    /// Validates that the policy values are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial budget or attempt count is zero, or
    /// if the growth factor would shrink the budget.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial == 0 {
            return Err("Initial budget must be greater than zero".to_string());
        }
        if self.max_attempts == 0 {
            return Err("Max attempts must be greater than zero".to_string());
        }
        if self.growth < 1.0 {
            return Err(format!("Growth factor must be >= 1.0, got {}", self.growth));
        }
        Ok(())
    }

    /// Applies the growth factor to a budget, rounding up.
    pub fn grow(&self, budget: u32) -> u32 {
        (budget as f32 * self.growth).ceil() as u32
    }
}

/// Builder for `BudgetPolicy`.
#[derive(Debug, Default)]
pub struct BudgetPolicyBuilder {
    initial: Option<u32>,
    max_attempts: Option<u32>,
    growth: Option<f32>,
}

impl BudgetPolicyBuilder {
    /// Sets the initial size budget.
    pub fn initial(mut self, value: u32) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the maximum attempt count.
    pub fn max_attempts(mut self, value: u32) -> Self {
        self.max_attempts = Some(value);
        self
    }

    /// Sets the growth factor.
    pub fn growth(mut self, value: f32) -> Self {
        self.growth = Some(value);
        self
    }

    /// Builds the `BudgetPolicy`.
    pub fn build(self) -> BudgetPolicy {
        BudgetPolicy {
            initial: self.initial.unwrap_or_else(default_initial),
            max_attempts: self.max_attempts.unwrap_or_else(default_max_attempts),
            growth: self.growth.unwrap_or_else(default_growth),
        }
    }
}
