//! Engine configuration.

use serde::{Deserialize, Serialize};

/// The single recognized-options record consumed by the adaptive core.
///
/// All values are tunable; the defaults reproduce the shipped behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub diagnostic: DiagnosticConfig,
    pub selector: SelectorConfig,
    pub bkt: BktConfig,
    pub srs: SrsConfig,
    pub irt: IrtConfig,
}

/// Diagnostic termination thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    /// A subskill stops receiving items after this many.
    ///
    /// Default: 5
    pub max_items_per_subskill: u32,

    /// A subskill is complete once SE(theta) drops below this.
    ///
    /// Default: 0.30
    pub se_threshold: f64,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            max_items_per_subskill: 5,
            se_threshold: 0.30,
        }
    }
}

/// Selector constraints and scoring weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// In-session cap per subskill during practice.
    ///
    /// Default: 10
    pub max_per_subskill: u32,

    /// In-session cap per subskill during the diagnostic.
    ///
    /// Default: 5
    pub max_per_subskill_diagnostic: u32,

    /// Subskills below this in-session count receive the balancing bonus.
    ///
    /// Default: 2
    pub min_per_subskill: u32,

    /// Items at or past this lifetime exposure are ineligible.
    ///
    /// Default: 100
    pub max_exposure: u32,

    /// Target success probability in learning mode.
    ///
    /// Default: 0.70
    pub target_accuracy_learning: f64,

    /// Target success probability in assessment mode.
    ///
    /// Default: 0.50
    pub target_accuracy_assessment: f64,

    /// Target success probability in review mode.
    ///
    /// Default: 0.60
    pub target_accuracy_review: f64,

    /// Dead zone around the target before the accuracy penalty applies.
    ///
    /// Default: 0.15
    pub accuracy_tolerance: f64,

    /// Weight of the accuracy penalty.
    ///
    /// Default: 2.0
    pub accuracy_weight: f64,

    /// Bonus for under-represented subskills.
    ///
    /// Default: 0.5
    pub balance_bonus: f64,

    /// Per-exposure score penalty.
    ///
    /// Default: 0.01
    pub exposure_weight: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_per_subskill: 10,
            max_per_subskill_diagnostic: 5,
            min_per_subskill: 2,
            max_exposure: 100,
            target_accuracy_learning: 0.70,
            target_accuracy_assessment: 0.50,
            target_accuracy_review: 0.60,
            accuracy_tolerance: 0.15,
            accuracy_weight: 2.0,
            balance_bonus: 0.5,
            exposure_weight: 0.01,
        }
    }
}

/// Knowledge-tracing observation model and rate bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BktConfig {
    /// Probability a non-knower answers correctly.
    ///
    /// Default: 0.25
    pub default_guess: f64,

    /// Probability a knower answers incorrectly.
    ///
    /// Default: 0.10
    pub default_slip: f64,

    /// Per-day forgetting probability for new states.
    ///
    /// Default: 0.02
    pub default_forget: f64,

    /// Learning rate for new states.
    ///
    /// Default: 0.10
    pub default_learn: f64,

    /// Lower bound for the adaptive learning rate.
    ///
    /// Default: 0.05
    pub min_learn: f64,

    /// Upper bound for the adaptive learning rate.
    ///
    /// Default: 0.20
    pub max_learn: f64,
}

impl Default for BktConfig {
    fn default() -> Self {
        Self {
            default_guess: 0.25,
            default_slip: 0.10,
            default_forget: 0.02,
            default_learn: 0.10,
            min_learn: 0.05,
            max_learn: 0.20,
        }
    }
}

/// Spaced-repetition scheduler bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrsConfig {
    /// Hard cap on review intervals.
    ///
    /// Default: 365
    pub max_interval_days: u32,

    /// Ease factor floor.
    ///
    /// Default: 1.3
    pub min_ease: f64,

    /// Recall probability the next-review time aims for.
    ///
    /// Default: 0.90
    pub target_retrievability: f64,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            max_interval_days: 365,
            min_ease: 1.3,
            target_retrievability: 0.90,
        }
    }
}

/// Ability-estimation quadrature settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrtConfig {
    /// Number of equally spaced quadrature nodes.
    ///
    /// Default: 81
    pub quadrature_nodes: usize,

    /// Theta integration range.
    ///
    /// Default: [-4, 4]
    pub theta_range: (f64, f64),

    /// Minimum reported standard error.
    ///
    /// Default: 0.01
    pub se_floor: f64,
}

impl Default for IrtConfig {
    fn default() -> Self {
        Self {
            quadrature_nodes: 81,
            theta_range: (-4.0, 4.0),
            se_floor: 0.01,
        }
    }
}
