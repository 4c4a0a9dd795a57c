//! Item Response Theory engine: 3PL response model, Fisher information,
//! and EAP ability estimation by fixed-grid quadrature.

mod scaled_score;

pub use scaled_score::{scaled_score, ScaledScore};

use crate::config::IrtConfig;
use crate::domain::IrtParams;

/// Gaussian prior over theta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityPrior {
    pub mean: f64,
    pub sd: f64,
}

impl AbilityPrior {
    pub fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    /// Standard normal prior N(0, 1).
    pub fn standard() -> Self {
        Self { mean: 0.0, sd: 1.0 }
    }
}

/// Posterior summary returned by [`estimate_ability`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityEstimate {
    pub theta: f64,
    pub standard_error: f64,
}

/// One graded response paired with the parameters of the item it was given
/// on. This is all the estimator needs; item identity stays with the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedResponse {
    pub params: IrtParams,
    pub correct: bool,
}

/// 3PL probability of a correct response at ability `theta`:
///
/// P(correct | theta) = c + (1 - c) / (1 + exp(-a(theta - b)))
pub fn probability(theta: f64, params: &IrtParams) -> f64 {
    let IrtParams {
        discrimination: a,
        difficulty: b,
        guessing: c,
    } = *params;
    c + (1.0 - c) / (1.0 + (-a * (theta - b)).exp())
}

/// Fisher information the item provides at `theta`:
///
/// I(theta) = a^2 * ((P - c)/(1 - c))^2 * ((1 - P)/P)
///
/// Returns 0 for non-scorable parameters and at the numerical boundaries
/// P <= c and P >= 1, where the item carries no information.
pub fn fisher_information(theta: f64, params: &IrtParams) -> f64 {
    if !params.is_scorable() {
        return 0.0;
    }
    let a = params.discrimination;
    let c = params.guessing;
    let p = probability(theta, params);
    if p <= c || p >= 1.0 {
        return 0.0;
    }
    let ratio = (p - c) / (1.0 - c);
    a * a * ratio * ratio * ((1.0 - p) / p)
}

/// EAP ability estimation against a Gaussian prior.
///
/// The posterior is approximated over `cfg.quadrature_nodes` equally spaced
/// nodes spanning `cfg.theta_range`; at each node the prior density is
/// multiplied by the product of response likelihoods P^r (1-P)^(1-r). The
/// posterior mean is reported as theta-hat and the posterior standard
/// deviation as the standard error, floored at `cfg.se_floor`.
///
/// With no responses the prior is returned unchanged. Responses on
/// non-scorable items contribute no likelihood. If every node underflows to
/// zero the prior is returned; estimation never fails.
pub fn estimate_ability(
    prior: AbilityPrior,
    responses: &[GradedResponse],
    cfg: &IrtConfig,
) -> AbilityEstimate {
    let prior_estimate = AbilityEstimate {
        theta: prior.mean,
        standard_error: prior.sd.max(cfg.se_floor),
    };
    if responses.is_empty() || cfg.quadrature_nodes < 2 {
        return prior_estimate;
    }

    let (lo, hi) = cfg.theta_range;
    let n = cfg.quadrature_nodes;
    let step = (hi - lo) / (n - 1) as f64;

    let mut weights = Vec::with_capacity(n);
    let mut total = 0.0f64;
    for i in 0..n {
        let theta = lo + step * i as f64;
        let z = (theta - prior.mean) / prior.sd;
        let mut weight = (-0.5 * z * z).exp();
        for response in responses {
            if !response.params.is_scorable() {
                continue;
            }
            let p = probability(theta, &response.params).clamp(1e-12, 1.0 - 1e-12);
            weight *= if response.correct { p } else { 1.0 - p };
        }
        total += weight;
        weights.push((theta, weight));
    }

    if !(total.is_finite() && total > 0.0) {
        return prior_estimate;
    }

    let mean: f64 = weights.iter().map(|(t, w)| t * w).sum::<f64>() / total;
    let variance: f64 = weights
        .iter()
        .map(|(t, w)| w * (t - mean) * (t - mean))
        .sum::<f64>()
        / total;

    AbilityEstimate {
        theta: mean,
        standard_error: variance.sqrt().max(cfg.se_floor),
    }
}
