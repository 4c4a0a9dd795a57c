//! Bayesian Knowledge Tracing: two-state tracker with observation noise
//! (guess, slip), a per-opportunity learning transition, time-decayed
//! forgetting, and response-time learn-rate adaptation.

use crate::config::BktConfig;
use crate::domain::{MasteryState, SubskillEstimate};

/// Decay P(known) for `elapsed_days` without practice:
///
/// P(known) <- P(known) * (1 - P(forget))^elapsed_days
///
/// Fractional days are honored, so two decays over d/2 compose to one decay
/// over d.
pub fn apply_forgetting(p_known: f64, p_forget: f64, elapsed_days: f64) -> f64 {
    if elapsed_days <= 0.0 || p_forget <= 0.0 {
        return p_known.clamp(0.0, 1.0);
    }
    let retention = (1.0 - p_forget.clamp(0.0, 1.0)).powf(elapsed_days);
    (p_known * retention).clamp(0.0, 1.0)
}

/// Posterior P(known) after one graded observation, before the learning
/// transition.
///
/// Correct:   P(obs|known) = 1 - slip,  P(obs|not known) = guess
/// Incorrect: P(obs|known) = slip,      P(obs|not known) = 1 - guess
pub fn observation_posterior(p_known: f64, correct: bool, slip: f64, guess: f64) -> f64 {
    let p = p_known.clamp(0.0, 1.0);
    let (like_known, like_unknown) = if correct {
        (1.0 - slip, guess)
    } else {
        (slip, 1.0 - guess)
    };
    let numerator = p * like_known;
    let denominator = numerator + (1.0 - p) * like_unknown;
    if denominator <= 0.0 {
        // Degenerate observation model; the evidence carries nothing.
        return p;
    }
    (numerator / denominator).clamp(0.0, 1.0)
}

/// Learning transition applied after every observation:
///
/// P(known) <- posterior + (1 - posterior) * P(learn)
pub fn apply_learning(posterior: f64, p_learn: f64) -> f64 {
    (posterior + (1.0 - posterior) * p_learn).clamp(0.0, 1.0)
}

/// Adapt the learning rate from response speed, on correct answers only.
///
/// Fast correct answers (under 0.7x the benchmark) nudge the rate up 10%,
/// slow ones (over 2x) nudge it down 5%; both stay inside the configured
/// bounds. Incorrect answers leave the rate untouched.
pub fn adapt_learn_rate(
    p_learn: f64,
    correct: bool,
    response_time_ms: u64,
    time_benchmark_secs: u32,
    cfg: &BktConfig,
) -> f64 {
    if !correct || time_benchmark_secs == 0 {
        return p_learn;
    }
    let ratio = response_time_ms as f64 / (time_benchmark_secs as f64 * 1000.0);
    if ratio < 0.7 {
        (p_learn * 1.10).min(cfg.max_learn)
    } else if ratio > 2.0 {
        (p_learn * 0.95).max(cfg.min_learn)
    } else {
        p_learn
    }
}

/// Full per-observation update on a mastery state: forgetting since the
/// last practice has already been applied by the caller; this performs the
/// Bayesian step, the learning transition, and the learn-rate adjustment.
pub fn observe(
    state: &mut MasteryState,
    correct: bool,
    response_time_ms: u64,
    benchmark_secs: u32,
    cfg: &BktConfig,
) {
    let posterior =
        observation_posterior(state.p_known, correct, cfg.default_slip, cfg.default_guess);
    state.p_known = apply_learning(posterior, state.p_learn);
    state.p_learn = adapt_learn_rate(state.p_learn, correct, response_time_ms, benchmark_secs, cfg);
}

/// Seed a mastery state from a diagnostic estimate.
///
/// Base P(known) maps theta linearly, clamped to [0.1, 0.9], then regresses
/// toward 0.4 in proportion to the estimate's uncertainty. The learning
/// rate starts high for accurate learners and low for struggling ones.
pub fn seed_from_diagnostic(estimate: &SubskillEstimate, cfg: &BktConfig) -> MasteryState {
    let base = (0.5 + 0.8 * estimate.theta / 6.0).clamp(0.1, 0.9);
    let confidence = (1.0 - estimate.standard_error).max(0.0);
    let p_known = 0.4 + (base - 0.4) * confidence;

    let p_learn: f64 = if estimate.accuracy > 0.70 {
        0.12
    } else if estimate.accuracy < 0.40 {
        0.08
    } else {
        0.10
    };

    let correct = (estimate.accuracy * estimate.item_count as f64).round() as u32;

    MasteryState {
        subskill: estimate.subskill,
        theta: estimate.theta,
        standard_error: estimate.standard_error,
        p_known: p_known.clamp(0.0, 1.0),
        p_learn: p_learn.clamp(cfg.min_learn, cfg.max_learn),
        p_forget: cfg.default_forget,
        attempts: estimate.item_count,
        correct,
        last_practiced: None,
    }
}
