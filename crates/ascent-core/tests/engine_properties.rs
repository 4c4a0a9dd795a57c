//! Property tests for the numeric engines.

mod common;

use chrono::Utc;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ascent_core::config::{BktConfig, IrtConfig, SelectorConfig, SrsConfig};
use ascent_core::domain::{Flashcard, IrtParams, ReviewQuality, Section, SubskillId};
use ascent_core::selector::{select_next, SelectionConstraints, SelectionMode};
use ascent_core::{bkt, irt, srs, SessionHistory};

use common::make_item;

fn params_strategy() -> impl Strategy<Value = IrtParams> {
    (0.3f64..=3.0, -4.0f64..=4.0, 0.0f64..=0.5)
        .prop_map(|(a, b, c)| IrtParams::new(a, b, c))
}

proptest! {
    // Probability stays inside [c, 1]; information is non-negative and
    // finite everywhere on the ability scale.
    #[test]
    fn prop_probability_and_information_bounds(
        params in params_strategy(),
        theta in -6.0f64..=6.0,
    ) {
        let p = irt::probability(theta, &params);
        prop_assert!(p >= params.guessing - 1e-12);
        prop_assert!(p <= 1.0 + 1e-12);

        let info = irt::fisher_information(theta, &params);
        prop_assert!(info >= 0.0);
        prop_assert!(info.is_finite());
    }

    // EAP always lands inside the quadrature range with SE >= the floor.
    #[test]
    fn prop_eap_bounded(
        responses in proptest::collection::vec(
            (params_strategy(), proptest::bool::ANY),
            1..12,
        ),
    ) {
        let graded: Vec<irt::GradedResponse> = responses
            .into_iter()
            .map(|(params, correct)| irt::GradedResponse { params, correct })
            .collect();
        let estimate = irt::estimate_ability(
            irt::AbilityPrior::standard(),
            &graded,
            &IrtConfig::default(),
        );
        prop_assert!(estimate.theta >= -4.0 && estimate.theta <= 4.0);
        prop_assert!(estimate.standard_error >= 0.01);
    }

    // Any observation sequence keeps P(known) in [0, 1] and the adaptive
    // learning rate inside its bounds.
    #[test]
    fn prop_bkt_state_stays_bounded(
        p0 in 0.0f64..=1.0,
        observations in proptest::collection::vec(
            (proptest::bool::ANY, 1_000u64..400_000),
            1..30,
        ),
    ) {
        let cfg = BktConfig::default();
        let mut state =
            ascent_core::MasteryState::new_for_subskill(SubskillId::Algebra);
        state.p_known = p0;
        for (correct, response_ms) in observations {
            bkt::observe(&mut state, correct, response_ms, 90, &cfg);
            prop_assert!((0.0..=1.0).contains(&state.p_known));
            prop_assert!((cfg.min_learn..=cfg.max_learn).contains(&state.p_learn));
        }
    }

    // A correct observation never lowers P(known); an incorrect one never
    // raises the posterior before the learning transition.
    #[test]
    fn prop_bkt_monotone(p0 in 0.0f64..=1.0) {
        let cfg = BktConfig::default();
        let up = bkt::observation_posterior(p0, true, cfg.default_slip, cfg.default_guess);
        prop_assert!(up >= p0 - 1e-12);
        prop_assert!(bkt::apply_learning(up, cfg.default_learn) >= up - 1e-12);

        let down = bkt::observation_posterior(p0, false, cfg.default_slip, cfg.default_guess);
        prop_assert!(down <= p0 + 1e-12);
    }

    // Decaying over d days once equals decaying twice over d/2.
    #[test]
    fn prop_forgetting_is_divisible(
        p0 in 0.0f64..=1.0,
        p_forget in 0.0f64..=0.2,
        days in 0.0f64..=120.0,
    ) {
        let whole = bkt::apply_forgetting(p0, p_forget, days);
        let halved = bkt::apply_forgetting(
            bkt::apply_forgetting(p0, p_forget, days / 2.0),
            p_forget,
            days / 2.0,
        );
        prop_assert!((whole - halved).abs() < 1e-9);
    }

    // Whatever the seed and session state, the selector never hands out an
    // item the session has already seen.
    #[test]
    fn prop_selector_respects_hard_constraints(
        difficulties in proptest::collection::vec(-3.0f64..=3.0, 4..20),
        theta in -3.0f64..=3.0,
        seed in 0u64..=u64::MAX,
        seen_mask in proptest::collection::vec(proptest::bool::ANY, 4..20),
    ) {
        let cfg = SelectorConfig::default();
        let constraints = SelectionConstraints::practice(&cfg, SelectionMode::Learning);
        let subskills = [SubskillId::Algebra, SubskillId::Geometry, SubskillId::TextCompletion];
        let items: Vec<_> = difficulties
            .iter()
            .enumerate()
            .map(|(i, &b)| make_item(&format!("q{}", i), subskills[i % 3], b))
            .collect();

        let mut history = SessionHistory::new();
        for (item, seen) in items.iter().zip(seen_mask.iter()) {
            if *seen {
                history.mark_seen(&item.id, item.primary_subskill);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        if let Some(picked) = select_next(theta, &items, &history, &constraints, &cfg, &mut rng) {
            prop_assert!(!history.has_seen(&picked.id));
        }
    }

    // Review sequences keep every flashcard invariant: ease floor, the
    // one-year interval cap, and non-negative stability.
    #[test]
    fn prop_srs_invariants(
        qualities in proptest::collection::vec(0u8..=3, 1..40),
    ) {
        let cfg = SrsConfig::default();
        let now = Utc::now();
        let mut card = Flashcard::new("word");
        for q in qualities {
            card = srs::review(&card, ReviewQuality::from(q), now, &cfg);
            prop_assert!(card.ease_factor >= cfg.min_ease - 1e-12);
            prop_assert!(card.stability >= 0.0);
            prop_assert!(card.stability <= cfg.max_interval_days as f64);
            prop_assert!(card.interval_hours >= 1);
            prop_assert!(card.interval_hours <= cfg.max_interval_days * 24);
            prop_assert!((0.0..=1.0).contains(&card.difficulty));
        }
    }

    // Scaled scores stay on their reporting scales for any ability.
    #[test]
    fn prop_scaled_scores_clamped(theta in -10.0f64..=10.0) {
        let quant = irt::scaled_score(Section::Quant, theta);
        prop_assert!((130.0..=170.0).contains(&quant.score));
        prop_assert!(quant.band_low <= quant.score && quant.score <= quant.band_high);

        let writing = irt::scaled_score(Section::Writing, theta);
        prop_assert!((1.0..=6.0).contains(&writing.score));
    }
}

// Top-three stability: with a fixed candidate set the winner always comes
// from the same three best-scored items, whatever the seed.
#[test]
fn test_selector_draws_only_from_top_three() {
    let cfg = SelectorConfig::default();
    let constraints = SelectionConstraints::practice(&cfg, SelectionMode::Learning);
    let history = SessionHistory::new();
    let items: Vec<_> = [-1.2, -0.8, -0.4, 1.5, 2.5, 3.5]
        .iter()
        .enumerate()
        .map(|(i, &b)| make_item(&format!("q{}", i), SubskillId::Algebra, b))
        .collect();

    for seed in 0..200u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = select_next(0.0, &items, &history, &constraints, &cfg, &mut rng).unwrap();
        assert!(
            ["q0", "q1", "q2"].contains(&picked.id.as_str()),
            "seed {} picked {}",
            seed,
            picked.id
        );
    }
}
