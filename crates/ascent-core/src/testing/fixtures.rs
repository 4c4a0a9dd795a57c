//! Reusable item fixtures for controller tests.

use crate::domain::{IrtParams, Item, ItemKind, SubskillId};

/// Four-choice item with the first choice correct and the given difficulty.
pub fn make_item(id: &str, subskill: SubskillId, difficulty: f64) -> Item {
    Item {
        id: id.to_string(),
        section: subskill.section(),
        primary_subskill: subskill,
        secondary_subskills: vec![],
        kind: ItemKind::MultipleChoice {
            choices: vec![
                "choice A".to_string(),
                "choice B".to_string(),
                "choice C".to_string(),
                "choice D".to_string(),
            ],
            correct: 0,
        },
        tier: 3,
        time_benchmark_secs: 90,
        irt: IrtParams::new(1.0, difficulty, 0.25),
    }
}

/// A bank with `per_subskill` items for each subskill, difficulties cycling
/// through {-1, 0, +1}.
pub fn make_bank(per_subskill: usize) -> Vec<Item> {
    let mut items = Vec::new();
    for subskill in SubskillId::ALL {
        for i in 0..per_subskill {
            let difficulty = [-1.0, 0.0, 1.0][i % 3];
            items.push(make_item(
                &format!("{}-{}", subskill.as_str(), i),
                subskill,
                difficulty,
            ));
        }
    }
    items
}
