//! Round construction: a uniform random draw from the question bank.

use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::questions::Question;

/// Draw a shuffled round of at most `round_size` questions, without
/// replacement within the round.
///
/// The whole pool is Fisher–Yates shuffled and the prefix kept, so every
/// subset and ordering is equally likely. A pool smaller than `round_size`
/// yields the full pool shuffled — no padding, no repeats. The source slice
/// is never mutated.
pub fn build_round(pool: &[Arc<Question>], round_size: usize) -> Vec<Arc<Question>> {
    let mut round: Vec<Arc<Question>> = pool.to_vec();
    round.shuffle(&mut rand::rng());
    round.truncate(round_size);
    round
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn pool(size: usize) -> Vec<Arc<Question>> {
        (0..size)
            .map(|i| {
                Arc::new(Question {
                    id: format!("q{i}"),
                    prompt: format!("prompt {i}"),
                    choices: vec![],
                    answers: BTreeSet::new(),
                })
            })
            .collect()
    }

    #[test]
    fn round_has_exact_size_and_distinct_ids() {
        let pool = pool(100);
        let round = build_round(&pool, 25);
        assert_eq!(round.len(), 25);

        let ids: BTreeSet<&str> = round.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 25, "no question repeats within a round");
    }

    #[test]
    fn small_pool_yields_full_pool_without_padding() {
        let pool = pool(7);
        let round = build_round(&pool, 25);
        assert_eq!(round.len(), 7);
    }

    #[test]
    fn repeated_builds_are_not_always_identical() {
        let pool = pool(100);
        let reference: Vec<String> = build_round(&pool, 25)
            .iter()
            .map(|q| q.id.clone())
            .collect();

        // 20 independent draws all matching the first would be a broken RNG.
        let all_same = (0..20).all(|_| {
            let ids: Vec<String> = build_round(&pool, 25)
                .iter()
                .map(|q| q.id.clone())
                .collect();
            ids == reference
        });
        assert!(!all_same);
    }
}
