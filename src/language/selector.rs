use rand::seq::SliceRandom;
use rand::RngCore;

/// Strategy for drawing `count` practice words out of a list
pub trait WordSelector {
    fn select_words(&self, words: &[String], count: usize, rng: &mut dyn RngCore) -> Vec<String>;
}

/// Uniform random subset without replacement; never repeats a list entry
///
/// Returns fewer than `count` words when the list is shorter, so callers
/// only reach for it when `words.len() >= count`.
pub struct PermutationSelector;

impl WordSelector for PermutationSelector {
    fn select_words(&self, words: &[String], count: usize, rng: &mut dyn RngCore) -> Vec<String> {
        words.choose_multiple(rng, count).cloned().collect()
    }
}

/// Independent uniform draws with replacement; repeats are expected
pub struct IndependentDrawSelector;

impl WordSelector for IndependentDrawSelector {
    fn select_words(&self, words: &[String], count: usize, rng: &mut dyn RngCore) -> Vec<String> {
        (0..count)
            .filter_map(|_| words.choose(&mut *rng).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word{i}")).collect()
    }

    #[test]
    fn test_permutation_has_no_repeats() {
        let list = words(50);
        let mut rng = StdRng::seed_from_u64(7);

        for count in [1, 10, 49, 50] {
            let picked = PermutationSelector.select_words(&list, count, &mut rng);
            assert_eq!(picked.len(), count);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), count, "permutation subset repeated a word");
            assert!(picked.iter().all(|w| list.contains(w)));
        }
    }

    #[test]
    fn test_permutation_of_whole_list_is_a_shuffle() {
        let list = words(20);
        let mut rng = StdRng::seed_from_u64(11);

        let mut picked = PermutationSelector.select_words(&list, 20, &mut rng);
        picked.sort();
        let mut expected = list.clone();
        expected.sort();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_independent_draws_fill_requested_count() {
        let list = words(3);
        let mut rng = StdRng::seed_from_u64(3);

        let picked = IndependentDrawSelector.select_words(&list, 100, &mut rng);
        assert_eq!(picked.len(), 100);
        assert!(picked.iter().all(|w| list.contains(w)));
        // 100 draws from 3 words must repeat
        let unique: HashSet<_> = picked.iter().collect();
        assert!(unique.len() <= 3);
    }

    #[test]
    fn test_selectors_on_empty_list() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(PermutationSelector.select_words(&[], 5, &mut rng).is_empty());
        assert!(IndependentDrawSelector.select_words(&[], 5, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_selection() {
        let list = words(30);
        let a = PermutationSelector.select_words(&list, 10, &mut StdRng::seed_from_u64(42));
        let b = PermutationSelector.select_words(&list, 10, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
