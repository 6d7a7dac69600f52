use super::{
    assets::WordLists,
    core::Language,
    selector::{IndependentDrawSelector, PermutationSelector, WordSelector},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Count used when the caller asks for zero or fewer words
pub const DEFAULT_WORD_COUNT: usize = 200;

/// Largest number of words a single request can produce
pub const MAX_WORD_COUNT: usize = 10_000;

/// Wire shape of a sampling response: `{"words": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordsResponse {
    pub words: Vec<String>,
}

/// Draws practice words from immutable, preloaded word lists
#[derive(Debug, Clone)]
pub struct WordSampler {
    lists: WordLists,
}

impl WordSampler {
    pub fn new(lists: WordLists) -> Self {
        Self { lists }
    }

    pub fn lists(&self) -> &WordLists {
        &self.lists
    }

    pub fn sample(&self, language_tag: &str, requested_count: i64) -> Vec<String> {
        self.sample_with_rng(language_tag, requested_count, &mut rand::thread_rng())
    }

    /// Sample words for `language_tag`; never fails
    ///
    /// Unknown tags use the English list, non-positive counts become
    /// [`DEFAULT_WORD_COUNT`] and counts are capped at [`MAX_WORD_COUNT`].
    /// Lists at least as long as the count are drawn without replacement,
    /// shorter lists with replacement.
    pub fn sample_with_rng(
        &self,
        language_tag: &str,
        requested_count: i64,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let language = Language::resolve(language_tag);
        let words = self.lists.words(language);
        if words.is_empty() {
            debug!(%language, "empty word list, nothing to sample");
            return Vec::new();
        }

        let count = normalize_count(requested_count);
        let selector: &dyn WordSelector = if words.len() >= count {
            &PermutationSelector
        } else {
            &IndependentDrawSelector
        };

        debug!(
            %language,
            count,
            available = words.len(),
            with_replacement = words.len() < count,
            "sampling words"
        );
        selector.select_words(words, count, rng)
    }

    pub fn respond(&self, language_tag: &str, requested_count: i64) -> WordsResponse {
        WordsResponse {
            words: self.sample(language_tag, requested_count),
        }
    }
}

fn normalize_count(requested_count: i64) -> usize {
    if requested_count <= 0 {
        DEFAULT_WORD_COUNT
    } else {
        usize::try_from(requested_count)
            .unwrap_or(MAX_WORD_COUNT)
            .min(MAX_WORD_COUNT)
    }
}
