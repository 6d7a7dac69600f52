pub mod assets;
pub mod core;
pub mod sampler;
pub mod selector;

// Re-export the main types for convenience
pub use assets::{parse_word_list, DirectoryAssets, EmbeddedAssets, WordAssetLoader, WordLists};
pub use self::core::Language;
pub use sampler::{WordSampler, WordsResponse, DEFAULT_WORD_COUNT, MAX_WORD_COUNT};
pub use selector::{IndependentDrawSelector, PermutationSelector, WordSelector};
