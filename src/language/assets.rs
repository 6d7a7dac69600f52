use super::core::Language;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static LANG_DIR: Dir = include_dir!("src/lang");

/// Words shorter than this (in characters) never make it into a list
pub const MIN_WORD_CHARS: usize = 3;

/// Source of raw word-list text, one asset per language
pub trait WordAssetLoader {
    /// Raw asset contents, or `None` when the language has no asset
    fn load(&self, language: Language) -> Option<String>;
}

/// Word lists compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedAssets;

impl WordAssetLoader for EmbeddedAssets {
    fn load(&self, language: Language) -> Option<String> {
        LANG_DIR
            .get_file(language.asset_file_name())
            .and_then(|file| file.contents_utf8())
            .map(str::to_owned)
    }
}

/// Word lists read from `<dir>/<tag>.txt`
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    dir: PathBuf,
}

impl DirectoryAssets {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl WordAssetLoader for DirectoryAssets {
    fn load(&self, language: Language) -> Option<String> {
        let path = self.dir.join(language.asset_file_name());
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "word asset unavailable");
                None
            }
        }
    }
}

/// Split an asset into practice words: trimmed, at least three characters,
/// first occurrence of each word kept
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|word| word.chars().count() >= MIN_WORD_CHARS)
        .unique()
        .map(str::to_owned)
        .collect()
}

/// Immutable word lists for every supported language
#[derive(Debug, Clone, Default)]
pub struct WordLists {
    lists: HashMap<Language, Vec<String>>,
}

impl WordLists {
    /// Load every language once; a missing asset becomes an empty list
    pub fn load(loader: &dyn WordAssetLoader) -> Self {
        let lists = Language::ALL
            .into_iter()
            .map(|language| {
                let words = match loader.load(language) {
                    Some(text) => parse_word_list(&text),
                    None => {
                        warn!(%language, "no word asset, language will sample nothing");
                        Vec::new()
                    }
                };
                debug!(%language, count = words.len(), "loaded word list");
                (language, words)
            })
            .collect();

        Self { lists }
    }

    pub fn embedded() -> Self {
        Self::load(&EmbeddedAssets)
    }

    /// Build from explicit lists; words are used as given
    pub fn from_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = (Language, Vec<String>)>,
    {
        Self {
            lists: lists.into_iter().collect(),
        }
    }

    pub fn words(&self, language: Language) -> &[String] {
        self.lists
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
