use serde::{Deserialize, Serialize};

/// Practice languages with a bundled word list
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum Language {
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    English,
    #[strum(serialize = "es")]
    #[serde(rename = "es")]
    Spanish,
    #[strum(serialize = "fr")]
    #[serde(rename = "fr")]
    French,
    #[strum(serialize = "de")]
    #[serde(rename = "de")]
    German,
    #[strum(serialize = "pt")]
    #[serde(rename = "pt")]
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Portuguese,
    ];

    pub const DEFAULT: Language = Language::English;

    /// Exact match on the short tag (`en`, `es`, ...)
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.to_string() == tag)
    }

    /// Like `from_tag`, but unknown tags fall back to the default language
    pub fn resolve(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::DEFAULT)
    }

    /// File name of the word asset backing this language
    pub fn asset_file_name(&self) -> String {
        format!("{self}.txt")
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::DEFAULT
    }
}
