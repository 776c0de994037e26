//! Language codes and the read-only text catalog seam.
//!
//! The full translated string table lives outside this crate; callers inject it
//! through [`Catalog`]. [`EnglishCatalog`] is the built-in fallback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language code: {raw}")]
pub struct ParseLanguageError {
    raw: String,
}

/// Languages selectable on the language picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Ja,
    Ko,
    Zh,
    Ru,
    Ar,
    Hi,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 12] = [
        LanguageCode::En,
        LanguageCode::Es,
        LanguageCode::Fr,
        LanguageCode::De,
        LanguageCode::It,
        LanguageCode::Pt,
        LanguageCode::Ja,
        LanguageCode::Ko,
        LanguageCode::Zh,
        LanguageCode::Ru,
        LanguageCode::Ar,
        LanguageCode::Hi,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::De => "de",
            LanguageCode::It => "it",
            LanguageCode::Pt => "pt",
            LanguageCode::Ja => "ja",
            LanguageCode::Ko => "ko",
            LanguageCode::Zh => "zh",
            LanguageCode::Ru => "ru",
            LanguageCode::Ar => "ar",
            LanguageCode::Hi => "hi",
        }
    }

    /// English name of the language.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Es => "Spanish",
            LanguageCode::Fr => "French",
            LanguageCode::De => "German",
            LanguageCode::It => "Italian",
            LanguageCode::Pt => "Portuguese",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Ko => "Korean",
            LanguageCode::Zh => "Chinese",
            LanguageCode::Ru => "Russian",
            LanguageCode::Ar => "Arabic",
            LanguageCode::Hi => "Hindi",
        }
    }

    /// Name of the language in the language itself.
    #[must_use]
    pub fn native_name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Es => "Español",
            LanguageCode::Fr => "Français",
            LanguageCode::De => "Deutsch",
            LanguageCode::It => "Italiano",
            LanguageCode::Pt => "Português",
            LanguageCode::Ja => "日本語",
            LanguageCode::Ko => "한국어",
            LanguageCode::Zh => "中文",
            LanguageCode::Ru => "Русский",
            LanguageCode::Ar => "العربية",
            LanguageCode::Hi => "हिन्दी",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for LanguageCode {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLanguageError { raw: s.to_string() })
    }
}

/// Keys of the strings the challenge engine reads from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextKey {
    NewRecord,
    Completed,
    GameOver,
    TimeUp,
    Score,
    Best,
    Time,
    Level,
    Streak,
    Accuracy,
    Reaction,
}

impl TextKey {
    #[must_use]
    pub fn english(self) -> &'static str {
        match self {
            TextKey::NewRecord => "New Record!",
            TextKey::Completed => "Completed!",
            TextKey::GameOver => "Game Over",
            TextKey::TimeUp => "Time's Up!",
            TextKey::Score => "Score",
            TextKey::Best => "Best",
            TextKey::Time => "Time",
            TextKey::Level => "Level",
            TextKey::Streak => "Streak",
            TextKey::Accuracy => "Accuracy",
            TextKey::Reaction => "Avg Reaction",
        }
    }
}

/// Read-only mapping from language and key to display text.
pub trait Catalog: Send + Sync {
    fn text(&self, language: LanguageCode, key: TextKey) -> &str;
}

/// Catalog that answers every language in English.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishCatalog;

impl Catalog for EnglishCatalog {
    fn text(&self, _language: LanguageCode, key: TextKey) -> &str {
        key.english()
    }
}

/// Catalog backed by an in-memory table, falling back to English for missing entries.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    entries: HashMap<(LanguageCode, TextKey), String>,
}

impl TableCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, language: LanguageCode, key: TextKey, text: impl Into<String>) -> Self {
        self.entries.insert((language, key), text.into());
        self
    }

    /// The dialog strings shipped with the game; everything else reads in English.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_DIALOG
            .iter()
            .fold(Self::new(), |catalog, (language, [record, completed, time, best])| {
                catalog
                    .with(*language, TextKey::NewRecord, *record)
                    .with(*language, TextKey::Completed, *completed)
                    .with(*language, TextKey::Time, *time)
                    .with(*language, TextKey::Best, *best)
            })
    }
}

// new record, completed, time, best
const BUILTIN_DIALOG: [(LanguageCode, [&str; 4]); 7] = [
    (LanguageCode::Es, ["¡Nuevo Récord!", "¡Completado!", "Tiempo", "Mejor"]),
    (LanguageCode::Fr, ["Nouveau Record!", "Terminé!", "Temps", "Meilleur"]),
    (LanguageCode::De, ["Neuer Rekord!", "Abgeschlossen!", "Zeit", "Beste"]),
    (LanguageCode::It, ["Nuovo Record!", "Completato!", "Tempo", "Migliore"]),
    (LanguageCode::Pt, ["Novo Recorde!", "Concluído!", "Tempo", "Melhor"]),
    (LanguageCode::Ja, ["新記録!", "完了!", "時間", "ベスト"]),
    (LanguageCode::Ko, ["신기록!", "완료!", "시간", "최고"]),
];

impl Catalog for TableCatalog {
    fn text(&self, language: LanguageCode, key: TextKey) -> &str {
        self.entries
            .get(&(language, key))
            .map_or_else(|| key.english(), String::as_str)
    }
}
