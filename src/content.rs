//! Multilingual article records and the single-language merge rule.
//!
//! A record's `title` and `content` map language codes to localized strings.
//! Older records store a bare string instead of a map; those are normalized
//! under the record's original language before anything reads or merges them.
//! Edits always touch exactly one language and carry every other entry over
//! unchanged.

use crate::error::{AdminError, Result};
use crate::i18n::{Language, LanguageRegistry};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Language code -> localized string, in server key order.
pub type LocalizedMap = IndexMap<String, String>;

/// A title or content field as the server stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Localized(LocalizedMap),
    /// Pre-multilingual records: one string in the original language
    LegacyScalar(String),
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Localized(LocalizedMap::new())
    }
}

impl LocalizedText {
    /// Coerce into a mapping, keying a legacy scalar under `legacy_lang`.
    pub fn into_map(self, legacy_lang: &str) -> LocalizedMap {
        match self {
            LocalizedText::Localized(map) => map,
            LocalizedText::LegacyScalar(text) => {
                let mut map = LocalizedMap::new();
                map.insert(legacy_lang.to_string(), text);
                map
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, LocalizedText::LegacyScalar(_))
    }

    /// Best text to show for `code`: its own entry, else the first entry.
    pub fn display_in(&self, code: &str) -> Option<&str> {
        match self {
            LocalizedText::Localized(map) => map
                .get(code)
                .or_else(|| map.values().next())
                .map(String::as_str),
            LocalizedText::LegacyScalar(text) => Some(text),
        }
    }
}

/// Per-language pair found on some older records under `translations`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// An article as returned by the news server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawArticleRecord")]
pub struct ArticleRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub original_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub translations: IndexMap<String, Translation>,
    pub views: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape; the server sends `_id`, sometimes alongside a virtual `id`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticleRecord {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    title: LocalizedText,
    #[serde(default)]
    content: LocalizedText,
    #[serde(default)]
    original_lang: String,
    cover_image: Option<String>,
    #[serde(default)]
    translations: IndexMap<String, Translation>,
    #[serde(default)]
    views: u64,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawArticleRecord> for ArticleRecord {
    type Error = String;

    fn try_from(raw: RawArticleRecord) -> std::result::Result<Self, Self::Error> {
        let id = raw
            .mongo_id
            .or(raw.id)
            .ok_or_else(|| "article record has neither `_id` nor `id`".to_string())?;

        Ok(ArticleRecord {
            id,
            title: raw.title,
            content: raw.content,
            original_lang: raw.original_lang,
            cover_image: raw.cover_image.filter(|c| !c.is_empty()),
            translations: raw.translations,
            views: raw.views,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

/// Title and content of a record, both as mappings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedContent {
    pub title: LocalizedMap,
    pub content: LocalizedMap,
}

impl NormalizedContent {
    pub fn title_for(&self, code: &str) -> Option<&str> {
        self.title.get(code).map(String::as_str)
    }

    pub fn content_for(&self, code: &str) -> Option<&str> {
        self.content.get(code).map(String::as_str)
    }

    pub fn has_language(&self, code: &str) -> bool {
        self.title.contains_key(code) || self.content.contains_key(code)
    }

    /// Codes present in either mapping, title keys first.
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.title.keys().map(String::as_str).collect();
        for code in self.content.keys() {
            if !codes.contains(&code.as_str()) {
                codes.push(code);
            }
        }
        codes
    }

    /// Codes present in one mapping but not the other.
    ///
    /// A non-empty result is a transient state the console tolerates, not a
    /// corrupt record.
    pub fn incomplete_languages(&self) -> Vec<&str> {
        self.languages()
            .into_iter()
            .filter(|code| self.title.contains_key(*code) != self.content.contains_key(*code))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.incomplete_languages().is_empty()
    }
}

impl ArticleRecord {
    /// Key used for legacy scalar fields.
    ///
    /// An empty `originalLang` on a legacy record falls back to the first
    /// supported language so the text is never dropped.
    pub fn legacy_key(&self) -> &str {
        if self.original_lang.is_empty() {
            LanguageRegistry::get().fallback().code
        } else {
            &self.original_lang
        }
    }

    /// Title/content as stored, coerced into mappings.
    ///
    /// This is the base every edit merges onto; legacy `translations` are
    /// never part of it.
    pub fn stored(&self) -> NormalizedContent {
        let key = self.legacy_key();
        NormalizedContent {
            title: self.title.clone().into_map(key),
            content: self.content.clone().into_map(key),
        }
    }

    /// Display view of title/content.
    ///
    /// Legacy `translations` entries only fill languages that neither
    /// mapping already carries. Used for prefill, preview and listing.
    pub fn normalized(&self) -> NormalizedContent {
        let mut normalized = self.stored();

        for (code, translation) in &self.translations {
            if normalized.has_language(code) {
                continue;
            }
            normalized
                .title
                .insert(code.clone(), translation.title.clone());
            normalized
                .content
                .insert(code.clone(), translation.content.clone());
        }

        normalized
    }

    /// Original language as a supported `Language`, if it is one.
    pub fn original_language(&self) -> Option<Language> {
        Language::from_code(&self.original_lang).ok()
    }
}

/// The record payload produced by a single-language edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEdit {
    pub title: LocalizedMap,
    pub content: LocalizedMap,
    /// The edited language becomes the authoritative one.
    pub original_lang: String,
}

/// Partial update body for `PUT /news/{id}` sent as JSON.
///
/// Omitted fields are left untouched by the server, which is how a
/// metadata-only update leaves content alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<LocalizedMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_lang: Option<String>,
}

impl ArticleUpdate {
    pub fn original_lang_only(lang: Language) -> Self {
        Self {
            original_lang: Some(lang.code().to_string()),
            ..Self::default()
        }
    }
}

impl From<LanguageEdit> for ArticleUpdate {
    fn from(edit: LanguageEdit) -> Self {
        Self {
            title: Some(edit.title),
            content: Some(edit.content),
            original_lang: Some(edit.original_lang),
        }
    }
}

/// Trim a required field, failing when nothing is left.
pub(crate) fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Merge an edit of one language into an existing record.
///
/// Only the `lang` entry of each mapping is inserted or overwritten; all
/// other stored entries come through byte-for-byte and legacy
/// `translations` are left out. Pure: no request is made here.
///
/// # Errors
/// `AdminError::Validation` when the trimmed title or content is empty.
pub fn apply_language_edit(
    existing: &ArticleRecord,
    lang: Language,
    new_title: &str,
    new_content: &str,
) -> Result<LanguageEdit> {
    let title = require_text(new_title, "Title")?;
    let content = require_text(new_content, "Content")?;

    let NormalizedContent {
        title: mut titles,
        content: mut contents,
    } = existing.stored();

    titles.insert(lang.code().to_string(), title.to_string());
    contents.insert(lang.code().to_string(), content.to_string());

    Ok(LanguageEdit {
        title: titles,
        content: contents,
        original_lang: lang.code().to_string(),
    })
}
