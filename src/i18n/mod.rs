//! Supported languages for article content.
//!
//! - `registry`: the ordered Supported Language Set and its metadata
//! - `language`: the validated `Language` type used by forms and the merger
//!
//! # Example
//!
//! ```rust,ignore
//! use news_admin::i18n::{Language, LanguageRegistry};
//!
//! let german = Language::from_code("de")?;
//! let all = LanguageRegistry::get().list();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
