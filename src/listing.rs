//! Paginated article list.
//!
//! The server decides what is on each page and how many pages exist. The
//! projection language only changes how fetched rows are displayed; list
//! requests never depend on it.

use crate::api::NewsClient;
use crate::content::ArticleRecord;
use crate::error::Result;
use crate::i18n::Language;
use crate::notify::{Notice, Notifier};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error, info};

/// Characters of content shown per row.
pub const EXCERPT_LENGTH: usize = 100;

/// One article projected into a language for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub views: u64,
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the record has an entry for the projected language
    pub has_translation: bool,
}

impl ArticleRow {
    pub fn project(record: &ArticleRecord, lang: Language) -> Self {
        let normalized = record.normalized();
        Self {
            id: record.id.clone(),
            title: normalized.title_for(lang.code()).unwrap_or_default().to_string(),
            excerpt: excerpt(
                normalized.content_for(lang.code()).unwrap_or_default(),
                EXCERPT_LENGTH,
            ),
            views: record.views,
            created_at: record.created_at,
            has_translation: normalized.has_language(lang.code()),
        }
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Plain-text prefix of HTML content, at most `max_chars` characters plus
/// `...` when something was cut.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = tag_regex().replace_all(html, "");
    let text = text.trim();

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Page-driven list controller.
pub struct NewsList {
    client: NewsClient,
    lang: Language,
    page: u32,
    total_pages: u32,
    records: Vec<ArticleRecord>,
}

impl NewsList {
    pub fn new(client: NewsClient, lang: Language) -> Self {
        Self {
            client,
            lang,
            page: 1,
            total_pages: 0,
            records: Vec::new(),
        }
    }

    /// Fetch `page` (clamped to at least 1). On failure the previous page
    /// stays displayed.
    pub async fn load(&mut self, page: u32) -> Result<()> {
        let page = page.max(1);
        let result = self.client.list_news(page).await?;
        debug!(
            "Loaded page {} of {} ({} articles)",
            page,
            result.total_pages,
            result.data.len()
        );

        self.page = page;
        self.total_pages = result.total_pages;
        self.records = result.data;
        Ok(())
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Go to the next page. Returns `false` without a request on the last page.
    pub async fn next(&mut self) -> Result<bool> {
        if !self.has_next() {
            return Ok(false);
        }
        self.load(self.page + 1).await?;
        Ok(true)
    }

    /// Go to the previous page. Returns `false` without a request on page 1.
    pub async fn previous(&mut self) -> Result<bool> {
        if !self.has_previous() {
            return Ok(false);
        }
        self.load(self.page - 1).await?;
        Ok(true)
    }

    pub fn set_language(&mut self, lang: Language) {
        self.lang = lang;
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn record(&self, id: &str) -> Option<&ArticleRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Current page projected into the selected language.
    pub fn rows(&self) -> Vec<ArticleRow> {
        self.records
            .iter()
            .map(|record| ArticleRow::project(record, self.lang))
            .collect()
    }

    /// Delete an article after `confirm` accepts it, then refresh the page.
    ///
    /// Returns `Ok(false)` when declined; nothing is sent in that case. If
    /// the current page disappears with the deletion, the list steps back
    /// to the new last page.
    pub async fn delete<F>(&mut self, id: &str, confirm: F, notifier: &dyn Notifier) -> Result<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(id) {
            debug!("Delete of {} declined", id);
            return Ok(false);
        }

        if let Err(e) = self.client.delete_news(id).await {
            error!("Delete error for article {}: {}", id, e);
            notifier.notify(Notice::error("Failed to delete article"));
            return Err(e);
        }
        info!("Article {} deleted", id);
        notifier.notify(Notice::success("Article deleted"));

        self.load(self.page).await?;
        if self.page > 1 && self.page > self.total_pages {
            self.load(self.total_pages.max(1)).await?;
        }
        Ok(true)
    }
}
