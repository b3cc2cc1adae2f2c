//! Read-only HTML preview of one language of an article.

use crate::content::ArticleRecord;
use crate::i18n::Language;
use std::fmt::Write;

/// What the public page shows for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
}

/// Project one language of a record. A missing language yields empty text.
pub fn preview_for(record: &ArticleRecord, lang: Language) -> PreviewContent {
    let normalized = record.normalized();
    PreviewContent {
        title: normalized.title_for(lang.code()).unwrap_or_default().to_string(),
        content: normalized.content_for(lang.code()).unwrap_or_default().to_string(),
        cover_image: record.cover_image.clone(),
    }
}

/// Absolute URLs pass through; server-relative paths get the API base URL.
pub fn resolve_cover_src(value: &str, base_url: &str) -> String {
    if value.starts_with("http") {
        return value.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if value.starts_with('/') {
        format!("{}{}", base, value)
    } else {
        format!("{}/{}", base, value)
    }
}

/// Escape text for use inside HTML elements and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render the preview as a standalone `<article>` fragment.
///
/// The title is always escaped. Content is editor output and inserted as-is
/// unless `sanitize` is set, in which case it goes through `ammonia` first.
pub fn render_preview(preview: &PreviewContent, lang: Language, base_url: &str, sanitize: bool) -> String {
    let mut html = String::new();

    let dir = if lang.is_rtl() { "rtl" } else { "ltr" };
    let _ = writeln!(html, r#"<article lang="{}" dir="{}">"#, lang.code(), dir);

    if let Some(cover) = preview.cover_image.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(
            html,
            r#"  <img src="{}" alt="{}">"#,
            escape_html(&resolve_cover_src(cover, base_url)),
            escape_html(&preview.title)
        );
    }

    let _ = writeln!(html, "  <h1>{}</h1>", escape_html(&preview.title));

    if sanitize {
        html.push_str(&ammonia::clean(&preview.content));
    } else {
        html.push_str(&preview.content);
    }
    html.push_str("\n</article>\n");

    html
}
