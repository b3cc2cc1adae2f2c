//! Analytics dashboard: server-computed figures, display only.

use crate::content::LocalizedText;
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Response of `GET /news/admin/analytics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_views_today: u64,
    #[serde(default)]
    pub new_articles_today: u64,
    #[serde(default)]
    pub avg_views: f64,
    /// Free-form series the dashboard does not interpret
    #[serde(default)]
    pub analytics: Vec<serde_json::Value>,
    #[serde(default)]
    pub top_news: Vec<TopArticle>,
    #[serde(default)]
    pub daily_views: Vec<DailyViews>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopArticle {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    pub date: String,
    #[serde(default)]
    pub views: u64,
}

const BAR_WIDTH: usize = 40;

/// Group digits in threes: 1234567 -> "1,234,567".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.max(usize::from(value > 0)))
}

/// Text rendering of the dashboard, with top-article titles shown in `lang`.
pub fn render_report(summary: &AnalyticsSummary, lang: Language) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Analytics Dashboard");
    let _ = writeln!(out, "===================");
    let _ = writeln!(out, "Total views today:      {:>12}", format_count(summary.total_views_today));
    let _ = writeln!(out, "Total news articles:    {:>12}", format_count(summary.total));
    let _ = writeln!(out, "New articles today:     {:>12}", format_count(summary.new_articles_today));
    let _ = writeln!(
        out,
        "Average views/article:  {:>12}",
        format_count(summary.avg_views.max(0.0).round() as u64)
    );

    if !summary.daily_views.is_empty() {
        let max = summary.daily_views.iter().map(|d| d.views).max().unwrap_or(0);
        let _ = writeln!(out, "\nDaily News Views");
        for day in &summary.daily_views {
            let _ = writeln!(
                out,
                "{:<12} {:>10} {}",
                day.date,
                format_count(day.views),
                bar(day.views, max)
            );
        }
    }

    if !summary.top_news.is_empty() {
        let _ = writeln!(out, "\nTop News Articles");
        for (i, article) in summary.top_news.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {} ({} views)",
                i + 1,
                article.title.display_in(lang.code()).unwrap_or("(untitled)"),
                format_count(article.views)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Built from text so `topNews` titles keep their key order.
    fn create_summary() -> AnalyticsSummary {
        serde_json::from_str(
            r#"{
                "total": 156,
                "totalViewsToday": 2200,
                "newArticlesToday": 5,
                "avgViews": 1450.4,
                "analytics": [{"anything": true}],
                "topNews": [
                    {"_id": "a1", "title": {"en": "Breaking News 1", "de": "Eilmeldung 1"}, "views": 5000},
                    {"_id": "a2", "title": "Legacy headline", "views": 4500}
                ],
                "dailyViews": [
                    {"date": "2024-03-01", "views": 1200},
                    {"date": "2024-03-02", "views": 2400}
                ]
            }"#,
        )
        .expect("Should deserialize")
    }

    #[test]
    fn test_summary_deserialization() {
        let summary = create_summary();
        assert_eq!(summary.total, 156);
        assert_eq!(summary.total_views_today, 2200);
        assert_eq!(summary.top_news[0].id.as_deref(), Some("a1"));
        assert!(summary.top_news[1].title.is_legacy());
        assert_eq!(summary.daily_views[1].views, 2400);
        assert_eq!(summary.analytics.len(), 1);
    }

    #[test]
    fn test_empty_summary_defaults() {
        let summary: AnalyticsSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary, AnalyticsSummary::default());
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(2200), "2,200");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(2400, 2400).chars().count(), BAR_WIDTH);
        assert_eq!(bar(1200, 2400).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1_000_000).chars().count(), 1);
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn test_render_report_in_german() {
        let report = render_report(&create_summary(), Language::GERMAN);
        assert!(report.contains("2,200"));
        assert!(report.contains("1,450"));
        assert!(report.contains("Eilmeldung 1 (5,000 views)"));
        assert!(report.contains("Legacy headline"));
        assert!(report.contains("2024-03-02"));
    }

    #[test]
    fn test_render_report_falls_back_to_first_title() {
        let report = render_report(&create_summary(), Language::from_code("fr").unwrap());
        assert!(report.contains("Breaking News 1"));
    }

    #[test]
    fn test_render_empty_report() {
        let report = render_report(&AnalyticsSummary::default(), Language::ENGLISH);
        assert!(report.contains("Analytics Dashboard"));
        assert!(!report.contains("Top News"));
        assert!(!report.contains("Daily News Views"));
    }
}
