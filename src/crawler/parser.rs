//! HTML parser for the archive index pages
//!
//! This module reads the two listing pages pipermail generates:
//! - The top-level index, one table row per month
//! - A month's date view, one list item per message

use chrono::Month;
use scraper::{ElementRef, Html, Selector};
use std::cmp::Reverse;

/// One month row of the top-level archive index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthArchive {
    pub year: i32,
    pub month: Month,

    /// Directory name used both remotely and locally, e.g. `2009-February`
    pub name: String,

    /// Link to the month's downloadable text archive, e.g. `2009-February.txt.gz`
    pub text_archive: Option<String>,
}

impl MonthArchive {
    /// Parses a month label as printed in the index, e.g. `February 2009:`
    pub fn from_label(label: &str, text_archive: Option<String>) -> Option<Self> {
        let mut parts = label.split_whitespace();
        let month: Month = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.trim_end_matches(':').parse().ok()?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            year,
            month,
            name: format!("{}-{}", year, month.name()),
            text_archive,
        })
    }
}

/// Parses the top-level index into its months, newest first
///
/// Only the first table on the page is read, and its header row is skipped.
/// Rows whose first cell is not a month label are ignored.
pub fn parse_month_index(html: &str) -> Vec<MonthArchive> {
    let document = Html::parse_document(html);
    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector), Ok(link_selector)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("td"),
        Selector::parse("a[href]"),
    ) else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_selector).next() else {
        tracing::warn!("Archive index has no month table");
        return Vec::new();
    };

    let mut months: Vec<MonthArchive> = table
        .select(&row_selector)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_selector).collect();
            let label: String = cells.first()?.text().collect();
            let text_archive = cells
                .get(2)
                .and_then(|cell| cell.select(&link_selector).next())
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string);

            let month = MonthArchive::from_label(&label, text_archive);
            if month.is_none() {
                tracing::debug!("Skipping index row '{}'", label.trim());
            }
            month
        })
        .collect();

    months.sort_by_key(|m| Reverse((m.year, m.month.number_from_month())));
    months
}

/// Parses a month's date view into message links
///
/// Links are returned in reverse document order. Pipermail lists messages
/// oldest first, so the newest message comes first.
pub fn parse_message_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let (Ok(list_selector), Ok(link_selector)) =
        (Selector::parse("h1 ~ ul"), Selector::parse("a[href]"))
    else {
        return Vec::new();
    };

    // The first list holds the sort-by links, the second the messages
    let Some(messages) = document.select(&list_selector).nth(1) else {
        return Vec::new();
    };

    let mut links: Vec<String> = messages
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect();
    links.reverse();
    links
}
