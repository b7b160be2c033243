// src/sources/board.rs

//! Selector-driven HTML bulletin board adapter.
//!
//! Covers the common university board layout: a table or list of rows,
//! each with a title anchor, a date cell, and optionally a pinned badge
//! and a category label. All per-site variation is carried by the
//! descriptor's `BoardSelectors` and `date_formats`.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{AdapterKind, BoardSelectors, Config, NoticeRecord, SourceDescriptor};
use crate::sources::SourceAdapter;
use crate::utils::date::{now_in, parse_notice_date};
use crate::utils::resolve_url;

/// Adapter for selector-driven notice boards.
pub struct BoardAdapter {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl BoardAdapter {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Parse a fetched board page into records.
    ///
    /// Sync on purpose: `scraper::Html` is not `Send`, so the document
    /// must not live across an await point.
    fn parse_page(&self, source: &SourceDescriptor, html: &str) -> Result<Vec<NoticeRecord>> {
        let selectors = source.selectors.as_ref().ok_or_else(|| {
            AppError::config(format!("Board source '{}' has no selectors", source.id))
        })?;
        let compiled = CompiledSelectors::compile(selectors)?;

        let base_url = url::Url::parse(&source.url)?;
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for row in document
            .select(&compiled.row)
            .take(self.config.http.max_records_per_poll)
        {
            match self.parse_row(source, selectors, &compiled, &row, &base_url) {
                Some(record) => records.push(record),
                None => {
                    log::debug!("Skipping incomplete row for source {}", source.id);
                }
            }
        }

        if records.is_empty() && document.select(&compiled.row).next().is_none() {
            // Zero matching rows usually means the page layout changed.
            return Err(AppError::parse(
                &source.id,
                format!("No rows matched '{}'", selectors.row_selector),
            ));
        }

        Ok(records)
    }

    fn parse_row(
        &self,
        source: &SourceDescriptor,
        selectors: &BoardSelectors,
        compiled: &CompiledSelectors,
        row: &ElementRef,
        base_url: &url::Url,
    ) -> Option<NoticeRecord> {
        let cleaning = &self.config.cleaning;

        let title_elem = row.select(&compiled.title).next()?;
        let date_elem = row.select(&compiled.date).next()?;

        let mut title = cleaning.clean_title(&title_elem.text().collect::<String>());
        title = recover_elided_title(&title, &title_elem, cleaning);
        if title.is_empty() {
            return None;
        }

        if let Some(label_sel) = &compiled.label {
            if let Some(label_elem) = row.select(label_sel).next() {
                let label = cleaning.clean_title(&label_elem.text().collect::<String>());
                if !label.is_empty() && !title.contains(&label) {
                    title = format!("[{label}] {title}");
                }
            }
        }

        let pinned = compiled
            .pinned
            .as_ref()
            .is_some_and(|sel| row.select(sel).next().is_some());
        if pinned && !title.starts_with(&cleaning.pinned_marker) {
            title = format!("{} {}", cleaning.pinned_marker, title);
        }

        let link_elem = compiled
            .link
            .as_ref()
            .and_then(|sel| row.select(sel).next())
            .unwrap_or(title_elem);
        let raw_link = link_elem.value().attr(&selectors.attr_name).unwrap_or("");
        let link = resolve_url(base_url, raw_link);
        if raw_link.is_empty() || link.is_empty() {
            return None;
        }

        let raw_date = cleaning.clean_date(&date_elem.text().collect::<String>());
        let tz = self.config.reference_offset();
        let published = match parse_notice_date(&raw_date, &source.date_formats, &tz) {
            Some(dt) => dt,
            None => {
                // Recoverable per-record anomaly: keep the record, stamp it now.
                log::warn!(
                    "Unparseable date '{}' for source {} ({}); substituting current time",
                    raw_date,
                    source.id,
                    link
                );
                now_in(&tz)
            }
        };

        Some(NoticeRecord::new(&source.id, title, link, published))
    }
}

#[async_trait]
impl SourceAdapter for BoardAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Board
    }

    async fn fetch_and_parse(&self, source: &SourceDescriptor) -> Result<Vec<NoticeRecord>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(&source.id, e))?;
        let html = response
            .text()
            .await
            .map_err(|e| AppError::fetch(&source.id, e))?;

        self.parse_page(source, &html)
    }
}

/// Pre-parsed selectors for one page walk.
struct CompiledSelectors {
    row: Selector,
    title: Selector,
    date: Selector,
    link: Option<Selector>,
    pinned: Option<Selector>,
    label: Option<Selector>,
}

impl CompiledSelectors {
    fn compile(selectors: &BoardSelectors) -> Result<Self> {
        Ok(Self {
            row: parse_selector(&selectors.row_selector)?,
            title: parse_selector(&selectors.title_selector)?,
            date: parse_selector(&selectors.date_selector)?,
            link: selectors
                .link_selector
                .as_deref()
                .map(parse_selector)
                .transpose()?,
            pinned: selectors
                .pinned_selector
                .as_deref()
                .map(parse_selector)
                .transpose()?,
            label: selectors
                .label_selector
                .as_deref()
                .map(parse_selector)
                .transpose()?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Recover a truncated title from the element's full-text attribute.
///
/// Boards often elide long titles in the anchor text while keeping the
/// full text in the `title` attribute.
fn recover_elided_title(
    title: &str,
    elem: &ElementRef,
    cleaning: &crate::models::CleaningConfig,
) -> String {
    if title.ends_with("...") || title.ends_with('…') {
        if let Some(full) = elem.value().attr("title") {
            let full = cleaning.clean_title(full);
            if !full.is_empty() {
                return full;
            }
        }
    }
    title.to_string()
}
