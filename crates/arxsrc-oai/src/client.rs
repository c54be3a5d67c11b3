//! Blocking OAI-PMH client over the shared HTTP runtime

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Context;
use arxsrc_core::{get_text, retry_with_backoff, upgrade_to_bar};
use chrono::NaiveDate;
use indicatif::ProgressBar;

use crate::config::OaiConfig;
use crate::record::{MetadataPrefix, OaiMetadata, parse_get_record, parse_list_records};

/// Expand a bare arXiv id to its OAI identifier; full identifiers pass
/// through unchanged.
pub fn oai_identifier(id: &str) -> String {
    if id.starts_with("oai:") {
        id.to_string()
    } else {
        format!("oai:arXiv.org:{id}")
    }
}

/// Selective harvesting arguments for `ListRecords`.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub set: Option<String>,
    pub prefix: MetadataPrefix,
}

impl ListRequest {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("verb", "ListRecords".to_string()),
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("until", self.until.format("%Y-%m-%d").to_string()),
            ("metadataPrefix", self.prefix.as_str().to_string()),
        ];
        if let Some(set) = &self.set {
            query.push(("set", set.clone()));
        }
        query
    }
}

pub struct OaiClient {
    config: OaiConfig,
}

impl OaiClient {
    pub fn new(config: OaiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OaiConfig {
        &self.config
    }

    fn fetch(&self, query: &[(&'static str, String)]) -> anyhow::Result<String> {
        let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        retry_with_backoff("OAI-PMH", || get_text(&self.config.url, &query, &[]))
            .with_context(|| format!("OAI-PMH request to {} failed", self.config.url))
    }

    /// Fetch one record. `identifier` may be a bare arXiv id.
    pub fn get_record(
        &self,
        identifier: &str,
        prefix: MetadataPrefix,
    ) -> anyhow::Result<OaiMetadata> {
        let identifier = oai_identifier(identifier);
        log::debug!("GetRecord {identifier} ({prefix})");
        let body = self.fetch(&[
            ("verb", "GetRecord".to_string()),
            ("identifier", identifier.clone()),
            ("metadataPrefix", prefix.as_str().to_string()),
        ])?;
        parse_get_record(&body).with_context(|| format!("Failed to parse record {identifier}"))
    }

    /// Harvest records page by page. Nothing is requested until the
    /// iterator is polled.
    ///
    /// `progress` is switched from spinner to bar when the first page
    /// reports `completeListSize`.
    pub fn list_records(
        &self,
        request: ListRequest,
        progress: Option<ProgressBar>,
    ) -> ListRecords<'_> {
        let query = request.query();
        ListRecords::new(
            Box::new(move |q| self.fetch(q)),
            query,
            self.config.paging_backoff,
            progress,
        )
    }
}

type Fetch<'a> = Box<dyn FnMut(&[(&'static str, String)]) -> anyhow::Result<String> + 'a>;

/// Lazy `ListRecords` harvest. Yields records in server order; stops after
/// the first error.
pub struct ListRecords<'a> {
    fetch: Fetch<'a>,
    /// Query for the next page; `None` once the list is complete
    next_query: Option<Vec<(&'static str, String)>>,
    buffer: VecDeque<OaiMetadata>,
    backoff: Duration,
    last_response: Option<Instant>,
    progress: Option<ProgressBar>,
    pages: usize,
}

impl<'a> ListRecords<'a> {
    fn new(
        fetch: Fetch<'a>,
        first_query: Vec<(&'static str, String)>,
        backoff: Duration,
        progress: Option<ProgressBar>,
    ) -> Self {
        Self {
            fetch,
            next_query: Some(first_query),
            buffer: VecDeque::new(),
            backoff,
            last_response: None,
            progress,
            pages: 0,
        }
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch_page(&mut self, query: Vec<(&'static str, String)>) -> anyhow::Result<()> {
        if let Some(last) = self.last_response {
            let elapsed = last.elapsed();
            if elapsed < self.backoff {
                std::thread::sleep(self.backoff - elapsed);
            }
        }

        let body = (self.fetch)(&query)?;
        self.last_response = Some(Instant::now());
        self.pages += 1;

        let page = parse_list_records(&body)
            .with_context(|| format!("Failed to parse ListRecords page {}", self.pages))?;
        log::debug!(
            "ListRecords page {}: {} records, more={}",
            self.pages,
            page.records.len(),
            page.resumption_token.is_some()
        );

        if let (Some(pb), Some(total), 1) = (&self.progress, page.complete_list_size, self.pages) {
            upgrade_to_bar(pb, total);
        }

        self.next_query = page.resumption_token.map(|token| {
            vec![
                ("verb", "ListRecords".to_string()),
                ("resumptionToken", token),
            ]
        });
        self.buffer.extend(page.records);
        Ok(())
    }
}

impl Iterator for ListRecords<'_> {
    type Item = anyhow::Result<OaiMetadata>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                return Some(Ok(record));
            }
            let Some(query) = self.next_query.take() else {
                if let Some(pb) = self.progress.take() {
                    pb.finish();
                }
                return None;
            };
            if let Err(e) = self.fetch_page(query) {
                return Some(Err(e));
            }
        }
    }
}
