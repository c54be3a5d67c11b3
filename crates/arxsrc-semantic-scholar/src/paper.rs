//! Paper: Semantic Scholar metadata plus full text from the source archive

use anyhow::Context;
use arxsrc_archive::EntrySource;

use crate::api;
use crate::config::S2Config;
use crate::schema::PaperMetadata;

#[derive(Debug, Clone)]
pub struct Paper {
    pub arxiv_id: String,
    /// Metadata collected from the Semantic Scholar API
    pub meta: PaperMetadata,
}

impl Paper {
    /// Look the paper up on Semantic Scholar.
    pub fn fetch(arxiv_id: &str, config: &S2Config) -> anyhow::Result<Self> {
        let meta = api::fetch_metadata(config, arxiv_id)?;
        Ok(Self::from_metadata(arxiv_id, meta))
    }

    pub fn from_metadata(arxiv_id: &str, meta: PaperMetadata) -> Self {
        Self {
            arxiv_id: arxiv_id.to_string(),
            meta,
        }
    }

    /// Load the paper's full text from a data source or working context.
    ///
    /// Fails if the entry is missing or its format carries no text.
    pub fn load_full_text<S>(&self, source: &mut S) -> anyhow::Result<String>
    where
        S: EntrySource + ?Sized,
    {
        let entry = source
            .load_entry(&self.arxiv_id)
            .with_context(|| format!("Failed to load entry {}", self.arxiv_id))?;
        entry.contents().map(str::to_string).with_context(|| {
            format!("entry {} does not have full text available", self.arxiv_id)
        })
    }

    /// Shortcut for `self.meta.title`.
    pub fn title(&self) -> &str {
        &self.meta.title
    }
}
