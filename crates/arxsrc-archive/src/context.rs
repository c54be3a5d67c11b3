//! Working context: batched lookups sharing unpacked shards

use crate::entry::Entry;
use crate::error::{ArchiveError, Result};
use crate::id::ArxivId;
use crate::shard::Shard;
use crate::source::{ArxivDataSource, EntrySource, missing_entry};

/// A lookup session over an [`ArxivDataSource`].
///
/// Each shard is unpacked the first time one of its entries is requested
/// and stays unpacked until the context is closed (or dropped). A failed
/// lookup leaves earlier shards available to later lookups.
pub struct WorkingContext<'a> {
    source: &'a ArxivDataSource,
    /// In unpack order
    opened: Vec<Shard>,
}

impl<'a> WorkingContext<'a> {
    pub(crate) fn new(source: &'a ArxivDataSource) -> Self {
        Self {
            source,
            opened: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a ArxivDataSource {
        self.source
    }

    /// Shards unpacked by this context, in unpack order.
    pub fn opened_shards(&self) -> &[Shard] {
        &self.opened
    }

    pub fn load_entry(&mut self, id: &str) -> Result<Entry> {
        let id = ArxivId::parse(id)?;
        let shard = self.source.shard_for_id(&id)?;

        let idx = match self.opened.iter().position(|s| *s == shard) {
            Some(idx) => idx,
            None => {
                shard.unpack(self.source.extractor())?;
                self.opened.push(shard);
                self.opened.len() - 1
            }
        };

        let shard = &self.opened[idx];
        shard
            .load_entry(&id)?
            .ok_or_else(|| missing_entry(&id, shard))
    }

    /// Delete every unpacked shard, in unpack order.
    ///
    /// All deletions are attempted; the first failure is returned and the
    /// rest are logged.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let mut first_err: Option<ArchiveError> = None;
        for shard in std::mem::take(&mut self.opened) {
            if let Err(e) = shard.delete() {
                match first_err {
                    None => first_err = Some(e),
                    Some(_) => log::warn!("{}: cleanup failed: {e}", shard.name()),
                }
            }
        }
        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

impl Drop for WorkingContext<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("working context cleanup failed: {e}");
        }
    }
}

impl EntrySource for WorkingContext<'_> {
    fn load_entry(&mut self, id: &str) -> Result<Entry> {
        WorkingContext::load_entry(self, id)
    }
}
