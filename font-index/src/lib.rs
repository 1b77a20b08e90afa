//! Build a lookup index from font names to font files.
//!
//! Indexing happens in two steps. [`scan_directory`] walks a directory of
//! font files and records the raw bytes of each font's full and PostScript
//! names in a SQLite [`Store`]. [`generate`] then reads those records back,
//! decodes each one according to its platform and encoding ids, and writes a
//! JSON [`FontIndexDocument`] mapping every decoded name to the fonts that
//! declare it.

pub mod encoding;
mod error;
pub mod names;
pub mod output;
pub mod registry;
pub mod scan;
pub mod store;

use std::path::Path;

pub use encoding::{decode_name, is_valid_name, DecodeError, NameEncoding};
pub use error::Error;
pub use names::NameIndex;
pub use output::{read_index, write_index, FontIndexDocument, DEFAULT_OUTPUT};
pub use registry::{FontEntry, FontIndex, FontRegistry};
pub use scan::{scan_directory, ScanSummary};
pub use store::{NameRow, Store};

/// What to do with a name record that can't be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Stop the build with an error.
    #[default]
    Abort,
    /// Log a warning and leave the record out of the index.
    Skip,
}

/// Accumulates name rows into an index.
#[derive(Debug, Default)]
pub struct Indexer {
    policy: DecodePolicy,
    fonts: FontRegistry,
    names: NameIndex,
    skipped: usize,
    filtered: usize,
}

impl Indexer {
    pub fn new(policy: DecodePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Decode `row` and add its name to the index.
    ///
    /// Names containing a null are dropped. Fonts are only registered once
    /// one of their names has been accepted.
    pub fn add_row(&mut self, row: &NameRow) -> Result<(), Error> {
        let name = match decode_name(row.platform_id, row.encoding_id, &row.raw) {
            Ok(name) => name,
            Err(source) if self.policy == DecodePolicy::Skip => {
                log::warn!(
                    "skipping name {} in '{}': {source}",
                    row.name_id,
                    row.path
                );
                self.skipped += 1;
                return Ok(());
            }
            Err(source) => {
                return Err(Error::Decode {
                    path: row.path.clone(),
                    source,
                })
            }
        };
        if !is_valid_name(&name) {
            log::debug!(
                "dropping name {} in '{}' ({}, {}): contains null",
                row.name_id,
                row.path,
                row.platform_id,
                row.encoding_id
            );
            self.filtered += 1;
            return Ok(());
        }
        let idx = self.fonts.resolve(&row.path, row.size);
        self.names.add(&name, idx);
        Ok(())
    }

    /// Records left out because they could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Records left out because their decoded name contained a null.
    pub fn filtered(&self) -> usize {
        self.filtered
    }

    pub fn finish(self) -> FontIndexDocument {
        log::info!(
            "indexed {} names across {} fonts ({} undecodable, {} invalid)",
            self.names.len(),
            self.fonts.len(),
            self.skipped,
            self.filtered
        );
        FontIndexDocument {
            fonts: self.fonts.into_entries(),
            name_to_idxes: self.names.into_lists(),
        }
    }
}

/// Build an index from every name row in `store`.
pub fn build_index(store: &Store, policy: DecodePolicy) -> Result<FontIndexDocument, Error> {
    let mut indexer = Indexer::new(policy);
    store.for_each_name_row(|row| indexer.add_row(&row))?;
    Ok(indexer.finish())
}

/// Read the database at `db_path` and write its index to `output`.
///
/// Nothing is written unless the whole index was built.
pub fn generate(
    db_path: &Path,
    output: &Path,
    policy: DecodePolicy,
) -> Result<FontIndexDocument, Error> {
    let store = Store::open(db_path)?;
    let document = build_index(&store, policy)?;
    write_index(output, &document)?;
    Ok(document)
}
