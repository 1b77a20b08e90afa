//! The serialized index.

use std::{
    collections::{BTreeMap, HashSet},
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    registry::{FontEntry, FontIndex},
    Error,
};

/// The default name of the output file.
pub const DEFAULT_OUTPUT: &str = "fonts.json";

/// The complete output of an index build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontIndexDocument {
    /// All indexed fonts; a font's position is its index.
    pub fonts: Vec<FontEntry>,
    /// Each decoded name, mapped to the fonts that declare it.
    pub name_to_idxes: BTreeMap<String, Vec<FontIndex>>,
}

impl FontIndexDocument {
    /// The fonts declaring `name`.
    pub fn fonts_named(&self, name: &str) -> impl Iterator<Item = &FontEntry> + '_ {
        self.name_to_idxes
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|idx| self.fonts.get(*idx))
    }

    /// Check that every index is in bounds and that nothing is duplicated.
    pub fn validate(&self) -> Result<(), Error> {
        let mut paths = HashSet::new();
        for font in &self.fonts {
            if !paths.insert(font.path.as_str()) {
                return Err(Error::InvalidIndex(format!(
                    "font '{}' listed more than once",
                    font.path
                )));
            }
        }
        for (name, idxes) in &self.name_to_idxes {
            let mut seen = HashSet::new();
            for idx in idxes {
                if *idx >= self.fonts.len() {
                    return Err(Error::InvalidIndex(format!(
                        "name '{name}' refers to font {idx}, but there are only {} fonts",
                        self.fonts.len()
                    )));
                }
                if !seen.insert(*idx) {
                    return Err(Error::InvalidIndex(format!(
                        "name '{name}' lists font {idx} more than once"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Write `document` to `path` as JSON, replacing any existing file.
///
/// The document is written to a temporary file next to `path` and then
/// renamed into place, so a failed write never leaves a partial or missing
/// index behind. On unix the file is readable by everyone (mode `0644`).
pub fn write_index(path: &Path, document: &FontIndexDocument) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    let mut writer = BufWriter::new(temp);
    serde_json::to_writer(&mut writer, document)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(path, e))?;
    let temp = writer
        .into_inner()
        .map_err(|e| Error::io(path, e.into_error()))?;
    // temporary files are created owner-only; the index is meant to be shared
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| Error::io(temp.path(), e))?;
    }
    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    log::info!(
        "wrote {} fonts and {} names to {}",
        document.fonts.len(),
        document.name_to_idxes.len(),
        path.display()
    );
    Ok(())
}

/// Read back a document written by [`write_index`].
pub fn read_index(path: &Path) -> Result<FontIndexDocument, Error> {
    let contents = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_slice(&contents)?)
}
