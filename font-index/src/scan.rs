//! Extraction of raw names from a directory of font files.

use std::path::Path;

use read_fonts::{
    tables::name::{Name, NameRecord},
    types::NameId,
    FileRef, FontRef, ReadError, TableProvider,
};
use walkdir::WalkDir;

use crate::{
    store::{RawName, Store, Writer},
    Error,
};

/// The name ids we index.
pub const INDEXED_NAME_IDS: [NameId; 2] = [NameId::FULL_NAME, NameId::POSTSCRIPT_NAME];

/// Counts from a completed scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files visited.
    pub files: usize,
    /// Fonts parsed; a collection counts each member.
    pub fonts: usize,
    /// Name records stored.
    pub names: usize,
    /// Files recorded as unparseable.
    pub errors: usize,
}

/// Record every file under `root`, and the indexed names of each font, in `store`.
///
/// Paths are stored relative to `root` with `/` separators. Symbolic links
/// are followed, and a file reached through a link is stored under the
/// linked path. Files that can't be read as fonts are recorded in the error
/// table rather than failing the scan.
pub fn scan_directory(root: &Path, store: &mut Store) -> Result<ScanSummary, Error> {
    let writer = store.writer()?;
    let mut summary = ScanSummary::default();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                log::warn!("{e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        // links are resolved, so this also skips sockets, fifos and the like
        if !entry.file_type().is_file() {
            continue;
        }
        let rel_path = relative_path(root, entry.path());
        log::info!("{rel_path}");
        let data = std::fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        summary.files += 1;
        writer.insert_font(&rel_path, data.len() as u64)?;
        scan_file(&rel_path, &data, &writer, &mut summary)?;
    }
    writer.commit()?;
    log::info!(
        "scanned {} files: {} fonts, {} names, {} errors",
        summary.files,
        summary.fonts,
        summary.names,
        summary.errors
    );
    Ok(summary)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

fn scan_file(
    path: &str,
    data: &[u8],
    writer: &Writer,
    summary: &mut ScanSummary,
) -> Result<(), Error> {
    let file = match FileRef::new(data) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("'{path}' is not a font: {e}");
            summary.errors += 1;
            return writer.insert_error(path);
        }
    };
    for (i, font) in file.fonts().enumerate() {
        let names = font.and_then(|font| indexed_names(&font, i as u32));
        match names {
            Ok(names) => {
                summary.fonts += 1;
                for name in &names {
                    writer.insert_name(path, name)?;
                }
                summary.names += names.len();
            }
            Err(e) => {
                log::debug!("failed to read font {i} in '{path}': {e}");
                summary.errors += 1;
                writer.insert_error(path)?;
            }
        }
    }
    Ok(())
}

/// The full and PostScript names of `font`, as raw bytes.
///
/// Records with empty strings are skipped.
pub fn indexed_names<'a>(
    font: &FontRef<'a>,
    font_index: u32,
) -> Result<Vec<RawName<'a>>, ReadError> {
    let name = font.name()?;
    Ok(name
        .name_record()
        .iter()
        .filter(|record| INDEXED_NAME_IDS.contains(&record.name_id()))
        .filter_map(|record| {
            let bytes = string_bytes(&name, record)?;
            (!bytes.is_empty()).then_some(RawName {
                font_index,
                platform_id: record.platform_id(),
                encoding_id: record.encoding_id(),
                name_id: record.name_id().to_u16(),
                bytes,
            })
        })
        .collect())
}

fn string_bytes<'a>(name: &Name<'a>, record: &NameRecord) -> Option<&'a [u8]> {
    let start = record.string_offset().to_u32() as usize;
    let end = start + record.length() as usize;
    name.string_data().as_bytes().get(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use write_fonts::{
        tables::name::{Name as NameTable, NameRecord as NameTableRecord},
        FontBuilder,
    };

    fn build_font(records: &[(u16, u16, u16, &str)]) -> Vec<u8> {
        let mut name = NameTable::default();
        for (platform_id, encoding_id, name_id, string) in records {
            let language_id = if *platform_id == 3 { 0x409 } else { 0 };
            name.name_record.push(NameTableRecord::new(
                *platform_id,
                *encoding_id,
                language_id,
                NameId::new(*name_id),
                string.to_string().into(),
            ));
        }
        name.name_record.sort();
        FontBuilder::new().add_table(&name).unwrap().build()
    }

    #[test]
    fn only_full_and_postscript_names() {
        let data = build_font(&[
            (1, 0, 4, "Mac Full"),
            (3, 1, 1, "Family"),
            (3, 1, 2, "Regular"),
            (3, 1, 4, "Win Full"),
            (3, 1, 6, "Win-PS"),
        ]);
        let font = FontRef::new(&data).unwrap();
        let names = indexed_names(&font, 0).unwrap();
        let got = names
            .iter()
            .map(|n| (n.platform_id, n.encoding_id, n.name_id, n.bytes.to_vec()))
            .collect::<Vec<_>>();
        let utf16 =
            |s: &str| -> Vec<u8> { s.encode_utf16().flat_map(u16::to_be_bytes).collect() };
        assert_eq!(
            got,
            vec![
                (1, 0, 4, b"Mac Full".to_vec()),
                (3, 1, 4, utf16("Win Full")),
                (3, 1, 6, utf16("Win-PS")),
            ]
        );
    }

    #[test]
    fn empty_strings_are_skipped() {
        let data = build_font(&[(3, 1, 4, ""), (3, 1, 6, "PS")]);
        let font = FontRef::new(&data).unwrap();
        let names = indexed_names(&font, 7).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name_id, 6);
        assert_eq!(names[0].font_index, 7);
    }

    #[test]
    fn missing_name_table() {
        let data = FontBuilder::new().build();
        let font = FontRef::new(&data).unwrap();
        assert!(indexed_names(&font, 0).is_err());
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/fonts");
        assert_eq!(
            relative_path(root, &root.join("sub").join("a.ttf")),
            "sub/a.ttf"
        );
    }
}
