//! Stable numbering of font files.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The position of a font in the emitted font list.
pub type FontIndex = usize;

/// A font file, as it appears in the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub path: String,
    pub size: u64,
}

/// Assigns each distinct path an index, in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    // path -> size; the map's insertion order is the font index
    fonts: IndexMap<String, u64>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index for `path`, registering it if this is the first time
    /// it has been seen.
    ///
    /// The size recorded on first registration is kept; later sizes for the
    /// same path are ignored.
    pub fn resolve(&mut self, path: &str, size: u64) -> FontIndex {
        if let Some(idx) = self.fonts.get_index_of(path) {
            return idx;
        }
        self.fonts.insert_full(path.to_owned(), size).0
    }

    pub fn get(&self, path: &str) -> Option<FontIndex> {
        self.fonts.get_index_of(path)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// The registered fonts, ordered by index.
    pub fn into_entries(self) -> Vec<FontEntry> {
        self.fonts
            .into_iter()
            .map(|(path, size)| FontEntry { path, size })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_appearance_order() {
        let mut registry = FontRegistry::new();
        assert_eq!(registry.resolve("a.ttf", 10), 0);
        assert_eq!(registry.resolve("b.ttf", 20), 1);
        assert_eq!(registry.resolve("a.ttf", 10), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b.ttf"), Some(1));
        assert_eq!(registry.get("c.ttf"), None);

        let entries = registry.into_entries();
        assert_eq!(
            entries,
            vec![
                FontEntry {
                    path: "a.ttf".into(),
                    size: 10
                },
                FontEntry {
                    path: "b.ttf".into(),
                    size: 20
                },
            ]
        );
    }

    #[test]
    fn first_size_wins() {
        let mut registry = FontRegistry::new();
        registry.resolve("a.ttf", 10);
        assert_eq!(registry.resolve("a.ttf", 99), 0);
        assert_eq!(registry.into_entries()[0].size, 10);
    }
}
