//! The name -> fonts mapping.

use std::collections::{BTreeMap, BTreeSet};

use crate::registry::FontIndex;

/// Accumulates, for each decoded name, the set of fonts that declare it.
///
/// Both the names and each name's indices are kept sorted, so flattening
/// is deterministic.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    names: BTreeMap<String, BTreeSet<FontIndex>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `name` with `font`. Adding an existing pair is a no-op.
    pub fn add(&mut self, name: &str, font: FontIndex) {
        if let Some(fonts) = self.names.get_mut(name) {
            fonts.insert(font);
        } else {
            self.names.insert(name.to_owned(), BTreeSet::from([font]));
        }
    }

    /// The fonts declaring `name`, in ascending order.
    pub fn fonts_for(&self, name: &str) -> impl Iterator<Item = FontIndex> + '_ {
        self.names.get(name).into_iter().flatten().copied()
    }

    /// The number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Flatten each name's set into an ascending list.
    pub fn into_lists(self) -> BTreeMap<String, Vec<FontIndex>> {
        self.names
            .into_iter()
            .map(|(name, fonts)| (name, fonts.into_iter().collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pairs_are_kept_once() {
        let mut names = NameIndex::new();
        names.add("Arial", 0);
        names.add("Arial", 0);
        assert_eq!(names.fonts_for("Arial").collect::<Vec<_>>(), [0]);
        assert_eq!(names.into_lists()["Arial"], [0]);
    }

    #[test]
    fn indices_are_sorted() {
        let mut names = NameIndex::new();
        names.add("Noto Sans", 4);
        names.add("Noto Sans", 1);
        names.add("Noto Sans", 3);
        names.add("Noto Sans", 1);
        names.add("Arial", 2);
        assert_eq!(names.len(), 2);

        let lists = names.into_lists();
        assert_eq!(lists.keys().collect::<Vec<_>>(), ["Arial", "Noto Sans"]);
        assert_eq!(lists["Noto Sans"], [1, 3, 4]);
    }

    #[test]
    fn unknown_name() {
        let names = NameIndex::new();
        assert!(names.is_empty());
        assert_eq!(names.fonts_for("Missing").count(), 0);
    }
}
