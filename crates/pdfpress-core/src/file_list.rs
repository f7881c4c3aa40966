//! Ordered list of input files and the editing operations on it
//!
//! Selections are 0-based indices; `parse_selection` converts the 1-based
//! ranges users type ("1-3, 5") into one.

use crate::error::PdfPressError;
use crate::parse_ranges_up_to;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileList {
    entries: Vec<PathBuf>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    /// Append paths in the order given
    pub fn add<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.entries.extend(paths.into_iter().map(Into::into));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove the selected entries, returning them in list order
    pub fn remove(&mut self, selection: &[usize]) -> Result<Vec<PathBuf>, PdfPressError> {
        let selection = self.checked(selection)?;
        let mut removed = Vec::with_capacity(selection.len());
        for &index in selection.iter().rev() {
            removed.push(self.entries.remove(index));
        }
        removed.reverse();
        Ok(removed)
    }

    /// Move each selected entry one place towards the start.
    ///
    /// Entries already at the start, or stacked against it behind other
    /// selected entries, stay where they are. Returns the new selection.
    pub fn move_up(&mut self, selection: &[usize]) -> Result<Vec<usize>, PdfPressError> {
        let selection = self.checked(selection)?;
        let mut pinned = 0;
        let mut moved = Vec::with_capacity(selection.len());

        for index in selection {
            if index == pinned {
                pinned += 1;
                moved.push(index);
            } else {
                self.entries.swap(index, index - 1);
                moved.push(index - 1);
            }
        }
        Ok(moved)
    }

    /// Move each selected entry one place towards the end.
    ///
    /// Mirror image of [`FileList::move_up`].
    pub fn move_down(&mut self, selection: &[usize]) -> Result<Vec<usize>, PdfPressError> {
        let selection = self.checked(selection)?;
        let mut pinned = self.entries.len() - 1;
        let mut moved = Vec::with_capacity(selection.len());

        for &index in selection.iter().rev() {
            if index == pinned {
                pinned = pinned.saturating_sub(1);
                moved.push(index);
            } else {
                self.entries.swap(index, index + 1);
                moved.push(index + 1);
            }
        }
        moved.reverse();
        Ok(moved)
    }

    /// Move the selected entries, keeping their relative order, to the start
    pub fn move_top(&mut self, selection: &[usize]) -> Result<Vec<usize>, PdfPressError> {
        let (selected, rest) = self.partition(selection)?;
        let count = selected.len();
        self.entries = selected.into_iter().chain(rest).collect();
        Ok((0..count).collect())
    }

    /// Move the selected entries, keeping their relative order, to the end
    pub fn move_bottom(&mut self, selection: &[usize]) -> Result<Vec<usize>, PdfPressError> {
        let (selected, rest) = self.partition(selection)?;
        let start = rest.len();
        let count = selected.len();
        self.entries = rest.into_iter().chain(selected).collect();
        Ok((start..start + count).collect())
    }

    fn partition(
        &mut self,
        selection: &[usize],
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>), PdfPressError> {
        let selection = self.checked(selection)?;
        let mut selected = Vec::with_capacity(selection.len());
        let mut rest = Vec::with_capacity(self.entries.len() - selection.len());

        let mut wanted = selection.iter().peekable();
        for (index, entry) in std::mem::take(&mut self.entries).into_iter().enumerate() {
            if wanted.peek() == Some(&&index) {
                wanted.next();
                selected.push(entry);
            } else {
                rest.push(entry);
            }
        }
        Ok((selected, rest))
    }

    /// Sorted, de-duplicated, bounds-checked copy of `selection`
    fn checked(&self, selection: &[usize]) -> Result<Vec<usize>, PdfPressError> {
        if selection.is_empty() {
            return Err(PdfPressError::InvalidRange("Nothing is selected".into()));
        }
        let mut sorted = selection.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        if let Some(&last) = sorted.last() {
            if last >= self.entries.len() {
                return Err(PdfPressError::InvalidRange(format!(
                    "Entry {} is out of range (1-{})",
                    last + 1,
                    self.entries.len()
                )));
            }
        }
        Ok(sorted)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for FileList {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut list = FileList::new();
        list.add(iter);
        list
    }
}

/// Convert a 1-based range string such as "1-3, 5" into 0-based indices
/// for a list of `len` entries
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>, PdfPressError> {
    let max = u32::try_from(len).unwrap_or(u32::MAX);
    let entries = parse_ranges_up_to(input, max)?;
    if entries.is_empty() {
        return Err(PdfPressError::InvalidRange("Nothing is selected".into()));
    }
    if entries.first() == Some(&0) {
        return Err(PdfPressError::InvalidRange(
            "Entries are numbered from 1".into(),
        ));
    }
    Ok(entries.into_iter().map(|n| n as usize - 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(names: &[&str]) -> FileList {
        names.iter().copied().collect()
    }

    fn names(list: &FileList) -> Vec<String> {
        list.iter().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn test_add_and_clear() {
        let mut l = FileList::new();
        l.add(["a.pdf", "b.png"]);
        l.add(vec![PathBuf::from("c.jpg")]);
        assert_eq!(names(&l), vec!["a.pdf", "b.png", "c.jpg"]);

        l.clear();
        assert!(l.is_empty());
    }

    #[test]
    fn test_remove_selected() {
        let mut l = list(&["a", "b", "c", "d"]);
        let removed = l.remove(&[3, 1]).unwrap();
        assert_eq!(removed, vec![PathBuf::from("b"), PathBuf::from("d")]);
        assert_eq!(names(&l), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_requires_selection() {
        let mut l = list(&["a"]);
        assert!(matches!(l.remove(&[]), Err(PdfPressError::InvalidRange(_))));
        assert!(matches!(l.remove(&[1]), Err(PdfPressError::InvalidRange(_))));
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn test_move_up_block() {
        let mut l = list(&["a", "b", "c", "d", "e"]);
        let sel = l.move_up(&[2, 3]).unwrap();
        assert_eq!(names(&l), vec!["a", "c", "d", "b", "e"]);
        assert_eq!(sel, vec![1, 2]);
    }

    #[test]
    fn test_move_up_stops_at_top() {
        let mut l = list(&["a", "b", "c", "d"]);
        let sel = l.move_up(&[0, 1, 3]).unwrap();
        assert_eq!(names(&l), vec!["a", "b", "d", "c"]);
        assert_eq!(sel, vec![0, 1, 2]);
    }

    #[test]
    fn test_move_down_stops_at_bottom() {
        let mut l = list(&["a", "b", "c", "d"]);
        let sel = l.move_down(&[0, 2, 3]).unwrap();
        assert_eq!(names(&l), vec!["b", "a", "c", "d"]);
        assert_eq!(sel, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_down_single() {
        let mut l = list(&["a", "b", "c"]);
        let sel = l.move_down(&[0]).unwrap();
        assert_eq!(names(&l), vec!["b", "a", "c"]);
        assert_eq!(sel, vec![1]);
    }

    #[test]
    fn test_move_top_keeps_relative_order() {
        let mut l = list(&["a", "b", "c", "d", "e"]);
        let sel = l.move_top(&[4, 2]).unwrap();
        assert_eq!(names(&l), vec!["c", "e", "a", "b", "d"]);
        assert_eq!(sel, vec![0, 1]);
    }

    #[test]
    fn test_move_bottom_keeps_relative_order() {
        let mut l = list(&["a", "b", "c", "d", "e"]);
        let sel = l.move_bottom(&[0, 2]).unwrap();
        assert_eq!(names(&l), vec!["b", "d", "e", "a", "c"]);
        assert_eq!(sel, vec![3, 4]);
    }

    #[test]
    fn test_parse_selection_is_one_based() {
        assert_eq!(parse_selection("1-3, 5", 5).unwrap(), vec![0, 1, 2, 4]);
        assert!(parse_selection("0", 5).is_err());
        assert!(parse_selection(" , ", 5).is_err());
    }

    #[test]
    fn test_parse_selection_is_bounded_by_list_length() {
        assert!(matches!(
            parse_selection("1-4000000000", 3),
            Err(PdfPressError::InvalidRange(_))
        ));
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("1", 0).is_err());
    }
}
