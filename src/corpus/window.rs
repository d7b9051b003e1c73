//! Contiguous sub-range selection over split sections.

/// A contiguous selection window over split sections.
///
/// `start` is the zero-based index of the first selected section and
/// `count` the maximum number taken. Windows reaching past the end of
/// the input clamp instead of failing, so the selected length is always
/// `min(count, len.saturating_sub(start))` and a window entirely past
/// the end selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    /// Zero-based index of the first selected section.
    pub start: usize,
    /// Maximum number of sections selected.
    pub count: usize,
}

impl SelectionWindow {
    /// Creates a window starting at `start` covering up to `count` items.
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// Applies the window to `items`, returning the selected sub-slice.
    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.start.saturating_add(self.count).min(items.len());
        &items[start..end]
    }

    /// Number of items the window selects from an input of length `len`.
    pub fn selected_len(&self, len: usize) -> usize {
        self.count.min(len.saturating_sub(self.start))
    }
}
