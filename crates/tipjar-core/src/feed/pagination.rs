use std::ops::Range;

/// Donations shown per page.
pub const PAGE_SIZE: usize = 5;

/// 1-based page cursor over a list whose length can change between moves.
///
/// The page is clamped to `[1, page_count]` on every move; an empty list
/// still has page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Re-applies the bounds after the list length changed.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.clamp(1, self.page_count(len).max(1));
    }

    pub fn go_to(&mut self, page: usize, len: usize) {
        self.page = page;
        self.clamp(len);
    }

    pub fn next(&mut self, len: usize) {
        self.go_to(self.page.saturating_add(1), len);
    }

    pub fn previous(&mut self, len: usize) {
        self.go_to(self.page.saturating_sub(1), len);
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.page < self.page_count(len)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Index range of the current page, always within `0..len`.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_items_three_pages() {
        let mut paginator = Paginator::default();
        assert_eq!(paginator.page_count(12), 3);
        assert_eq!(paginator.range(12), 0..5);

        paginator.go_to(3, 12);
        assert_eq!(paginator.range(12), 10..12);
        assert!(!paginator.has_next(12));

        paginator.next(12);
        assert_eq!(paginator.page(), 3);
        paginator.go_to(9, 12);
        assert_eq!(paginator.page(), 3);
    }

    #[test]
    fn test_clamps_low_and_empty() {
        let mut paginator = Paginator::default();
        paginator.previous(12);
        assert_eq!(paginator.page(), 1);
        assert!(!paginator.has_previous());

        paginator.go_to(0, 0);
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.range(0), 0..0);
    }

    #[test]
    fn test_shrinking_list_pulls_page_back() {
        let mut paginator = Paginator::default();
        paginator.go_to(4, 20);
        assert_eq!(paginator.page(), 4);
        paginator.clamp(7);
        assert_eq!(paginator.page(), 2);
        assert_eq!(paginator.range(7), 5..7);
    }
}
