//! Page-number strip for paginated results

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    /// One or more skipped pages
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => write!(f, "…"),
        }
    }
}

/// Number of pages needed for `total` items, never less than one
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// First page, last page, and `delta` pages either side of `current`.
/// Any run of skipped pages collapses into a single [`PageItem::Ellipsis`].
pub fn pagination_range(current: usize, total_pages: usize, delta: usize) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let low = current.saturating_sub(delta).max(1);
    let high = (current + delta).min(total_pages);

    let mut pages: Vec<usize> = Vec::with_capacity(high - low + 3);
    pages.push(1);
    pages.extend(low..=high);
    pages.push(total_pages);
    pages.sort_unstable();
    pages.dedup();

    let mut range = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<usize> = None;
    for page in pages {
        if let Some(prev) = previous {
            if page - prev > 1 {
                range.push(PageItem::Ellipsis);
            }
        }
        range.push(PageItem::Page(page));
        previous = Some(page);
    }
    range
}
