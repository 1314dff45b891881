//! Collection paging
//!
//! Pure window and link computation for `OrderedCollection` paging. No I/O.
//!
//! A collection of `total` references is indexed `0` (oldest) to
//! `total - 1` (newest). Pages are numbered from the oldest end: page 0
//! holds the oldest `total % page_size` items (a full page when the
//! remainder is zero) and the highest page number holds the newest
//! `page_size` items. A request without a page number is served the
//! newest page.

use std::ops::Range;

use url::Url;

/// A reference to one page of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    /// The newest page, addressed without a page number
    MostRecent,
    Number(usize),
}

impl PageLink {
    /// Render the link against the collection id
    pub fn href(&self, collection: &Url) -> String {
        match self {
            PageLink::MostRecent => format!("{collection}?page=true"),
            PageLink::Number(num) => format!("{collection}?page=true&page-num={num}"),
        }
    }
}

/// Result of [`compute_window`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub total: usize,
    /// The page being served; `None` for the unpaged collection envelope
    pub current: Option<PageLink>,
    /// Ascending index range of the items on this page
    pub items: Range<usize>,
    pub first: Option<PageLink>,
    pub last: Option<PageLink>,
    pub prev: Option<PageLink>,
    pub next: Option<PageLink>,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Highest valid page number, or `None` for an empty collection
pub fn max_page(total: usize, page_size: usize) -> Option<usize> {
    let page_size = page_size.max(1);
    (total > 0).then(|| total.div_ceil(page_size) - 1)
}

/// Ascending index range covered by `page`, clipped to the collection
///
/// Pages above the maximum are empty.
pub fn page_range(total: usize, page_size: usize, page: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    match max_page(total, page_size) {
        Some(max) if page <= max => {
            let end = total - (max - page) * page_size;
            end.saturating_sub(page_size)..end
        }
        _ => 0..0,
    }
}

/// Compute the items and links for one collection request
///
/// * `requested` - whether a page (rather than the collection envelope) was asked for
/// * `page_num` - requested page number; `None` means the most recent page
///
/// A page number beyond the last valid page is echoed back as the page
/// identity, yields no items and links `next` to the newest valid page.
pub fn compute_window(
    total: usize,
    page_size: usize,
    requested: bool,
    page_num: Option<usize>,
) -> Window {
    let max = max_page(total, page_size);

    if !requested {
        return Window {
            total,
            current: None,
            items: 0..0,
            first: max.map(|_| PageLink::MostRecent),
            last: max.map(|_| PageLink::Number(0)),
            prev: None,
            next: None,
        };
    }

    let Some(max) = max else {
        return Window {
            total,
            current: Some(page_num.map_or(PageLink::MostRecent, PageLink::Number)),
            items: 0..0,
            first: None,
            last: None,
            prev: None,
            next: None,
        };
    };

    let page = page_num.unwrap_or(max);
    if page > max {
        return Window {
            total,
            current: Some(PageLink::Number(page)),
            items: 0..0,
            first: None,
            last: None,
            prev: None,
            next: Some(PageLink::Number(max)),
        };
    }

    Window {
        total,
        current: Some(PageLink::Number(page)),
        items: page_range(total, page_size, page),
        first: None,
        last: None,
        prev: (page < max).then(|| PageLink::Number(page + 1)),
        next: page.checked_sub(1).map(PageLink::Number),
    }
}
