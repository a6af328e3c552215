//! Offset pagination shared by every listing endpoint.

use serde::{Deserialize, Serialize};

/// Upper bound for any `limit` a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pages shown on each side of the current page in [`page_window`].
pub const WINDOW_RADIUS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamp raw query values: page ≥ 1, limit in `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    pub fn total_pages(&self, total_count: i64) -> u32 {
        if total_count <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        u32::try_from((total_count + limit - 1) / limit).unwrap_or(u32::MAX)
    }
}

/// One slot in a pager: a page number or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Pager slots: first and last page always, `radius` pages around `current`,
/// a single missing page filled in, longer gaps collapsed to an ellipsis.
pub fn page_window(current: u32, total_pages: u32, radius: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let start = current.saturating_sub(radius).max(1);
    let end = current.saturating_add(radius).min(total_pages);

    let mut pages: Vec<u32> = Vec::with_capacity((end - start + 3) as usize);
    pages.push(1);
    pages.extend(start..=end);
    pages.push(total_pages);
    pages.sort_unstable();
    pages.dedup();

    let mut out = Vec::with_capacity(pages.len() + 2);
    let mut prev: Option<u32> = None;
    for page in pages {
        if let Some(p) = prev {
            match page - p {
                1 => {}
                2 => out.push(PageItem::Page(p + 1)),
                _ => out.push(PageItem::Ellipsis),
            }
        }
        out.push(PageItem::Page(page));
        prev = Some(page);
    }
    out
}
