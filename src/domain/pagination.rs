/// Page metadata returned by both the conversation and the message endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl Pagination {
    /// Single page holding `total` items, used when the server omits pagination.
    pub fn single(total: usize) -> Self {
        let total = total as u64;
        Self {
            total,
            page: 1,
            limit: total.min(u64::from(u32::MAX)) as u32,
            pages: u32::from(total > 0),
        }
    }

    /// Returns `true` when `page` is inside `[1, pages]`.
    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.pages
    }

    /// Resolves a navigation request. Out-of-range and same-page requests
    /// resolve to `None`, which callers treat as a no-op.
    pub fn target(&self, requested: u32) -> Option<u32> {
        (self.contains(requested) && requested != self.page).then_some(requested)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.target(self.page.saturating_add(1))
    }

    pub fn previous_page(&self) -> Option<u32> {
        self.target(self.page.saturating_sub(1))
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.page, self.pages.max(1))
    }
}
