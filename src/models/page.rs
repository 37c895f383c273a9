use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 15;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Kept as text; anything that is not a number means the first page.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub per_page: i64,
    pub page: i64,
}

impl PageRequest {
    /// Clamps the page number to 1 and the page size to `1..=MAX_PAGE_SIZE`.
    pub fn new(per_page: i64, page: i64) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
            page: page.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        let page = query
            .page
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1);

        PageRequest::new(DEFAULT_PAGE_SIZE, page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);

        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            last_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page
    }
}
