//! Offset pagination over filtered listings.

use serde::{Deserialize, Serialize};

use gatekeeper_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE_SIZE: u64 = 15;
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Which page to fetch (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Wire shape of [`PageRequest`]; deserialized input goes through [`PageRequest::new`].
#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default)]
    page: u64,
    page_size: u64,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = DomainError;

    fn try_from(raw: RawPageRequest) -> DomainResult<Self> {
        Self::new(raw.page, raw.page_size)
    }
}

impl PageRequest {
    /// Page 0 is read as page 1; a zero page size is rejected; sizes are capped.
    pub fn new(page: u64, page_size: u64) -> DomainResult<Self> {
        if page_size == 0 {
            return Err(DomainError::argument("page_size must be greater than zero"));
        }
        Ok(Self {
            page: page.max(1),
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// Build from optional query-string values, falling back to `default_size`.
    pub fn from_parts(page: Option<u64>, page_size: Option<u64>, default_size: u64) -> DomainResult<Self> {
        Self::new(page.unwrap_or(1), page_size.unwrap_or(default_size))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub last_page: u64,
    pub current_page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Wrap an already-sliced page.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let last_page = total.div_ceil(request.page_size.max(1)).max(1);
        Self {
            items,
            total,
            last_page,
            current_page: request.page,
            page_size: request.page_size,
        }
    }

    /// Slice a fully filtered, ordered result set.
    pub fn from_filtered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.page_size).unwrap_or(usize::MAX))
            .collect();
        Self::new(items, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            last_page: self.last_page,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}
