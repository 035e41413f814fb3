//! Page windows and pagination metadata.

use serde::Serialize;

use crate::{Error, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest `limit` honoured unless the service is configured otherwise.
pub const DEFAULT_MAX_LIMIT: u32 = 100;

/// Offset/limit slice applied after ordering by `(chapter, verse)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub offset: u64,
  pub limit:  u64,
}

/// A validated `page` / `limit` pair. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:  u32,
  limit: u32,
}

impl PageRequest {
  pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if page == 0 {
      return Err(Error::InvalidArgument("page must be at least 1".into()));
    }
    if limit == 0 {
      return Err(Error::InvalidArgument("limit must be at least 1".into()));
    }
    Ok(Self { page, limit })
  }

  /// Clamp `limit` to `max`.
  pub fn capped(self, max: u32) -> Self {
    Self { limit: self.limit.min(max.max(1)), ..self }
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn limit(&self) -> u32 { self.limit }

  pub fn skip(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }

  pub fn window(&self) -> Window {
    Window { offset: self.skip(), limit: u64::from(self.limit) }
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current_page:   u32,
  pub total_pages:    u64,
  pub total_items:    u64,
  pub items_per_page: u32,
}

impl Pagination {
  pub fn new(request: PageRequest, total: u64) -> Self {
    Self {
      current_page:   request.page,
      total_pages:    total.div_ceil(u64::from(request.limit)),
      total_items:    total,
      items_per_page: request.limit,
    }
  }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items:      Vec<T>,
  pub pagination: Pagination,
}

impl<T> Page<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page { items: self.items.into_iter().map(f).collect(), pagination: self.pagination }
  }
}
