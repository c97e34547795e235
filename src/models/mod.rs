//! Data models

mod audit;
mod expense;
mod faq;
mod revenue;
mod settings;
mod user;

pub use audit::*;
pub use expense::*;
pub use faq::*;
pub use revenue::*;
pub use settings::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, per_page: u32) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
        }
    }
}

/// Common pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Zero-based offset for LIMIT/OFFSET queries
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.limit()
    }

    /// Page size clamped to a sane upper bound
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 200) as i64
    }
}

pub fn default_page() -> u32 {
    1
}

pub fn default_per_page() -> u32 {
    20
}
