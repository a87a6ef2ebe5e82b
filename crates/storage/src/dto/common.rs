use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const MAX_PAGE_SIZE: u32 = 100;

/// Page-numbered pagination for the audit history endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

impl PaginationParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!("page_size must be between 1 and {}", MAX_PAGE_SIZE));
        }
        Ok(())
    }

    /// Row offset for the query. Widened to `i64` before multiplying: the
    /// ledger is queried with bigint bounds anyway, and `u32` arithmetic
    /// would wrap for a huge requested page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        // `i64::div_ceil` is unstable (int_roundings); hand-rolled ceiling
        // division with an always-positive divisor is equivalent.
        let divisor = i64::from(page_size.max(1));
        let (quotient, remainder) = (total_items / divisor, total_items % divisor);
        let total_pages = (quotient + i64::from(remainder > 0)) as u32;
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, page_size, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_for_first_page_is_zero() {
        let params = PaginationParams {
            page: 1,
            page_size: 50,
        };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit(), 50);
    }

    #[test]
    fn test_offset_advances_by_page_size() {
        let params = PaginationParams {
            page: 3,
            page_size: 25,
        };
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PaginationParams {
            page: u32::MAX,
            page_size: MAX_PAGE_SIZE,
        };
        assert_eq!(params.offset(), (i64::from(u32::MAX) - 1) * 100);
    }

    #[test]
    fn test_validate_bounds() {
        let params = PaginationParams {
            page: 0,
            page_size: 50,
        };
        assert!(params.validate().is_err());

        let params = PaginationParams {
            page: 1,
            page_size: MAX_PAGE_SIZE + 1,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_meta_rounds_total_pages_up() {
        let meta = PaginationMeta::new(1, 50, 101);
        assert_eq!(meta.total_pages, 3);

        let meta = PaginationMeta::new(1, 50, 0);
        assert_eq!(meta.total_pages, 0);
    }
}
