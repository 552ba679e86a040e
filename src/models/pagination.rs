// src/models/pagination.rs

use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
    error::AppError,
};

/// Query parameters for any list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Number of items to return (default: 10, max: 50). 0 means default.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A validated window: `1 <= limit <= 50`, `offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let limit = match limit.unwrap_or(0) {
            0 => DEFAULT_PAGE_LIMIT,
            l if l < 0 => {
                return Err(AppError::Validation("limit cannot be negative".to_string()));
            }
            l if l > MAX_PAGE_LIMIT => {
                return Err(AppError::Validation(format!(
                    "limit should not be greater than {}",
                    MAX_PAGE_LIMIT
                )));
            }
            l => l,
        };

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation("offset cannot be negative".to_string()));
        }

        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl TryFrom<PageParams> for Pagination {
    type Error = AppError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        Pagination::new(params.limit, params.offset)
    }
}

/// List response body.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: i64,
}

impl<T> From<(Vec<T>, i64)> for Page<T> {
    fn from((items, count): (Vec<T>, i64)) -> Self {
        Self { items, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_zero_limit_defaults_to_ten() {
        assert_eq!(Pagination::new(None, None).unwrap().limit(), 10);
        assert_eq!(Pagination::new(Some(0), None).unwrap().limit(), 10);
        assert_eq!(Pagination::new(None, None).unwrap().offset(), 0);
    }

    #[test]
    fn limit_ceiling_is_fifty() {
        assert_eq!(Pagination::new(Some(50), None).unwrap().limit(), 50);
        assert!(matches!(
            Pagination::new(Some(51), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(Pagination::new(Some(-1), None).is_err());
        assert!(Pagination::new(Some(5), Some(-3)).is_err());
    }

    #[test]
    fn empty_page_serializes_as_empty_list() {
        let page: Page<i64> = (Vec::new(), 0).into();
        let body = serde_json::to_value(page).unwrap();
        assert_eq!(body, serde_json::json!({"items": [], "count": 0}));
    }
}
