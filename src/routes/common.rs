use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 分页查询参数，页码从0开始
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(0).max(0)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.page() * self.page_size()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total_items: i64) -> Self {
        let page_size = query.page_size();
        Self {
            items,
            page: query.page(),
            page_size,
            total_items,
            total_pages: (total_items + page_size - 1) / page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamping() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 0);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);

        let query = PageQuery {
            page: Some(-3),
            page_size: Some(10_000),
        };
        assert_eq!(query.page(), 0);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);

        let query = PageQuery {
            page: Some(2),
            page_size: Some(25),
        };
        assert_eq!(query.offset(), 50);
    }

    #[test]
    fn paged_computes_total_pages() {
        let query = PageQuery {
            page: Some(0),
            page_size: Some(20),
        };
        assert_eq!(Paged::new(vec![1, 2, 3], &query, 41).total_pages, 3);
        assert_eq!(Paged::new(Vec::<i32>::new(), &query, 0).total_pages, 0);
        assert_eq!(Paged::new(Vec::<i32>::new(), &query, 40).total_pages, 2);
    }
}
