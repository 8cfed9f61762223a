use serde::Serialize;

use crate::services::Page;

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_count: i64,
    pub(crate) last_page: i64,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn from_page<S>(page: Page<S>, to_response: impl FnMut(S) -> T) -> Self {
        let last_page = page.last_page();
        let page = page.map(to_response);
        Self {
            items: page.items,
            page: page.page,
            page_size: page.page_size,
            total_count: page.total_count,
            last_page,
        }
    }
}
