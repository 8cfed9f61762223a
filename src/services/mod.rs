pub(crate) mod dashboard;
pub(crate) mod question_filter;
pub(crate) mod question_options;
pub(crate) mod questions;
pub(crate) mod test_papers;
pub(crate) mod validation;

use thiserror::Error;

use crate::db::models::User;

pub(crate) use validation::FieldErrors;

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("not allowed to act on this resource")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

/// Only the owner may read or mutate a question or test paper.
pub(crate) fn ensure_owner(actor: &User, owner_id: &str) -> Result<(), ServiceError> {
    if actor.id == owner_id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// One page of an owner-scoped listing. Pages are 1-based.
#[derive(Debug)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: i64,
    pub(crate) page_size: i64,
    pub(crate) total_count: i64,
}

impl<T> Page<T> {
    pub(crate) fn empty(page: i64, page_size: i64) -> Self {
        Self { items: Vec::new(), page, page_size, total_count: 0 }
    }

    pub(crate) fn last_page(&self) -> i64 {
        let pages = (self.total_count + self.page_size - 1) / self.page_size;
        pages.max(1)
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}

/// Clamps a requested page number to `1..` and returns `(page, offset)`.
pub(crate) fn page_window(requested: Option<i64>, page_size: i64) -> (i64, i64) {
    let page = requested.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(page_size);
    (page, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_is_at_least_one() {
        assert_eq!(Page::<()>::empty(1, 15).last_page(), 1);

        let page = Page { items: vec![1], page: 1, page_size: 15, total_count: 31 };
        assert_eq!(page.last_page(), 3);

        let exact = Page { items: vec![1], page: 1, page_size: 12, total_count: 24 };
        assert_eq!(exact.last_page(), 2);
    }

    #[test]
    fn page_window_clamps_to_first_page() {
        assert_eq!(page_window(None, 15), (1, 0));
        assert_eq!(page_window(Some(0), 15), (1, 0));
        assert_eq!(page_window(Some(-4), 12), (1, 0));
        assert_eq!(page_window(Some(3), 12), (3, 24));
    }
}
