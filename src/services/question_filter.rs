use std::str::FromStr;

use sqlx::PgPool;

use crate::db::models::{Question, User};
use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};
use crate::repositories;
use crate::repositories::questions::FilterParams;
use crate::services::validation::non_blank;
use crate::services::{page_window, Page, ServiceError};

pub(crate) const QUESTIONS_PAGE_SIZE: i64 = 15;

/// Raw, optional narrowing criteria as received from the caller.
#[derive(Debug, Default, Clone)]
pub(crate) struct FilterCriteria {
    pub(crate) grade_level: Option<String>,
    pub(crate) difficulty: Option<String>,
    pub(crate) question_type: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) textbook: Option<String>,
    pub(crate) chapter: Option<String>,
    pub(crate) search: Option<String>,
}

#[derive(Debug)]
pub(crate) struct FilterOptions {
    pub(crate) grade_levels: Vec<String>,
    pub(crate) textbooks: Vec<String>,
}

/// Turns criteria into repository predicates.
///
/// `None` means an enumerated criterion named a value that does not exist,
/// so nothing can match.
pub(crate) fn resolve(owner_id: &str, criteria: &FilterCriteria) -> Option<FilterParams> {
    let textbook = non_blank(criteria.textbook.clone());
    let chapter = textbook.as_ref().and_then(|_| non_blank(criteria.chapter.clone()));

    Some(FilterParams {
        user_id: owner_id.to_string(),
        grade_level: non_blank(criteria.grade_level.clone()),
        difficulty: parse_known::<DifficultyLevel>(&criteria.difficulty)?,
        question_type: parse_known::<QuestionType>(&criteria.question_type)?,
        source: parse_known::<QuestionSource>(&criteria.source)?,
        textbook,
        chapter,
        search: non_blank(criteria.search.clone()),
    })
}

/// `Some(None)` when absent, `Some(Some(v))` when known, `None` when unknown.
fn parse_known<T: FromStr>(raw: &Option<String>) -> Option<Option<T>> {
    match non_blank(raw.clone()) {
        None => Some(None),
        Some(value) => value.parse::<T>().ok().map(Some),
    }
}

pub(crate) async fn list(
    db: &PgPool,
    owner: &User,
    criteria: &FilterCriteria,
    requested_page: Option<i64>,
) -> Result<Page<Question>, ServiceError> {
    let (page, offset) = page_window(requested_page, QUESTIONS_PAGE_SIZE);

    let Some(params) = resolve(&owner.id, criteria) else {
        tracing::debug!(owner_id = %owner.id, "Unknown filter value, returning empty page");
        return Ok(Page::empty(page, QUESTIONS_PAGE_SIZE));
    };

    let total_count = repositories::questions::count_by_filters(db, &params).await?;
    let items = if offset < total_count {
        repositories::questions::list_by_filters(db, &params, offset, QUESTIONS_PAGE_SIZE).await?
    } else {
        Vec::new()
    };

    Ok(Page { items, page, page_size: QUESTIONS_PAGE_SIZE, total_count })
}

pub(crate) async fn filter_options(db: &PgPool, owner: &User) -> Result<FilterOptions, ServiceError> {
    let grade_levels = repositories::questions::distinct_grade_levels(db, &owner.id).await?;
    let textbooks = repositories::questions::distinct_textbooks(db, &owner.id).await?;

    Ok(FilterOptions { grade_levels, textbooks })
}
