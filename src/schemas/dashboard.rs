use std::collections::BTreeMap;

use serde::Serialize;

use crate::schemas::question::QuestionResponse;
use crate::schemas::test_paper::TestPaperSummaryResponse;

#[derive(Debug, Serialize)]
pub(crate) struct DashboardStatsResponse {
    pub(crate) total_questions: i64,
    pub(crate) total_test_papers: i64,
    pub(crate) questions_by_type: BTreeMap<&'static str, i64>,
    pub(crate) questions_by_difficulty: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) stats: DashboardStatsResponse,
    pub(crate) recent_questions: Vec<QuestionResponse>,
    pub(crate) recent_test_papers: Vec<TestPaperSummaryResponse>,
}
