use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};
use crate::test_support::{self, bearer_token, json_request, read_json, QuestionSeed};

fn question_body(text: &str, points: i32) -> serde_json::Value {
    json!({
        "question_text": text,
        "question_type": "multiple_choice",
        "options": {"A": "Mercury", "B": "Venus", "C": "Earth"},
        "correct_answer": "A",
        "grade_level": "Grade 5",
        "textbook": "Space Basics",
        "chapter": "Planets",
        "source": "textbook",
        "difficulty_level": "medium",
        "points": points
    })
}

fn ids(body: &serde_json::Value) -> Vec<i64> {
    body["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}

#[tokio::test]
async fn create_and_fetch_question() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/questions",
            Some(&token),
            Some(question_body("Which planet is closest to the sun?", 4)),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["question_type_label"], "Multiple Choice");
    assert_eq!(created["options"]["B"], "Venus");
    assert_eq!(created["user_id"], owner.id.as_str());

    let id = created["id"].as_i64().expect("id");
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::GET, &format!("/api/v1/questions/{id}"), Some(&token), None))
        .await
        .expect("show");
    assert_eq!(response.status(), StatusCode::OK);
    let shown = read_json(response).await;
    assert_eq!(shown["points"], 4);
    assert_eq!(shown["source_label"], "Textbook");
}

#[tokio::test]
async fn invalid_question_returns_field_errors() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let mut body = question_body("Bad", 0);
    body["question_type"] = json!("essay");

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/questions", Some(&token), Some(body)))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert!(body["errors"]["points"].is_array());
    assert!(body["errors"]["question_type"].is_array());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(ctx.state.db())
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn other_users_question_is_forbidden() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let intruder = test_support::insert_user(ctx.state.db(), "intruder@example.com", "X").await;
    let question =
        test_support::insert_question(ctx.state.db(), &owner.id, QuestionSeed::default()).await;
    let token = bearer_token(&intruder.id, ctx.state.settings());
    let uri = format!("/api/v1/questions/{}", question.id);

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(question_body("Hijacked", 9))),
        (Method::DELETE, None),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(method.clone(), &uri, Some(&token), body))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method}");
    }

    let stored: String = sqlx::query_scalar("SELECT question_text FROM questions WHERE id = $1")
        .bind(question.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("question");
    assert_eq!(stored, "Explain photosynthesis.");

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/questions/999999", Some(&token), None))
        .await
        .expect("missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_is_scoped_to_owner() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let other = test_support::insert_user(ctx.state.db(), "other@example.com", "Other").await;
    let mine =
        test_support::insert_question(ctx.state.db(), &owner.id, QuestionSeed::default()).await;
    test_support::insert_question(ctx.state.db(), &other.id, QuestionSeed::default()).await;

    let token = bearer_token(&owner.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/questions", Some(&token), None))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(ids(&body), vec![mine.id]);
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["page_size"], 15);
    assert_eq!(body["last_page"], 1);
}

#[tokio::test]
async fn listing_paginates_newest_first() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let mut created = Vec::new();
    for _ in 0..17 {
        let question =
            test_support::insert_question(ctx.state.db(), &owner.id, QuestionSeed::default()).await;
        created.push(question.id);
    }
    let token = bearer_token(&owner.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/questions?page=2", Some(&token), None))
        .await
        .expect("list");
    let body = read_json(response).await;

    assert_eq!(body["page"], 2);
    assert_eq!(body["total_count"], 17);
    assert_eq!(body["last_page"], 2);
    assert_eq!(ids(&body), vec![created[1], created[0]]);
}

#[tokio::test]
async fn filters_combine_and_chapter_needs_textbook() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let db = ctx.state.db();

    let a = test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed { grade_level: "7", textbook: "X", chapter: "1", ..QuestionSeed::default() },
    )
    .await;
    let b = test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed { grade_level: "7", textbook: "Y", chapter: "2", ..QuestionSeed::default() },
    )
    .await;
    test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed { grade_level: "8", textbook: "X", chapter: "1", ..QuestionSeed::default() },
    )
    .await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let cases = [
        ("/api/v1/questions?grade_level=7", vec![b.id, a.id]),
        ("/api/v1/questions?grade_level=7&textbook=X", vec![a.id]),
        ("/api/v1/questions?grade_level=7&chapter=1", vec![b.id, a.id]),
        ("/api/v1/questions?grade_level=7&textbook=Y&chapter=1", vec![]),
        ("/api/v1/questions?grade_level=%20%207%20", vec![b.id, a.id]),
    ];

    for (uri, expected) in cases {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::GET, uri, Some(&token), None))
            .await
            .expect("list");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = read_json(response).await;
        assert_eq!(ids(&body), expected, "{uri}");
    }
}

#[tokio::test]
async fn enumerated_filters_and_unknown_values() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let db = ctx.state.db();

    let hard = test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed {
            difficulty_level: DifficultyLevel::Hard,
            question_type: QuestionType::FillInBlank,
            source: QuestionSource::SampleExam,
            ..QuestionSeed::default()
        },
    )
    .await;
    test_support::insert_question(db, &owner.id, QuestionSeed::default()).await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let cases = [
        ("/api/v1/questions?difficulty=hard", vec![hard.id]),
        ("/api/v1/questions?question_type=fill_in_blank", vec![hard.id]),
        ("/api/v1/questions?source=sample_exam", vec![hard.id]),
        ("/api/v1/questions?difficulty=extreme", vec![]),
        ("/api/v1/questions?question_type=essay", vec![]),
    ];

    for (uri, expected) in cases {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::GET, uri, Some(&token), None))
            .await
            .expect("list");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = read_json(response).await;
        assert_eq!(ids(&body), expected, "{uri}");
    }
}

#[tokio::test]
async fn search_is_case_insensitive_and_literal() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let db = ctx.state.db();

    let upper = test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed { question_text: "Define PHOTOSYNTHESIS briefly", ..QuestionSeed::default() },
    )
    .await;
    let percent = test_support::insert_question(
        db,
        &owner.id,
        QuestionSeed { question_text: "What is 50% of 80?", ..QuestionSeed::default() },
    )
    .await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let cases = [
        ("/api/v1/questions?search=photosynthesis", vec![upper.id]),
        ("/api/v1/questions?search=DEFINE", vec![upper.id]),
        ("/api/v1/questions?search=50%25", vec![percent.id]),
        ("/api/v1/questions?search=%25", vec![percent.id]),
        ("/api/v1/questions?search=_", vec![]),
    ];

    for (uri, expected) in cases {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(Method::GET, uri, Some(&token), None))
            .await
            .expect("list");
        let body = read_json(response).await;
        assert_eq!(ids(&body), expected, "{uri}");
    }
}

#[tokio::test]
async fn filter_options_are_distinct_and_sorted() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let other = test_support::insert_user(ctx.state.db(), "other@example.com", "Other").await;
    let db = ctx.state.db();

    let seeds = [("Grade 9", "Zoology"), ("Grade 10", "Algebra"), ("Grade 9", "Algebra")];
    for (grade_level, textbook) in seeds {
        test_support::insert_question(
            db,
            &owner.id,
            QuestionSeed { grade_level, textbook, ..QuestionSeed::default() },
        )
        .await;
    }
    test_support::insert_question(
        db,
        &other.id,
        QuestionSeed { grade_level: "Grade 1", textbook: "Hidden", ..QuestionSeed::default() },
    )
    .await;

    let token = bearer_token(&owner.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/questions/filter-options", Some(&token), None))
        .await
        .expect("options");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(body["grade_levels"], json!(["Grade 10", "Grade 9"]));
    assert_eq!(body["textbooks"], json!(["Algebra", "Zoology"]));
    assert_eq!(body["difficulties"], json!(["easy", "medium", "hard"]));
    assert_eq!(body["question_types"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["sources"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let Some(ctx) = test_support::setup_test_context().await else {
        return;
    };
    let owner = test_support::insert_user(ctx.state.db(), "owner@example.com", "Owner").await;
    let question =
        test_support::insert_question(ctx.state.db(), &owner.id, QuestionSeed::default()).await;
    let token = bearer_token(&owner.id, ctx.state.settings());

    let body = json!({
        "question_text": "The sun is a star.",
        "question_type": "true_false",
        "correct_answer": "True",
        "grade_level": "Grade 4",
        "textbook": "Space Basics",
        "chapter": "Stars",
        "source": "custom",
        "difficulty_level": "easy",
        "points": 2
    });
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/questions/{}", question.id),
            Some(&token),
            Some(body),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;

    assert_eq!(updated["question_type"], "true_false");
    assert_eq!(updated["options"], json!(["True", "False"]));
    assert_eq!(updated["chapter"], "Stars");
    assert_eq!(updated["source"], "custom");
    assert_eq!(updated["points"], 2);
}
